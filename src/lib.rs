//! Radix-trie HTTP request router for the `may` coroutine runtime.
//!
//! Routes are registered up front (`/users/:id`, `/static/`,
//! `/refs/:tag<[0-9a-f]+>`), compiled into one edge-compressed trie per
//! method, and matched in time proportional to the path length without
//! allocating on the hot path. See the [`router`] module for the matching
//! rules and the [`server`] module for the `may_minihttp` integration.

pub mod dispatcher;
mod error;
mod pattern;
pub mod router;
pub mod server;

pub use dispatcher::{Handler, HandlerRequest, HandlerResponse};
pub use error::RouteError;
pub use router::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
