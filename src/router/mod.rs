//! # Router Module
//!
//! Path matching and dispatch. One edge-compressed radix trie per HTTP
//! method maps request paths to handlers, capturing named parameters
//! (`:name`, optionally constrained by an inline regex) and the
//! trailing-slash wildcard (`*`) along the way.
//!
//! ## Matching rules
//!
//! - Literal segments win over parameters at the same position.
//! - Constrained parameters are tried before the unconstrained one.
//! - A pattern ending in `/` is a catch-all: it matches any deeper path and
//!   captures the remainder under `*`, but only when nothing more specific
//!   matches.
//! - `/foo` and `/foo/` are distinct routes; a request for `/foo/` is
//!   answered with a 301 to `/foo` before any matching happens.
//!
//! ## Construction discipline
//!
//! Build the whole table with [`Router::handle`] and friends before serving,
//! then treat the router as immutable. Lookup never locks and never
//! allocates for routes with at most [`MAX_INLINE_PARAMS`] parameters, so
//! the router can be shared by any number of concurrent dispatchers.

mod core;
mod trie;

#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
