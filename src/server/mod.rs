//! # Server Module
//!
//! `may_minihttp` integration: adapts raw HTTP requests into
//! [`HandlerRequest`](crate::HandlerRequest)s, runs them through
//! [`Router::serve`](crate::Router::serve), and writes the resulting
//! [`HandlerResponse`](crate::HandlerResponse) back to the wire.
//!
//! The router itself knows nothing about `may`; everything runtime-specific
//! lives here. [`RouterService`] is the `HttpService` implementation and
//! binds itself on a coroutine via [`RouterService::start`], which returns a
//! [`ServerHandle`] for managing the running server.
//!
//! ```rust,ignore
//! use bough::server::RouterService;
//! use bough::Router;
//! use std::sync::Arc;
//!
//! let mut router = Router::new();
//! // ... registrations ...
//! let handle = RouterService::new(Arc::new(router)).start("0.0.0.0:8080")?;
//! handle.join().unwrap();
//! ```

pub mod request;
pub mod response;
pub mod service;

pub use request::read_request;
pub use service::{RouterService, ServerHandle};
