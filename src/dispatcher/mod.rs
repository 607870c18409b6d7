//! # Dispatcher Module
//!
//! The types a matched request is handed to: the [`Handler`] trait, the
//! [`HandlerRequest`] carrying everything extracted from the HTTP request
//! (including the path parameters captured by the router), and the
//! [`HandlerResponse`] the handler fills in.
//!
//! Handlers are plain synchronous callables. The router introduces no
//! concurrency of its own: a dispatch call blocks only inside the handler,
//! under whatever concurrency contract the host server provides.
//!
//! ```rust,ignore
//! use bough::{HandlerRequest, HandlerResponse, Router};
//!
//! let mut router = Router::new();
//! router.get("/pets/:id", |req: &HandlerRequest, res: &mut HandlerResponse| {
//!     res.body = serde_json::json!({ "id": req.param("id") });
//! });
//! ```

mod core;

pub use core::{Handler, HandlerRequest, HandlerResponse};
