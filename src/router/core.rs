//! Router front end: per-method trees, registration, lookup and dispatch.

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use crate::error::RouteError;
use crate::pattern::RoutePattern;
use crate::router::trie::{CaptureVec, Tree};

/// Maximum number of path parameters before captures spill to the heap.
/// Practically every route has fewer; the matcher stays allocation-free for
/// all of them.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Materialised path parameters of a matched route, in segment order.
/// Names are shared with the trie (`Arc<str>`); values are owned copies of
/// the captured path slices.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of a successful lookup: the handler to invoke and the parameters
/// it should see.
#[derive(Clone)]
pub struct RouteMatch {
    pub handler: Arc<dyn Handler>,
    pub params: ParamVec,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// HTTP request router backed by one radix trie per method.
///
/// Register every route up front, then share the router freely: lookup and
/// dispatch take `&self`, never lock, and never allocate for routes with at
/// most [`MAX_INLINE_PARAMS`] parameters.
///
/// ```rust,ignore
/// use bough::{HandlerRequest, HandlerResponse, Router};
///
/// let mut router = Router::new();
/// router.get("/users/:id", |req: &HandlerRequest, res: &mut HandlerResponse| {
///     res.body = serde_json::json!({ "user": req.param("id") });
/// });
/// router.get("/static/", |req: &HandlerRequest, res: &mut HandlerResponse| {
///     res.body = serde_json::Value::String(format!("would serve {}", req.param("*")));
/// });
/// ```
#[derive(Clone)]
pub struct Router {
    trees: HashMap<Method, Tree>,
    not_found: Arc<dyn Handler>,
}

fn default_not_found(_req: &HandlerRequest, res: &mut HandlerResponse) {
    res.status = 404;
    res.body = Value::Null;
}

impl Router {
    /// Create an empty router with the default not-found handler
    /// (status 404, empty body).
    pub fn new() -> Self {
        Router {
            trees: HashMap::new(),
            not_found: Arc::new(default_not_found),
        }
    }

    /// Register a route, returning the failure instead of panicking.
    ///
    /// Failures are programming errors: bad pattern syntax, a malformed
    /// constraint, or a duplicate registration. See [`RouteError`].
    pub fn try_handle<H>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<(), RouteError>
    where
        H: Handler + 'static,
    {
        let route = RoutePattern::parse(pattern)?;
        let tree = self.trees.entry(method.clone()).or_default();
        tree.insert(&route, &method, Arc::new(handler))?;
        info!(method = %method, pattern = %pattern, "route registered");
        Ok(())
    }

    /// Register a route.
    ///
    /// # Panics
    ///
    /// On any [`RouteError`]: pattern not beginning with `/`, anonymous
    /// parameter, malformed constraint, duplicate route.
    pub fn handle<H>(&mut self, method: Method, pattern: &str, handler: H)
    where
        H: Handler + 'static,
    {
        if let Err(err) = self.try_handle(method, pattern, handler) {
            panic!("router: {err}");
        }
    }

    /// Register a GET route. Panics like [`Router::handle`].
    pub fn get<H: Handler + 'static>(&mut self, pattern: &str, handler: H) {
        self.handle(Method::GET, pattern, handler);
    }

    /// Register a POST route. Panics like [`Router::handle`].
    pub fn post<H: Handler + 'static>(&mut self, pattern: &str, handler: H) {
        self.handle(Method::POST, pattern, handler);
    }

    /// Register a PUT route. Panics like [`Router::handle`].
    pub fn put<H: Handler + 'static>(&mut self, pattern: &str, handler: H) {
        self.handle(Method::PUT, pattern, handler);
    }

    /// Register a PATCH route. Panics like [`Router::handle`].
    pub fn patch<H: Handler + 'static>(&mut self, pattern: &str, handler: H) {
        self.handle(Method::PATCH, pattern, handler);
    }

    /// Register a DELETE route. Panics like [`Router::handle`].
    pub fn delete<H: Handler + 'static>(&mut self, pattern: &str, handler: H) {
        self.handle(Method::DELETE, pattern, handler);
    }

    /// Replace the handler invoked when no route matches.
    pub fn set_not_found_handler<H: Handler + 'static>(&mut self, handler: H) {
        self.not_found = Arc::new(handler);
    }

    /// Pure lookup: no redirect handling, no handler invocation.
    ///
    /// Returns the matched handler together with its materialised
    /// parameters, or `None` when nothing handler-bearing matches.
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let tree = self.trees.get(&method)?;
        let mut captures = CaptureVec::new();
        let node = tree.find(path, &mut captures)?;
        let handler = node.handler().cloned()?;

        let mut params = ParamVec::new();
        for (i, (name, _index)) in node.params().iter().enumerate() {
            // An exactly-matched wildcard terminal has no captured tail;
            // its `*` is the empty string.
            let value = captures.get(i).copied().unwrap_or("");
            params.push((Arc::clone(name), value.to_string()));
        }

        debug!(method = %method, path = %path, params = ?params, "route matched");
        Some(RouteMatch { handler, params })
    }

    /// Dispatch one request.
    ///
    /// A path longer than one byte ending in `/` is answered with a
    /// permanent redirect to the stripped path before any matching. On a
    /// match the captured parameters are attached to the request and the
    /// handler runs; otherwise the not-found handler runs.
    pub fn serve(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        if req.path.len() > 1 && req.path.ends_with('/') {
            let location = req.path[..req.path.len() - 1].to_string();
            debug!(path = %req.path, location = %location, "stripping trailing slash");
            res.status = 301;
            res.headers.insert("Location".to_string(), location);
            res.body = Value::Null;
            return;
        }

        match self.route(req.method.clone(), &req.path) {
            Some(matched) => {
                req.params = matched.params;
                matched.handler.call(req, res);
            }
            None => {
                debug!(method = %req.method, path = %req.path, "no route matched");
                self.not_found.call(req, res);
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Router {
    /// Render every method tree, one node per line. Meant for debugging a
    /// routing table, not for machine consumption.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&Method> = self.trees.keys().collect();
        methods.sort_by_key(|m| m.as_str());
        for method in methods {
            writeln!(f, "{method}")?;
            write!(f, "{}", self.trees[method])?;
        }
        Ok(())
    }
}
