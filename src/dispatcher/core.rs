use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::router::ParamVec;

/// A route endpoint.
///
/// Implemented for free by any `Fn(&HandlerRequest, &mut HandlerResponse)`
/// closure or function that is `Send + Sync`.
pub trait Handler: Send + Sync {
    fn call(&self, req: &HandlerRequest, res: &mut HandlerResponse);
}

impl<F> Handler for F
where
    F: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync,
{
    fn call(&self, req: &HandlerRequest, res: &mut HandlerResponse) {
        self(req, res)
    }
}

/// Everything a handler gets to see about one request.
///
/// The server layer fills in method, path, headers, cookies, query
/// parameters and body; the router attaches `params` when a route matches.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path, query string already stripped.
    pub path: String,
    /// Path parameters captured by the router, in segment order.
    pub params: ParamVec,
    /// Headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Cookies parsed from the Cookie header.
    pub cookies: HashMap<String, String>,
    /// Query string parameters.
    pub query_params: HashMap<String, String>,
    /// Request body parsed as JSON, when present and parseable.
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Build a bare request. Useful for driving [`Router::serve`] directly,
    /// e.g. from tests.
    ///
    /// [`Router::serve`]: crate::Router::serve
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        HandlerRequest {
            method,
            path: path.into(),
            params: ParamVec::new(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            query_params: HashMap::new(),
            body: None,
        }
    }

    /// Look up a captured path parameter.
    ///
    /// The reserved name `*` returns the wildcard tail of a catch-all
    /// route. Unknown names return the empty string. Values are verbatim
    /// slices of the request path, never percent-decoded.
    pub fn param(&self, name: &str) -> &str {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }
}

/// What a handler sends back: status code, headers, JSON body.
///
/// Starts out as `200` with no headers and a null body; the handler
/// mutates whatever it cares about.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(skip_serializing)]
    pub headers: HashMap<String, String>,
    /// Response body. `Value::Null` writes an empty body, a string is sent
    /// as plain text, anything else as JSON.
    pub body: Value,
}

impl HandlerResponse {
    pub fn new() -> Self {
        HandlerResponse {
            status: 200,
            headers: HashMap::new(),
            body: Value::Null,
        }
    }
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_param_lookup() {
        let mut req = HandlerRequest::new(Method::GET, "/users/42");
        req.params.push((Arc::from("id"), "42".to_string()));
        req.params.push((Arc::from("*"), "a/b".to_string()));
        assert_eq!(req.param("id"), "42");
        assert_eq!(req.param("*"), "a/b");
        assert_eq!(req.param("unknown"), "");
    }

    #[test]
    fn test_response_defaults() {
        let res = HandlerResponse::default();
        assert_eq!(res.status, 200);
        assert!(res.headers.is_empty());
        assert!(res.body.is_null());
    }
}
