use http::method::InvalidMethod;
use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;

use crate::dispatcher::HandlerRequest;
use crate::router::ParamVec;

/// Split a Cookie header into name/value pairs. Malformed pairs without an
/// `=` are skipped.
pub fn parse_cookies(headers: &HashMap<String, String>) -> HashMap<String, String> {
    let Some(raw) = headers.get("cookie") else {
        return HashMap::new();
    };
    raw.split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Parse the query string of a raw request path, if any.
pub fn parse_query_params(raw_path: &str) -> HashMap<String, String> {
    match raw_path.find('?') {
        Some(pos) => url::form_urlencoded::parse(raw_path[pos + 1..].as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Turn a raw `may_minihttp` request into a [`HandlerRequest`].
///
/// Header names are lowercased, the query string is stripped from the path
/// and parsed separately, and the body is decoded as JSON when it parses.
/// Fails only when the method token is not valid HTTP.
pub fn read_request(req: Request) -> Result<HandlerRequest, InvalidMethod> {
    let method: Method = req.method().parse()?;
    let raw_path = req.path().to_string();
    let path = raw_path
        .split('?')
        .next()
        .unwrap_or("/")
        .to_string();

    // Header names fold to lowercase so handlers can look them up without
    // caring how the client spelled them.
    let mut headers = HashMap::with_capacity(req.headers().len());
    for header in req.headers() {
        headers.insert(
            header.name.to_ascii_lowercase(),
            String::from_utf8_lossy(header.value).into_owned(),
        );
    }

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&raw_path);

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(n) if n > 0 => serde_json::from_str(&body_str).ok(),
            _ => None,
        }
    };

    Ok(HandlerRequest {
        method,
        path,
        params: ParamVec::new(),
        headers,
        cookies,
        query_params,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let mut headers = HashMap::new();
        headers.insert("cookie".to_string(), "a=b; c=d".to_string());
        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.get("a"), Some(&"b".to_string()));
        assert_eq!(cookies.get("c"), Some(&"d".to_string()));
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=two");
        assert_eq!(q.get("x"), Some(&"1".to_string()));
        assert_eq!(q.get("y"), Some(&"two".to_string()));
        assert!(parse_query_params("/p").is_empty());
    }
}
