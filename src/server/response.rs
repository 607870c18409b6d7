use may_minihttp::Response;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};
use tracing::warn;

use crate::dispatcher::HandlerResponse;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Caps for the dynamic-header table: interning leaks, so the table must
/// not grow with client-controlled input.
const MAX_CACHED_LINES: usize = 4096;
const MAX_CACHED_BYTES: usize = 1 << 20;

/// Intern table for dynamic header lines.
///
/// `may_minihttp` keeps response header lines as borrowed strings that must
/// outlive the service call, so a value built per request (a `Location`
/// target, say) cannot be handed over as a stack-local. Each distinct line
/// is leaked once and reused for every later response that needs it. The
/// table is hard-capped; once full, unknown lines are refused instead of
/// leaked, and the caller drops the header.
struct HeaderCache {
    lines: HashSet<&'static str>,
    bytes: usize,
    max_lines: usize,
    max_bytes: usize,
}

impl HeaderCache {
    fn new(max_lines: usize, max_bytes: usize) -> Self {
        HeaderCache {
            lines: HashSet::new(),
            bytes: 0,
            max_lines,
            max_bytes,
        }
    }

    fn intern(&mut self, line: String) -> Option<&'static str> {
        if let Some(existing) = self.lines.get(line.as_str()) {
            return Some(existing);
        }
        if self.lines.len() >= self.max_lines || self.bytes + line.len() > self.max_bytes {
            return None;
        }
        self.bytes += line.len();
        let leaked: &'static str = Box::leak(line.into_boxed_str());
        self.lines.insert(leaked);
        Some(leaked)
    }
}

fn interned_header(line: String) -> Option<&'static str> {
    static CACHE: OnceLock<Mutex<HeaderCache>> = OnceLock::new();
    CACHE
        .get_or_init(|| Mutex::new(HeaderCache::new(MAX_CACHED_LINES, MAX_CACHED_BYTES)))
        .lock()
        .unwrap()
        .intern(line)
}

/// Write a [`HandlerResponse`] out to the wire.
///
/// A null body is written empty, a string body as `text/plain`, anything
/// else as `application/json`. A Content-Type set by the handler wins.
pub fn write_response(res: &mut Response, out: HandlerResponse) {
    res.status_code(out.status as usize, status_reason(out.status));

    let mut has_content_type = false;
    for (name, value) in &out.headers {
        match interned_header(format!("{name}: {value}")) {
            Some(line) => {
                if name.eq_ignore_ascii_case("content-type") {
                    has_content_type = true;
                }
                res.header(line);
            }
            None => warn!(header = %name, "header table full, dropping response header"),
        }
    }

    match out.body {
        Value::Null => {}
        Value::String(s) => {
            if !has_content_type {
                res.header("Content-Type: text/plain");
            }
            res.body_vec(s.into_bytes());
        }
        other => {
            if !has_content_type {
                res.header("Content-Type: application/json");
            }
            res.body_vec(serde_json::to_vec(&other).unwrap());
        }
    }
}

/// Shortcut for a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
