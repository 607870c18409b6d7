use super::Router;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::Handler;
use http::Method;
use serde_json::Value;

/// Handler that writes its route pattern into the body, so tests can tell
/// which route won.
fn marker(name: &'static str) -> impl Handler {
    move |_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.body = Value::String(name.to_string());
    }
}

fn serve(router: &Router, method: Method, path: &str) -> (HandlerRequest, HandlerResponse) {
    let mut req = HandlerRequest::new(method, path);
    let mut res = HandlerResponse::default();
    router.serve(&mut req, &mut res);
    (req, res)
}

/// The classic overlapping routing table: every flavour of collision in one
/// trie: shared prefixes, a root parameter, a wildcard next to a
/// parameter, and deep literal splits.
fn overlapping_router() -> Router {
    let mut router = Router::new();
    for pattern in [
        "/",
        "/usage",
        "/user",
        "/us",
        "/:page",
        "/user/:item",
        "/user/files/",
        "/users/:id/car",
        "/users/:id/carriage",
        "/user/contact/office/london",
        "/user/contact/office/losangeles",
        "/user/contact/home",
        "/user/contact/home/dubai",
        "/user/contacted",
    ] {
        router.get(pattern, marker(pattern));
    }
    router
}

#[test]
fn test_overlapping_routes_resolve() {
    let router = overlapping_router();
    let cases: &[(&str, Option<&str>)] = &[
        ("/", Some("/")),
        ("/user", Some("/user")),
        ("/us", Some("/us")),
        ("/usage", Some("/usage")),
        ("/about", Some("/:page")),
        ("/user/files/foo", Some("/user/files/")),
        ("/user/files/foo/bar", Some("/user/files/")),
        ("/user/files", Some("/user/:item")),
        ("/user/contact/office/london", Some("/user/contact/office/london")),
        ("/user/contact/office/losangeles", Some("/user/contact/office/losangeles")),
        ("/user/contact/home", Some("/user/contact/home")),
        ("/user/contact/home/dubai", Some("/user/contact/home/dubai")),
        ("/user/contacted", Some("/user/contacted")),
        ("/users/42/car", Some("/users/:id/car")),
        ("/users/42/carriage", Some("/users/:id/carriage")),
        ("/users/notfound", None),
        ("/user/contact/office/lo", None),
        ("/user/contact", None),
        ("/page/notfound", None),
    ];
    for (path, expected) in cases {
        let (_req, res) = serve(&router, Method::GET, path);
        match expected {
            Some(pattern) => {
                assert_eq!(res.status, 200, "{path} should match {pattern}");
                assert_eq!(res.body.as_str(), Some(*pattern), "wrong route for {path}");
            }
            None => assert_eq!(res.status, 404, "{path} should be a 404"),
        }
    }
}

#[test]
fn test_literal_wins_over_parameter() {
    let router = overlapping_router();
    let (_req, res) = serve(&router, Method::GET, "/user");
    assert_eq!(res.body.as_str(), Some("/user"));
    let (_req, res) = serve(&router, Method::GET, "/anything-else");
    assert_eq!(res.body.as_str(), Some("/:page"));
}

#[test]
fn test_parameter_capture_round_trip() {
    let mut router = Router::new();
    router.get("/p/:x/q/:y", marker("/p/:x/q/:y"));
    let (req, res) = serve(&router, Method::GET, "/p/A/q/B");
    assert_eq!(res.status, 200);
    assert_eq!(req.param("x"), "A");
    assert_eq!(req.param("y"), "B");
    assert_eq!(req.param("unknown"), "");
}

#[test]
fn test_wildcard_captures() {
    let router = overlapping_router();
    let (req, _res) = serve(&router, Method::GET, "/user/files/foo");
    assert_eq!(req.param("*"), "foo");
    let (req, _res) = serve(&router, Method::GET, "/user/files/foo/bar");
    assert_eq!(req.param("*"), "foo/bar");
}

#[test]
fn test_wildcard_yields_to_deeper_literal() {
    let mut router = Router::new();
    router.get("/a/", marker("/a/"));
    router.get("/a/b", marker("/a/b"));

    let (_req, res) = serve(&router, Method::GET, "/a/b");
    assert_eq!(res.body.as_str(), Some("/a/b"));

    let (req, res) = serve(&router, Method::GET, "/a/b/x");
    assert_eq!(res.body.as_str(), Some("/a/"));
    assert_eq!(req.param("*"), "b/x");
}

#[test]
fn test_parameters_with_wildcard_tail() {
    let mut router = Router::new();
    router.get("/users/:id/contact/:office/", marker("w"));
    let (req, res) = serve(&router, Method::GET, "/users/12/contact/london/one/two");
    assert_eq!(res.status, 200);
    assert_eq!(req.param("id"), "12");
    assert_eq!(req.param("office"), "london");
    assert_eq!(req.param("*"), "one/two");
}

#[test]
fn test_constrained_parameter_preferred() {
    let mut router = Router::new();
    router.get("/:id<[0-9]+>", marker("numeric"));
    router.get("/:name", marker("plain"));

    let (req, res) = serve(&router, Method::GET, "/1234");
    assert_eq!(res.body.as_str(), Some("numeric"));
    assert_eq!(req.param("id"), "1234");

    let (req, res) = serve(&router, Method::GET, "/alice");
    assert_eq!(res.body.as_str(), Some("plain"));
    assert_eq!(req.param("name"), "alice");
}

#[test]
fn test_constrained_parameter_mid_path() {
    let mut router = Router::new();
    router.get("/users/:id<[0-9]+>/orders", marker("by-id"));
    router.get("/users/:slug<[a-z-]+>/orders", marker("by-slug"));

    let (req, res) = serve(&router, Method::GET, "/users/42/orders");
    assert_eq!(res.body.as_str(), Some("by-id"));
    assert_eq!(req.param("id"), "42");

    let (req, res) = serve(&router, Method::GET, "/users/jane-doe/orders");
    assert_eq!(res.body.as_str(), Some("by-slug"));
    assert_eq!(req.param("slug"), "jane-doe");

    let (_req, res) = serve(&router, Method::GET, "/users/JANE/orders");
    assert_eq!(res.status, 404);
}

#[test]
fn test_trailing_slash_redirects() {
    let router = overlapping_router();
    let (_req, res) = serve(&router, Method::GET, "/user/");
    assert_eq!(res.status, 301);
    assert_eq!(res.headers.get("Location"), Some(&"/user".to_string()));
    assert!(res.body.is_null());

    // The bare root is exempt.
    let (_req, res) = serve(&router, Method::GET, "/");
    assert_eq!(res.status, 200);
}

#[test]
fn test_redirect_happens_before_matching() {
    // Even a registered wildcard path gets the redirect treatment first.
    let mut router = Router::new();
    router.get("/files/", marker("/files/"));
    let (_req, res) = serve(&router, Method::GET, "/files/");
    assert_eq!(res.status, 301);
    assert_eq!(res.headers.get("Location"), Some(&"/files".to_string()));
}

#[test]
fn test_method_isolation() {
    let mut router = Router::new();
    router.get("/resource", marker("get"));
    router.post("/resource", marker("post"));

    let (_req, res) = serve(&router, Method::GET, "/resource");
    assert_eq!(res.body.as_str(), Some("get"));
    let (_req, res) = serve(&router, Method::POST, "/resource");
    assert_eq!(res.body.as_str(), Some("post"));
    let (_req, res) = serve(&router, Method::PUT, "/resource");
    assert_eq!(res.status, 404);
}

#[test]
fn test_default_not_found() {
    let router = Router::new();
    let (_req, res) = serve(&router, Method::GET, "/nothing");
    assert_eq!(res.status, 404);
    assert!(res.body.is_null());
}

#[test]
fn test_custom_not_found() {
    let mut router = Router::new();
    router.set_not_found_handler(|_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.status = 403;
        res.body = Value::String("foobar".to_string());
    });
    let (_req, res) = serve(&router, Method::GET, "/nothing");
    assert_eq!(res.status, 403);
    assert_eq!(res.body.as_str(), Some("foobar"));
}

#[test]
fn test_route_returns_captures() {
    let router = overlapping_router();
    let matched = router.route(Method::GET, "/users/42/car").unwrap();
    assert_eq!(matched.params.len(), 1);
    assert_eq!(matched.params[0].0.as_ref(), "id");
    assert_eq!(matched.params[0].1, "42");
    assert!(router.route(Method::GET, "/users/notfound").is_none());
}

#[test]
fn test_route_on_wildcard_terminal() {
    // Direct lookup of a wildcard path (serve would have redirected it):
    // the tail is empty.
    let router = overlapping_router();
    let matched = router.route(Method::GET, "/user/files/").unwrap();
    assert_eq!(matched.params[0].0.as_ref(), "*");
    assert_eq!(matched.params[0].1, "");
}

#[test]
fn test_lookup_is_deterministic() {
    // Same registrations, same answers, independent of registration order.
    let mut reversed = Router::new();
    for pattern in [
        "/user/contacted",
        "/user/contact/home/dubai",
        "/user/contact/home",
        "/user/contact/office/losangeles",
        "/user/contact/office/london",
        "/users/:id/carriage",
        "/users/:id/car",
        "/user/files/",
        "/user/:item",
        "/:page",
        "/us",
        "/user",
        "/usage",
        "/",
    ] {
        reversed.get(pattern, marker(pattern));
    }
    let forward = overlapping_router();
    for path in [
        "/", "/user", "/about", "/user/files/foo", "/user/files", "/users/42/car",
        "/user/contact/office/london", "/user/contacted",
    ] {
        let (_r1, res1) = serve(&forward, Method::GET, path);
        let (_r2, res2) = serve(&reversed, Method::GET, path);
        assert_eq!(res1.body, res2.body, "order-dependent result for {path}");
    }
}

#[test]
#[should_panic(expected = "must begin with")]
fn test_missing_slash_panics() {
    let mut router = Router::new();
    router.get("user", marker("x"));
}

#[test]
#[should_panic(expected = "registered twice")]
fn test_duplicate_route_panics() {
    let mut router = Router::new();
    router.get("/:id", marker("a"));
    router.get("/:name", marker("b"));
}

#[test]
#[should_panic(expected = "parameter without a name")]
fn test_anonymous_parameter_panics() {
    let mut router = Router::new();
    router.get("/:", marker("x"));
}

#[test]
fn test_display_dumps_trees() {
    let router = overlapping_router();
    let dump = format!("{router}");
    assert!(dump.contains("GET"));
    assert!(dump.contains("\"us\""));
    assert!(dump.contains("\":\""));
}
