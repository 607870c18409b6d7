use http::Method;
use thiserror::Error;

/// Errors raised while registering a route.
///
/// Routes are static program configuration, so every variant here is a
/// programming error. The fallible surface is [`Router::try_handle`];
/// the convenience methods (`handle`, `get`, `post`, ...) turn these into
/// panics so a broken routing table fails at startup, not at dispatch.
///
/// [`Router::try_handle`]: crate::Router::try_handle
#[derive(Debug, Error)]
pub enum RouteError {
    /// The pattern was empty or did not begin with `/`.
    #[error("pattern {pattern:?} must begin with '/'")]
    MissingLeadingSlash { pattern: String },

    /// A `:` introduced a parameter without a name (`/:`, `/:/`).
    #[error("pattern {pattern:?} has a parameter without a name")]
    AnonymousParameter { pattern: String },

    /// A `:` appeared somewhere other than immediately after a `/`.
    #[error("pattern {pattern:?} has ':' in the middle of a segment")]
    MisplacedParameter { pattern: String },

    /// The same parameter name was used twice in one pattern.
    #[error("pattern {pattern:?} declares parameter {name:?} more than once")]
    DuplicateParameter { pattern: String, name: String },

    /// A `<` opened a constraint that never closed before the segment end.
    #[error("pattern {pattern:?} has an unterminated constraint on parameter {name:?}")]
    UnterminatedConstraint { pattern: String, name: String },

    /// The inline regular expression of a parameter failed to compile.
    #[error("invalid constraint on parameter {name:?} in pattern {pattern:?}")]
    InvalidConstraint {
        pattern: String,
        name: String,
        #[source]
        source: regex::Error,
    },

    /// The same method and path (with the same constraint set) was
    /// registered twice.
    #[error("{method} route {pattern:?} registered twice")]
    DuplicateRoute { method: Method, pattern: String },
}
