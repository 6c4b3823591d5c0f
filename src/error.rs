//! Error types.
//!
//! Three families, one per phase:
//!
//! - [`RouteError`] — configuration mistakes caught while registering routes.
//!   These are fatal: [`Router::on`](crate::Router::on) panics with them.
//! - [`PathError`] — a handler asked for a canonical path the request cannot
//!   produce. Returned to the handler, never fatal.
//! - [`Error`] — failures of the server: I/O (bind, accept) and requests
//!   that cannot be read (body errors, malformed paths). The latter are
//!   answered with `400 Bad Request`.

use http::Method;
use thiserror::Error;

use crate::pattern::Kind;

/// The error type returned by the server's fallible operations.
///
/// Application-level outcomes (404, 405, redirects) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read request body: {0}")]
    Body(#[from] hyper::Error),

    #[error("request path {0:?} is not valid percent-encoded UTF-8")]
    BadPath(String),
}

/// A route pattern that cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid empty pattern")]
    Empty,

    #[error("route {0:?} must start with /")]
    NotRooted(String),

    #[error("route {0:?} is unclean, make sure it is rooted and remove any ., .., or //")]
    Unclean(String),

    #[error("route {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("invalid type {0:?}")]
    InvalidType(String),

    #[error("wildcards must be the last component in a route: {0}")]
    WildcardNotLast(String),

    #[error(
        "conflicting variable found, {{{name} {kind}}} in route {route:?} conflicts with \
         existing registration of {{{existing_name} {existing_kind}}}"
    )]
    Conflict {
        route: String,
        name: String,
        kind: Kind,
        existing_name: String,
        existing_kind: Kind,
    },

    #[error("route already registered for {method} {route}")]
    AlreadyRegistered { method: Method, route: String },
}

/// Failure to rebuild a request's canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no route was attached to the request")]
    NoRoute,

    #[error("request is missing expected parameter {0:?}")]
    MissingParam(String),

    #[error(transparent)]
    Route(#[from] RouteError),
}
