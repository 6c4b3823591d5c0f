//! Incoming HTTP request type.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use http_body_util::BodyExt;

use crate::error::{Error, PathError};
use crate::norm;
use crate::params::{ParamInfo, Params};

/// An incoming HTTP request.
///
/// Cloning is cheap: the body is reference counted and the parameters are
/// shared until [`with_param`](Request::with_param) shadows one of them.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) route: Option<Arc<str>>,
    pub(crate) params: Params,
}

impl Request {
    /// Builds a request for `target` (a path with an optional `?query`).
    ///
    /// The path is used as given, already decoded. Requests read off the wire
    /// have their percent-escapes decoded by the server.
    ///
    /// The server builds requests from the wire; this constructor is for
    /// driving [`Router::dispatch`](crate::Router::dispatch) directly, in
    /// tests for example.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (target.to_owned(), None),
        };
        Self {
            method,
            path,
            query,
            headers: Vec::new(),
            body: Bytes::new(),
            route: None,
            params: Params::default(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Reads a hyper request, decoding the path and collecting the whole body.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self, Error> {
        let (parts, body) = req.into_parts();
        let raw_path = parts.uri.path();
        let path = norm::decode_path(raw_path).ok_or_else(|| Error::BadPath(raw_path.to_owned()))?;
        let body = body.collect().await?.to_bytes();
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        Ok(Self {
            method: parts.method,
            path,
            query: parts.uri.query().map(str::to_owned),
            headers,
            body,
            route: None,
            params: Params::default(),
        })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The pattern of the route that matched this request, as registered.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Returns a captured path parameter.
    ///
    /// For a route `/users/{id uint}`, `req.param("id")` on `/users/42`
    /// returns a [`ParamInfo`] whose value is `Value::Uint(42)` and whose raw
    /// text is `"42"`. Anonymous captures are never stored.
    pub fn param(&self, name: &str) -> Option<&ParamInfo> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A copy of this request where parameter `name` reads as the string
    /// `value`. If `name` was not captured the copy is identical.
    ///
    /// Pair with [`canonical_path`](Request::canonical_path) to redirect to a
    /// normalized URL:
    ///
    /// ```rust
    /// use http::Method;
    /// use typemux::{Request, Response, Router};
    ///
    /// async fn profile(req: Request) -> Response {
    ///     let raw = req.param("username").map(|p| p.raw().to_owned()).unwrap_or_default();
    ///     let lower = raw.to_lowercase();
    ///     if lower != raw {
    ///         if let Ok(path) = req.with_param("username", &lower).canonical_path() {
    ///             return Response::redirect(&path);
    ///         }
    ///     }
    ///     Response::text(format!("profile of {raw}"))
    /// }
    ///
    /// let app = Router::new().get("/profile/{username string}/personal", profile);
    /// ```
    pub fn with_param(&self, name: &str, value: &str) -> Self {
        let mut req = self.clone();
        if let Some(params) = self.params.shadow(name, value) {
            req.params = params;
        }
        req
    }

    /// Rebuilds the request path from the matched route and the current
    /// parameter values.
    ///
    /// This differs from [`path`](Request::path) only when a parameter was
    /// replaced with [`with_param`](Request::with_param).
    pub fn canonical_path(&self) -> Result<String, PathError> {
        let route = self.route.as_deref().ok_or(PathError::NoRoute)?;
        norm::canonical_path(route, &self.path, &self.params)
    }

    pub(crate) fn attach(&mut self, route: Option<&str>, params: Params) {
        self.route = route.map(Arc::from);
        self.params = params;
    }
}
