//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! A [`Response`] remembers whether its status was set explicitly. Most
//! responses never care: an unset status goes out as `200 OK`. The not-found
//! path does care. Its handler is wrapped so that an unset status goes out as
//! `404 Not Found` instead, which means a custom not-found page that only
//! writes a body still reports the right code.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

use crate::norm::escape_path;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (no explicit status)
///
/// ```rust
/// use typemux::Response;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use http::StatusCode;
/// use typemux::Response;
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Option<StatusCode>,
}

impl Response {
    /// `application/json` body, status unset.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `text/plain; charset=utf-8` body, status unset.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body and an explicit status.
    pub fn status(code: StatusCode) -> Self {
        Self::builder().status(code).no_body()
    }

    /// `308 Permanent Redirect` to `location`.
    ///
    /// Bytes a header cannot carry (non-ASCII, spaces, controls) are
    /// percent-encoded, so a decoded path such as a
    /// [`canonical_path`](crate::Request::canonical_path) can be passed as is.
    pub fn redirect(location: &str) -> Self {
        Self::builder()
            .status(StatusCode::PERMANENT_REDIRECT)
            .header(LOCATION.as_str(), &escape_path(location, b""))
            .no_body()
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: None }
    }

    /// The status the response will be sent with.
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// `true` if a status was set by the handler rather than defaulted.
    pub fn has_explicit_status(&self) -> bool {
        self.status.is_some()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Fills in `code` if no status was set explicitly.
    pub(crate) fn or_status(mut self, code: StatusCode) -> Self {
        self.status.get_or_insert(code);
        self
    }

    /// Converts into the `http` type hyper writes to the wire.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status.unwrap_or(StatusCode::OK);

        let headers = res.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "dropping header that cannot be encoded"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. The status stays unset until
/// [`status`](ResponseBuilder::status) is called.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Option<StatusCode>,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = Some(code);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish("application/json", body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", Bytes::from(body.into()))
    }

    /// Terminate with a body of any content type.
    pub fn bytes(self, content_type: &str, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body (e.g. `204 No Content`, redirects, `OPTIONS`).
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Bytes) -> Response {
        let mut headers = vec![(CONTENT_TYPE.as_str().to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a handler: `return StatusCode::NO_CONTENT`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shortcuts_leave_status_unset() {
        let res = Response::text("hi");
        assert!(!res.has_explicit_status());
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn or_status_only_fills_unset_status() {
        let res = Response::text("missing").or_status(StatusCode::NOT_FOUND);
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = Response::status(StatusCode::NO_CONTENT).or_status(StatusCode::NOT_FOUND);
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn into_inner_keeps_status_and_valid_headers() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/42")
            .header("bad header", "x")
            .json(b"{}".to_vec())
            .into_inner();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()["location"], "/users/42");
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(res.headers().len(), 2);
    }

    #[test]
    fn redirect_encodes_decoded_paths() {
        let res = Response::redirect("/profile/jörg/personal");
        assert_eq!(res.status_code(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(res.header("location"), Some("/profile/j%C3%B6rg/personal"));

        let res = Response::redirect("/users/7?x=1");
        assert_eq!(res.header("location"), Some("/users/7?x=1"));
    }
}
