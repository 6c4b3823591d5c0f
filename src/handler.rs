//! Handler trait and type erasure.
//!
//! Routes registered on one node all live in the same tree, so every handler
//! is stored behind the same trait object:
//!
//! ```text
//! async fn get_user(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/users/{id uint}", get_user)
//! get_user.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_user))                       ← stored in the tree
//!        ↓
//! handler.call(req)                                   ← once per request
//! ```
//!
//! The fallback handlers reuse the same shape. The not-found handler is
//! additionally wrapped in [`DefaultStatus`], which turns an unset status into
//! a 404.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::header::ALLOW;
use http::{Method, StatusCode};

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Builds the response to an `OPTIONS` request from the methods registered on
/// the matched route.
pub(crate) type OptionsHook = Arc<dyn Fn(&[Method]) -> Response + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Wraps a handler so that a response without an explicit status is sent
/// with `code` instead of `200 OK`. A status the inner handler did set wins.
pub(crate) struct DefaultStatus {
    inner: BoxedHandler,
    code: StatusCode,
}

impl DefaultStatus {
    pub(crate) fn wrap(inner: BoxedHandler, code: StatusCode) -> BoxedHandler {
        Arc::new(Self { inner, code })
    }
}

impl ErasedHandler for DefaultStatus {
    fn call(&self, req: Request) -> BoxFuture {
        let fut = self.inner.call(req);
        let code = self.code;
        Box::pin(async move { fut.await.or_status(code) })
    }
}

// ── Built-in fallbacks ────────────────────────────────────────────────────────

pub(crate) async fn not_found(_req: Request) -> Response {
    Response::text("404 page not found\n")
}

pub(crate) async fn method_not_allowed(_req: Request) -> Response {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .text("Method Not Allowed\n")
}

/// `200 OK` with an `Allow` header listing `methods`, comma separated.
pub(crate) fn allow(methods: &[Method]) -> Response {
    let allow = methods.iter().map(Method::as_str).collect::<Vec<_>>().join(",");
    Response::builder()
        .status(StatusCode::OK)
        .header(ALLOW.as_str(), &allow)
        .no_body()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn default_status_fills_in_unset_status() {
        async fn body_only(_: Request) -> Response { Response::text("gone") }
        async fn explicit(_: Request) -> StatusCode { StatusCode::NO_CONTENT }

        let wrapped = DefaultStatus::wrap(body_only.into_boxed_handler(), StatusCode::NOT_FOUND);
        let res = wrapped.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"gone");

        let wrapped = DefaultStatus::wrap(explicit.into_boxed_handler(), StatusCode::NOT_FOUND);
        let res = wrapped.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn allow_joins_methods() {
        let res = allow(&[Method::GET, Method::POST]);
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.header("allow"), Some("GET,POST"));
        assert_eq!(allow(&[]).header("allow"), Some(""));
    }
}
