//! Request router.
//!
//! One route tree for all methods, handlers keyed by method on each terminal
//! node. Registration happens once at startup and panics on configuration
//! mistakes; dispatch is a read-only walk plus a fallback policy:
//!
//! 1. Non-`CONNECT` requests with an unclean path (`.`, `..`, `//`) are
//!    redirected with `308` to the cleaned path. Nothing is matched.
//! 2. No route matches → not-found handler.
//! 3. The route has a handler for the method → that handler, with the route
//!    template and captured parameters attached to the request.
//! 4. `OPTIONS` without a dedicated handler → options hook (on by default,
//!    answers with an `Allow` header).
//! 5. The route has other methods, or the options hook is on → method-not-allowed
//!    handler (`405` by default, can be disabled).
//! 6. Anything else → not-found handler.

use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::debug;

use crate::error::RouteError;
use crate::handler::{self, BoxedHandler, DefaultStatus, Handler, OptionsHook};
use crate::norm::{clean_path, escape_path};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::tree::Tree;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method takes `self` by value and returns it, so registrations
/// chain naturally and the finished router is immutable.
pub struct Router {
    tree: Tree<BoxedHandler>,
    not_found: BoxedHandler,
    method_not_allowed: Option<BoxedHandler>,
    options: Option<OptionsHook>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            not_found: DefaultStatus::wrap(
                handler::not_found.into_boxed_handler(),
                StatusCode::NOT_FOUND,
            ),
            method_not_allowed: Some(handler::method_not_allowed.into_boxed_handler()),
            options: Some(Arc::new(handler::allow)),
        }
    }

    /// Register a handler for a method + pattern pair. Returns `self` for
    /// chaining.
    ///
    /// Patterns use typed captures, see the [crate docs](crate):
    ///
    /// ```rust,no_run
    /// # use http::Method;
    /// # use typemux::{Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// # async fn get_file(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id uint}",    get_user)
    ///     .on(Method::POST, "/users",              create_user)
    ///     .on(Method::GET,  "/files/{name path}",  get_file);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the pattern is invalid or conflicts with an existing route.
    /// A router that cannot be built as written should stop the process at
    /// startup; use [`try_on`](Router::try_on) to report the error first.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.try_on(method, pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"))
    }

    /// Like [`on`](Router::on), but returns the configuration error.
    pub fn try_on(
        mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler,
    ) -> Result<Self, RouteError> {
        debug!(%method, route = pattern, "registering route");
        self.tree.insert(method, pattern, handler.into_boxed_handler())?;
        Ok(self)
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, pattern, handler)
    }

    /// Sets the handler for requests that match no route.
    ///
    /// If the handler's response has no explicit status it is sent as
    /// `404 Not Found` rather than `200 OK`.
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found = DefaultStatus::wrap(handler.into_boxed_handler(), StatusCode::NOT_FOUND);
        self
    }

    /// Sets the handler for requests whose path matches a route that has no
    /// handler for the request method.
    pub fn method_not_allowed(mut self, handler: impl Handler) -> Self {
        self.method_not_allowed = Some(handler.into_boxed_handler());
        self
    }

    /// Sends method mismatches to the not-found handler instead.
    pub fn no_method_not_allowed(mut self) -> Self {
        self.method_not_allowed = None;
        self
    }

    /// Replaces the automatic `OPTIONS` responder. `hook` receives the methods
    /// registered on the matched route.
    ///
    /// A handler registered explicitly for `OPTIONS` on a route always takes
    /// precedence over the hook.
    pub fn options<F, R>(mut self, hook: F) -> Self
    where
        F: Fn(&[Method]) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.options = Some(Arc::new(move |methods: &[Method]| hook(methods).into_response()));
        self
    }

    /// Disables automatic `OPTIONS` handling.
    pub fn no_options(mut self) -> Self {
        self.options = None;
        self
    }

    /// Routes one request and produces one response.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        if req.method != Method::CONNECT {
            let cleaned = clean_path(&req.path);
            if cleaned != req.path {
                let cleaned = escape_path(&cleaned, b"%?#");
                let location = match &req.query {
                    Some(query) => format!("{cleaned}?{query}"),
                    None => cleaned,
                };
                debug!(method = %req.method, path = %req.path, %location, "redirecting to clean path");
                return Response::redirect(&location);
            }
        }

        let path = req.path.strip_prefix('/').unwrap_or(&req.path);
        let Some(matched) = self.tree.at(path) else {
            debug!(method = %req.method, path = %req.path, "no route");
            return self.not_found.call(req).await;
        };

        if let Some(handler) = matched.value(&req.method) {
            let handler = Arc::clone(handler);
            let route = matched.route();
            req.attach(route, matched.into_params());
            return handler.call(req).await;
        }

        if req.method == Method::OPTIONS {
            if let Some(options) = &self.options {
                return options(matched.methods().as_slice());
            }
        }

        match &self.method_not_allowed {
            Some(handler) if matched.has_methods() || self.options.is_some() => {
                debug!(method = %req.method, path = %req.path, "method not allowed");
                handler.call(req).await
            }
            _ => self.not_found.call(req).await,
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
