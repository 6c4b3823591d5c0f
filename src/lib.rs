//! # typemux
//!
//! A small HTTP multiplexer with typed path parameters.
//!
//! ## Routes
//!
//! Patterns are `/`-separated segments. A segment is literal text or a
//! capture in braces with an optional name and a type:
//!
//! | Type     | Matches                     | Value            |
//! |----------|-----------------------------|------------------|
//! | `int`    | `-1`, `1`                   | `Value::Int`     |
//! | `uint`   | `0`, `1`                    | `Value::Uint`    |
//! | `float`  | `1`, `1.123`, `-1.123`      | `Value::Float`   |
//! | `string` | any single segment          | `Value::Str`     |
//! | `path`   | the rest of the path        | `Value::Str`     |
//!
//! `{}` is an anonymous string capture, `{int}` an anonymous typed one,
//! `{id}` a named string capture, `{id uint}` a named typed one. `path` may
//! only be the final segment:
//!
//! ```text
//! /user/{id int}/edit
//! /file/{p path}
//! ```
//!
//! A static segment and a capture may share a position; the static segment
//! wins and there is no backtracking. With
//!
//! ```text
//! /user/me/edit
//! /user/{string}/edit
//! /user/{string}/new
//! ```
//!
//! `/user/me/edit` always reaches the first handler and `/user/me/new`
//! reaches none. Two different captures at the same position are rejected at
//! registration, as are duplicate routes, unknown types and unclean patterns.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use typemux::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id uint}", get_user)
//!         .get("/files/{name path}", get_file);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").and_then(|p| p.value().as_u64()).unwrap_or_default();
//!     Response::json(format!(r#"{{"id":{id}}}"#).into_bytes())
//! }
//!
//! async fn get_file(req: Request) -> Response {
//!     let name = req.param("name").map(|p| p.raw()).unwrap_or_default();
//!     Response::text(format!("file {name}"))
//! }
//! ```

mod error;
mod handler;
mod norm;
mod params;
mod pattern;
mod request;
mod response;
mod router;
mod server;
mod tree;

pub use error::{Error, PathError, RouteError};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use norm::clean_path;
pub use params::{ParamInfo, Params, Value};
pub use pattern::{parse_segment, Kind, Segment};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{serve_listener, Server};
pub use tree::{Match, Tree};
