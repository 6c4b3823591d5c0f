//! Minimal typemux example: typed parameters, a wildcard, and a canonical
//! redirect.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i http://localhost:3000/users/-1            # 404, not a uint
//!   curl -i http://localhost:3000/users/me            # static beats {id uint}
//!   curl -i http://localhost:3000/files/docs/a/b.txt
//!   curl -i http://localhost:3000/profile/Alice/personal
//!   curl -i -X OPTIONS http://localhost:3000/users/42
//!   curl -i -X PUT http://localhost:3000/users/42     # 405
//!   curl -i http://localhost:3000//users/./42         # 308 to /users/42

use typemux::{Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/users/me",                          current_user)
        .get("/users/{id uint}",                   get_user)
        .delete("/users/{id uint}",                delete_user)
        .get("/files/{name path}",                 get_file)
        .get("/profile/{username string}/personal", profile)
        .not_found(not_found);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/me
async fn current_user(_req: Request) -> Response {
    Response::json(r#"{"id":0,"name":"me"}"#)
}

// GET /users/{id uint}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").and_then(|p| p.value().as_u64()).unwrap_or_default();
    Response::json(format!(r#"{{"id":{id},"name":"alice"}}"#).into_bytes())
}

// DELETE /users/{id uint} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /files/{name path}
async fn get_file(req: Request) -> String {
    let name = req.param("name").map(|p| p.raw()).unwrap_or_default();
    format!("contents of {name}\n")
}

// GET /profile/{username string}/personal
//
// Usernames are lowercase; anything else is redirected to the canonical URL.
async fn profile(req: Request) -> Response {
    let raw = req.param("username").map(|p| p.raw().to_owned()).unwrap_or_default();
    let normalized = raw.to_lowercase();
    if normalized != raw {
        match req.with_param("username", &normalized).canonical_path() {
            Ok(path) => return Response::redirect(&path),
            Err(e) => tracing::warn!("cannot build canonical path: {e}"),
        }
    }
    Response::text(format!("Profile for the user {raw:?}\n"))
}

// No status set: sent as 404.
async fn not_found(req: Request) -> Response {
    Response::text(format!("nothing at {}\n", req.path()))
}
