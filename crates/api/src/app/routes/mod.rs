use axum::{
    Router,
    routing::{get, post},
};

use crate::app::AppState;

pub mod admin;
pub mod auth;
pub mod navigation;
pub mod pages;
pub mod permissions;
pub mod system;
pub mod users;

/// Router for every endpoint. The gate is layered on top by `build_app`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(system::health))
        .route("/api/whoami", get(system::whoami))
        .route("/api/auth/signin", post(auth::sign_in))
        .route("/api/auth/signout", post(auth::sign_out))
        .route("/api/auth/session", get(auth::session))
        .route("/api/navigation", get(navigation::navigation))
        .nest("/api/permissions", permissions::router())
        .route("/api/users/:id", get(users::get_user))
        .nest("/api/admin", admin::router())
        .merge(pages::router())
}
