use axum::{
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};

use crate::app::AppState;
use crate::app::routes::auth::SessionUser;
use crate::context::CurrentSession;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn whoami(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user": SessionUser::from(session.identity()),
        "landing": state.routes.landing_for(session.role()),
    }))
}
