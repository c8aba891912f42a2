//! Matrix inspection and reload. Admin only (route gate plus matrix check).

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use landspice_auth::{Permission, Resource};

use crate::app::{AppState, errors};
use crate::authz;
use crate::config::load_matrix;
use crate::context::CurrentSession;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/matrix", get(get_matrix))
        .route("/matrix/reload", post(reload_matrix))
}

/// GET /api/admin/matrix
pub async fn get_matrix(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    if let Err(resp) = authz::require(&state, &session, Resource::System, Permission::Read) {
        return resp;
    }
    Json(state.matrix.load().to_document()).into_response()
}

/// POST /api/admin/matrix/reload
///
/// Re-reads the configured file. A rejected file leaves the current matrix in
/// place.
pub async fn reload_matrix(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    if let Err(resp) = authz::require(&state, &session, Resource::System, Permission::Manage) {
        return resp;
    }

    let Some(path) = state.matrix_path.as_deref() else {
        return errors::json_error(StatusCode::CONFLICT, "no permission matrix file configured");
    };

    match load_matrix(Some(path)) {
        Ok(matrix) => {
            state.matrix.replace(matrix);
            tracing::info!(path = %path.display(), user_id = %session.user_id(), "permission matrix reloaded");
            Json(serde_json::json!({ "reloaded": true })).into_response()
        }
        Err(e) => {
            state.reporter.internal_error("matrix_reload", &e);
            errors::json_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}
