//! Permission lookups for UI rendering and debugging.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use landspice_auth::{Permission, Resource, Role, explain_authorization};

use crate::app::{AppState, errors};
use crate::context::CurrentSession;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub resource: String,
    pub permission: String,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub resource: String,
    pub permission: String,
    /// Another role to explain; admin only.
    pub role: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check", get(check))
        .route("/explain", get(explain))
        .route("/:resource", get(list_for_resource))
}

/// GET /api/permissions/:resource: actions the current role holds.
pub async fn list_for_resource(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(resource): Path<String>,
) -> Response {
    let Ok(resource) = resource.parse::<Resource>() else {
        return errors::json_error(StatusCode::NOT_FOUND, format!("unknown resource '{resource}'"));
    };
    let permissions = state.matrix.load().user_permissions(session.role(), resource);
    Json(serde_json::json!({
        "role": session.role(),
        "resource": resource,
        "permissions": permissions,
    }))
    .into_response()
}

/// GET /api/permissions/check?resource=..&permission=..
///
/// Unknown names answer `false` rather than an error.
pub async fn check(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Query(q): Query<CheckQuery>,
) -> Response {
    let allowed = state
        .matrix
        .load()
        .check_named(session.role().as_str(), &q.resource, &q.permission);
    Json(serde_json::json!({ "allowed": allowed })).into_response()
}

/// GET /api/permissions/explain?resource=..&permission=..[&role=..]
pub async fn explain(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Query(q): Query<ExplainQuery>,
) -> Response {
    let role = match q.role.as_deref() {
        None => session.role(),
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) if role == session.role() || session.role() == Role::Admin => role,
            Ok(_) => {
                return errors::json_error(
                    StatusCode::FORBIDDEN,
                    "only admins may explain other roles",
                );
            }
            Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
        },
    };

    let (resource, permission) = match (q.resource.parse::<Resource>(), q.permission.parse::<Permission>()) {
        (Ok(resource), Ok(permission)) => (resource, permission),
        (Err(e), _) | (_, Err(e)) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let matrix = state.matrix.load();
    Json(explain_authorization(&matrix, role, resource, permission)).into_response()
}
