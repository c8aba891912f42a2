use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use landspice_auth::AuthzError;

/// `{ "error": message }` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn unauthenticated() -> Response {
    json_error(StatusCode::UNAUTHORIZED, "authentication required")
}

/// Authorization failures are always 403; the message names what was missing.
pub fn authz_error_to_response(err: &AuthzError) -> Response {
    json_error(StatusCode::FORBIDDEN, err.to_string())
}

pub fn internal_error() -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
