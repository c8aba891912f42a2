//! Handler-side authorization on top of the route gate.
//!
//! The gate only knows paths; handlers call these before touching data.

use axum::response::Response;

use landspice_auth::{Permission, Resource, authorize, authorize_owned};
use landspice_core::UserId;

use crate::app::{AppState, errors};
use crate::context::CurrentSession;

/// Matrix check for the current session. Denials are reported and become 403.
pub fn require(
    state: &AppState,
    session: &CurrentSession,
    resource: Resource,
    permission: Permission,
) -> Result<(), Response> {
    let matrix = state.matrix.load();
    authorize(&matrix, session.identity(), resource, permission).map_err(|e| {
        state
            .reporter
            .access_denied(Some(session.user_id()), &format!("{resource}:{permission}"), &e.to_string());
        errors::authz_error_to_response(&e)
    })
}

/// [`require`] plus the ownership check for a row owned by `owner_id`.
pub fn require_owned(
    state: &AppState,
    session: &CurrentSession,
    resource: Resource,
    permission: Permission,
    owner_id: UserId,
) -> Result<(), Response> {
    let matrix = state.matrix.load();
    authorize_owned(&matrix, session.identity(), resource, permission, owner_id).map_err(|e| {
        state
            .reporter
            .access_denied(Some(session.user_id()), &format!("{resource}:{permission}"), &e.to_string());
        errors::authz_error_to_response(&e)
    })
}
