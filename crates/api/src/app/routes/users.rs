use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use landspice_auth::{AccountStatus, CredentialStore, Permission, Resource, Role, StoredCredential};
use landspice_core::{RestaurantId, UserId};

use crate::app::{AppState, errors};
use crate::authz;
use crate::context::CurrentSession;

/// Account profile. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
    pub display_name: String,
    pub restaurant_id: Option<RestaurantId>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<StoredCredential> for UserProfile {
    fn from(rec: StoredCredential) -> Self {
        Self {
            id: rec.user_id,
            username: rec.username,
            role: rec.role,
            status: rec.status,
            display_name: rec.display_name,
            restaurant_id: rec.restaurant_id,
            last_login_at: rec.last_login_at,
        }
    }
}

/// GET /api/users/:id
///
/// Authorization runs before the lookup, so a denied caller cannot probe
/// which ids exist.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Response {
    let Ok(user_id) = id.parse::<UserId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid user id");
    };

    if let Err(resp) = authz::require_owned(&state, &session, Resource::Users, Permission::Read, user_id) {
        return resp;
    }

    match state.store().find_by_id(user_id).await {
        Ok(Some(rec)) => Json(UserProfile::from(rec)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "user not found"),
        Err(e) => {
            state.reporter.internal_error("user_lookup", &e);
            errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "user store unavailable")
        }
    }
}
