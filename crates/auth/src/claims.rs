use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use landspice_core::{RestaurantId, UserId};

use crate::{AccountStatus, Identity, Role};

/// Session token claims (transport-agnostic).
///
/// Everything the gate needs is in here; there is no server-side session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / user identifier.
    pub sub: UserId,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp (exclusive).
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn new(identity: &Identity, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: identity.user_id,
            username: identity.username.clone(),
            role: identity.role,
            status: identity.status,
            display_name: identity.display_name.clone(),
            restaurant_id: identity.restaurant_id,
            issued_at,
            expires_at,
        }
    }

    pub fn into_identity(self) -> Identity {
        Identity {
            user_id: self.sub,
            username: self.username,
            role: self.role,
            status: self.status,
            display_name: self.display_name,
            restaurant_id: self.restaurant_id,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// A token whose expiry equals `now` is already expired.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
