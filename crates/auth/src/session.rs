//! Stateless signed sessions.
//!
//! A session is an HS256 JWT over [`SessionClaims`]. Nothing is stored on the
//! server: rotating the secret invalidates every outstanding session, and
//! signing out is the client dropping the cookie.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::Identity;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default session lifetime.
pub const DEFAULT_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionKeyError {
    #[error("session secret must be at least {min} bytes (got {0})", min = MIN_SECRET_LEN)]
    TooShort(usize),

    #[error("session lifetime must be positive")]
    NonPositiveTtl,
}

/// Why a token did not yield an identity. Callers collapse all of these into
/// "not authenticated".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session token")]
    Missing,

    #[error("invalid token signature")]
    BadSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("session expired")]
    Expired,

    #[error(transparent)]
    Window(TokenValidationError),

    #[error("failed to sign session: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for SessionError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => SessionError::Expired,
            other => SessionError::Window(other),
        }
    }
}

/// Issues and reads session tokens with one process-wide key.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl core::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, SessionKeyError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SessionKeyError::TooShort(secret.len()));
        }
        if ttl <= Duration::zero() {
            return Err(SessionKeyError::NonPositiveTtl);
        }

        // Time checks are done by `validate_claims` so the expiry boundary is
        // exact (no leeway) and uses the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, SessionError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionClaims::new(identity, now, now + self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    pub fn read(&self, token: Option<&str>) -> Result<Identity, SessionError> {
        self.read_at(token, Utc::now())
    }

    /// Verify signature and time window, returning the carried identity.
    pub fn read_at(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Identity, SessionError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(SessionError::Missing)?;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => SessionError::BadSignature,
                _ => SessionError::Malformed(e.to_string()),
            },
        )?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims.into_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountStatus, Role};
    use landspice_core::{RestaurantId, UserId};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> SessionService {
        SessionService::new(SECRET, Duration::minutes(DEFAULT_TTL_MINUTES)).unwrap()
    }

    fn identity(role: Role, status: AccountStatus) -> Identity {
        Identity {
            user_id: UserId::new(),
            username: "olive-garden-7".to_string(),
            role,
            status,
            display_name: "Olive Garden #7".to_string(),
            restaurant_id: Some(RestaurantId::new()),
        }
    }

    #[test]
    fn read_reproduces_issued_identity() {
        let svc = service();
        for role in Role::ALL {
            for status in [AccountStatus::Active, AccountStatus::Inactive, AccountStatus::Suspended] {
                let id = identity(*role, status);
                let token = svc.issue(&id).unwrap();
                assert_eq!(svc.read(Some(&token)).unwrap(), id);
            }
        }
    }

    #[test]
    fn token_expiring_now_is_invalid() {
        let svc = service();
        let t0 = Utc::now();
        let token = svc.issue_at(&identity(Role::Bank, AccountStatus::Active), t0).unwrap();

        let expiry = t0 + svc.ttl();
        assert!(svc.read_at(Some(&token), expiry - Duration::seconds(1)).is_ok());
        assert_eq!(svc.read_at(Some(&token), expiry), Err(SessionError::Expired));
        assert_eq!(
            svc.read_at(Some(&token), expiry + Duration::days(3)),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn missing_and_blank_tokens() {
        let svc = service();
        assert_eq!(svc.read(None), Err(SessionError::Missing));
        assert_eq!(svc.read(Some("   ")), Err(SessionError::Missing));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        assert!(matches!(svc.read(Some("not.a.jwt")), Err(SessionError::Malformed(_))));
    }

    #[test]
    fn rotated_secret_invalidates_sessions() {
        let token = service()
            .issue(&identity(Role::Admin, AccountStatus::Active))
            .unwrap();
        let rotated =
            SessionService::new(b"fedcba9876543210fedcba9876543210", Duration::hours(1)).unwrap();
        assert_eq!(rotated.read(Some(&token)), Err(SessionError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let svc = service();
        let forged = svc.issue(&identity(Role::Admin, AccountStatus::Active)).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        let token = svc.issue(&identity(Role::Restaurant, AccountStatus::Active)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let spliced = parts.join(".");
        assert_eq!(svc.read(Some(&spliced)), Err(SessionError::BadSignature));
    }

    #[test]
    fn weak_configuration_is_refused() {
        assert_eq!(
            SessionService::new(b"short", Duration::hours(1)).unwrap_err(),
            SessionKeyError::TooShort(5)
        );
        assert_eq!(
            SessionService::new(SECRET, Duration::zero()).unwrap_err(),
            SessionKeyError::NonPositiveTtl
        );
    }
}
