//! Username/password verification against a credential store.
//!
//! Outward results deliberately collapse "no such user" and "wrong password"
//! into [`AuthFailure::InvalidCredentials`]; only the reporter sees which one
//! happened.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use landspice_core::{RestaurantId, UserId};

use crate::gate::ErrorReason;
use crate::report::{AttemptOutcome, AuthReporter};
use crate::{AccountStatus, Identity, Role};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Hashed against when the username is unknown, so a miss costs one argon2
/// verification just like a wrong password.
const TIMING_DECOY: &str = "landspice-timing-decoy";

/// A user row as the credential store returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub user_id: UserId,
    pub username: String,
    /// PHC-formatted argon2 hash.
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
    pub display_name: String,
    pub restaurant_id: Option<RestaurantId>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
            role: self.role,
            status: self.status,
            display_name: self.display_name.clone(),
            restaurant_id: self.restaurant_id,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt credential record: {0}")]
    Corrupt(String),
}

/// Boundary to wherever user accounts live.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, StoreError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<StoredCredential>, StoreError>;

    /// Best effort. Implementations may return before the write lands.
    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<StoredCredential>, StoreError> {
        (**self).find_by_id(user_id).await
    }

    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).record_login(user_id, at).await
    }
}

/// Outward-facing sign-in failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown username or wrong password; intentionally indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Correct password, but the account may not sign in.
    #[error("account is {0}")]
    AccountNotActive(AccountStatus),

    #[error("sign-in is temporarily unavailable")]
    Unavailable,
}

impl AuthFailure {
    /// Code handed to the error page.
    pub fn reason(&self) -> ErrorReason {
        match self {
            AuthFailure::InvalidInput(_) | AuthFailure::InvalidCredentials => {
                ErrorReason::CredentialsSignin
            }
            AuthFailure::AccountNotActive(_) => ErrorReason::AccountDeactivated,
            AuthFailure::Unavailable => ErrorReason::Configuration,
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Constant-time verification; an unparsable hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn validate_input(username: &str, password: &str) -> Result<(), String> {
    let name_len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&name_len) {
        return Err(format!(
            "username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters"
        ));
    }
    let pass_len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&pass_len) {
        return Err(format!(
            "password must be {PASSWORD_MIN_LEN}-{PASSWORD_MAX_LEN} characters"
        ));
    }
    Ok(())
}

/// Turns a username/password pair into an [`Identity`].
pub struct CredentialVerifier<S> {
    store: S,
    reporter: Arc<dyn AuthReporter>,
    decoy_hash: String,
}

impl<S: CredentialStore> CredentialVerifier<S> {
    pub fn new(store: S, reporter: Arc<dyn AuthReporter>) -> Self {
        let decoy_hash = match hash_password(TIMING_DECOY) {
            Ok(hash) => hash,
            Err(e) => {
                reporter.internal_error("timing_decoy", &e);
                String::new()
            }
        };
        Self {
            store,
            reporter,
            decoy_hash,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every call produces exactly one `sign_in_attempt` report.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthFailure> {
        let username = username.trim();
        let (outcome, result) = self.attempt(username, password).await;
        self.reporter.sign_in_attempt(
            username,
            outcome,
            result.as_ref().ok().map(|identity| identity.user_id),
        );
        result
    }

    async fn attempt(
        &self,
        username: &str,
        password: &str,
    ) -> (AttemptOutcome, Result<Identity, AuthFailure>) {
        if let Err(msg) = validate_input(username, password) {
            return (AttemptOutcome::InvalidInput, Err(AuthFailure::InvalidInput(msg)));
        }

        let record = match self.store.find_by_username(username).await {
            Ok(record) => record,
            Err(e) => {
                self.reporter.internal_error("credential_lookup", &e);
                return (AttemptOutcome::StoreUnavailable, Err(AuthFailure::Unavailable));
            }
        };

        let Some(record) = record else {
            let _ = verify_password(password, &self.decoy_hash);
            return (AttemptOutcome::UnknownUser, Err(AuthFailure::InvalidCredentials));
        };

        if !verify_password(password, &record.password_hash) {
            return (AttemptOutcome::WrongPassword, Err(AuthFailure::InvalidCredentials));
        }

        if !record.status.is_active() {
            return (
                AttemptOutcome::AccountNotActive,
                Err(AuthFailure::AccountNotActive(record.status)),
            );
        }

        if let Err(e) = self.store.record_login(record.user_id, Utc::now()).await {
            self.reporter.internal_error("record_login", &e);
        }

        (AttemptOutcome::Success, Ok(record.identity()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::report::testing::RecordingReporter;

    #[derive(Default)]
    struct MapStore {
        users: HashMap<String, StoredCredential>,
        logins: Mutex<Vec<UserId>>,
        fail_lookup: bool,
        fail_record: bool,
    }

    #[async_trait]
    impl CredentialStore for MapStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
            if self.fail_lookup {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            Ok(self.users.get(username).cloned())
        }

        async fn find_by_id(&self, user_id: UserId) -> Result<Option<StoredCredential>, StoreError> {
            Ok(self.users.values().find(|u| u.user_id == user_id).cloned())
        }

        async fn record_login(&self, user_id: UserId, _at: DateTime<Utc>) -> Result<(), StoreError> {
            if self.fail_record {
                return Err(StoreError::Unavailable("read-only replica".into()));
            }
            self.logins.lock().unwrap().push(user_id);
            Ok(())
        }
    }

    fn record(username: &str, password: &str, role: Role, status: AccountStatus) -> StoredCredential {
        StoredCredential {
            user_id: UserId::new(),
            username: username.to_string(),
            password_hash: hash_password(password).unwrap(),
            role,
            status,
            display_name: username.to_uppercase(),
            restaurant_id: None,
            last_login_at: None,
        }
    }

    fn verifier(store: MapStore) -> (CredentialVerifier<MapStore>, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        (CredentialVerifier::new(store, reporter.clone()), reporter)
    }

    fn store_with(records: Vec<StoredCredential>) -> MapStore {
        MapStore {
            users: records.into_iter().map(|r| (r.username.clone(), r)).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn correct_credentials_yield_identity_and_record_login() {
        let rec = record("harbor-bank", "s3cret-pass", Role::Bank, AccountStatus::Active);
        let expected = rec.identity();
        let (v, reporter) = verifier(store_with(vec![rec]));

        let identity = v.authenticate("harbor-bank", "s3cret-pass").await.unwrap();
        assert_eq!(identity, expected);
        assert_eq!(v.store().logins.lock().unwrap().as_slice(), &[expected.user_id]);
        assert_eq!(
            reporter.attempts.lock().unwrap().as_slice(),
            &[("harbor-bank".to_string(), AttemptOutcome::Success)]
        );
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_identical() {
        let rec = record("harbor-bank", "s3cret-pass", Role::Bank, AccountStatus::Active);
        let (v, reporter) = verifier(store_with(vec![rec]));

        let wrong_password = v.authenticate("harbor-bank", "guess-again").await.unwrap_err();
        let unknown_user = v.authenticate("nobody-here", "guess-again").await.unwrap_err();

        assert_eq!(wrong_password, AuthFailure::InvalidCredentials);
        assert_eq!(unknown_user, wrong_password);
        assert_eq!(unknown_user.to_string(), wrong_password.to_string());
        assert_eq!(unknown_user.reason(), wrong_password.reason());

        let outcomes: Vec<_> = reporter.attempts.lock().unwrap().iter().map(|(_, o)| *o).collect();
        assert_eq!(outcomes, vec![AttemptOutcome::WrongPassword, AttemptOutcome::UnknownUser]);
    }

    #[tokio::test]
    async fn inactive_account_is_distinct_only_after_password_match() {
        let rec = record("frozen-diner", "s3cret-pass", Role::Restaurant, AccountStatus::Suspended);
        let (v, _) = verifier(store_with(vec![rec]));

        assert_eq!(
            v.authenticate("frozen-diner", "wrong-pass").await.unwrap_err(),
            AuthFailure::InvalidCredentials
        );
        let err = v.authenticate("frozen-diner", "s3cret-pass").await.unwrap_err();
        assert_eq!(err, AuthFailure::AccountNotActive(AccountStatus::Suspended));
        assert_eq!(err.reason(), ErrorReason::AccountDeactivated);
        assert!(v.store().logins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_the_store() {
        let store = MapStore {
            fail_lookup: true,
            ..Default::default()
        };
        let (v, reporter) = verifier(store);

        for (user, pass) in [("", "s3cret-pass"), ("ab", "s3cret-pass"), ("   ", "x"), ("valid-user", "short")] {
            let err = v.authenticate(user, pass).await.unwrap_err();
            assert!(matches!(err, AuthFailure::InvalidInput(_)), "{user:?}/{pass:?} gave {err:?}");
        }
        let too_long = "x".repeat(USERNAME_MAX_LEN + 1);
        assert!(matches!(
            v.authenticate(&too_long, "s3cret-pass").await,
            Err(AuthFailure::InvalidInput(_))
        ));
        assert!(reporter.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn username_is_trimmed_before_lookup() {
        let rec = record("harbor-bank", "s3cret-pass", Role::Bank, AccountStatus::Active);
        let (v, _) = verifier(store_with(vec![rec]));
        assert!(v.authenticate("  harbor-bank ", "s3cret-pass").await.is_ok());
    }

    #[tokio::test]
    async fn store_outage_is_unavailable_and_reported() {
        let store = MapStore {
            fail_lookup: true,
            ..Default::default()
        };
        let (v, reporter) = verifier(store);

        let err = v.authenticate("harbor-bank", "s3cret-pass").await.unwrap_err();
        assert_eq!(err, AuthFailure::Unavailable);
        assert_eq!(reporter.errors.lock().unwrap()[0].0, "credential_lookup");
    }

    #[tokio::test]
    async fn failed_last_login_write_does_not_fail_sign_in() {
        let rec = record("harbor-bank", "s3cret-pass", Role::Bank, AccountStatus::Active);
        let mut store = store_with(vec![rec]);
        store.fail_record = true;
        let (v, reporter) = verifier(store);

        assert!(v.authenticate("harbor-bank", "s3cret-pass").await.is_ok());
        assert_eq!(reporter.errors.lock().unwrap()[0].0, "record_login");
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn password_never_appears_in_failure_text() {
        let failure = AuthFailure::InvalidInput(validate_input("ab", "hunter22").unwrap_err());
        assert!(!failure.to_string().contains("hunter22"));
    }
}
