use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use landspice_auth::{
    AccountStatus, CredentialStore, Role, StoreError, StoredCredential, hash_password,
};
use landspice_core::{RestaurantId, UserId};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Credential store backed by a map keyed by username.
///
/// Intended for tests/dev. Usernames are matched exactly.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a record by username.
    pub fn upsert(&self, record: StoredCredential) {
        let mut users = self.users.write().unwrap_or_else(|p| p.into_inner());
        users.insert(record.username.clone(), record);
    }

    /// Hash `password` and add a new account. Fails on a taken username.
    pub fn seed(
        &self,
        username: &str,
        password: &str,
        role: Role,
        status: AccountStatus,
        display_name: &str,
        restaurant_id: Option<RestaurantId>,
    ) -> Result<UserId, SeedError> {
        let password_hash = hash_password(password).map_err(|e| SeedError::Hash(e.to_string()))?;

        let mut users = self.users.write().unwrap_or_else(|p| p.into_inner());
        if users.contains_key(username) {
            return Err(SeedError::DuplicateUsername(username.to_string()));
        }

        let user_id = UserId::new();
        users.insert(
            username.to_string(),
            StoredCredential {
                user_id,
                username: username.to_string(),
                password_hash,
                role,
                status,
                display_name: display_name.to_string(),
                restaurant_id,
                last_login_at: None,
            },
        );
        Ok(user_id)
    }

    /// Change the status of an existing account; `false` if unknown.
    pub fn set_status(&self, user_id: UserId, status: AccountStatus) -> bool {
        let mut users = self.users.write().unwrap_or_else(|p| p.into_inner());
        match users.values_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.status = status;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory credential store lock poisoned".to_string())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.get(username).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<StoredCredential>, StoreError> {
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.values().find(|u| u.user_id == user_id).cloned())
    }

    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        if let Some(user) = users.values_mut().find(|u| u.user_id == user_id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landspice_auth::verify_password;

    #[tokio::test]
    async fn seeded_account_is_found_with_a_verifiable_hash() {
        let store = InMemoryCredentialStore::new();
        let id = store
            .seed("harbor-bank", "s3cret-pass", Role::Bank, AccountStatus::Active, "Harbor Bank", None)
            .unwrap();

        let by_name = store.find_by_username("harbor-bank").await.unwrap().unwrap();
        assert_eq!(by_name.user_id, id);
        assert_ne!(by_name.password_hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &by_name.password_hash));

        let by_id = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id, by_name);
    }

    #[tokio::test]
    async fn lookups_are_exact() {
        let store = InMemoryCredentialStore::new();
        store
            .seed("harbor-bank", "s3cret-pass", Role::Bank, AccountStatus::Active, "Harbor Bank", None)
            .unwrap();

        assert!(store.find_by_username("Harbor-Bank").await.unwrap().is_none());
        assert!(store.find_by_id(UserId::new()).await.unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = InMemoryCredentialStore::new();
        store
            .seed("dup-user", "s3cret-pass", Role::Supplier, AccountStatus::Active, "One", None)
            .unwrap();
        let err = store
            .seed("dup-user", "other-pass", Role::Admin, AccountStatus::Active, "Two", None)
            .unwrap_err();
        assert!(matches!(err, SeedError::DuplicateUsername(name) if name == "dup-user"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn record_login_and_status_changes_apply() {
        let store = InMemoryCredentialStore::new();
        let id = store
            .seed("frozen-diner", "s3cret-pass", Role::Restaurant, AccountStatus::Active, "Diner", None)
            .unwrap();

        let at = Utc::now();
        store.record_login(id, at).await.unwrap();
        assert!(store.set_status(id, AccountStatus::Suspended));
        assert!(!store.set_status(UserId::new(), AccountStatus::Suspended));

        let rec = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(rec.last_login_at, Some(at));
        assert_eq!(rec.status, AccountStatus::Suspended);
    }

    #[tokio::test]
    async fn record_login_for_unknown_user_is_a_no_op() {
        let store = InMemoryCredentialStore::new();
        assert!(store.record_login(UserId::new(), Utc::now()).await.is_ok());
        assert!(store.is_empty());
    }
}
