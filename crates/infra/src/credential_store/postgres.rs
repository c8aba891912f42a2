//! Postgres-backed credential store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolClosed, PoolTimedOut, Io, Tls | `Unavailable` |
//! | Database (any code) | `Unavailable` |
//! | ColumnDecode, Decode, ColumnNotFound | `Corrupt` |
//! | Other | `Unavailable` |
//!
//! Rows whose `role` or `status` is not a known name are `Corrupt`; they are
//! never coerced into some default role.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use landspice_auth::{AccountStatus, CredentialStore, Role, StoreError, StoredCredential};
use landspice_core::{RestaurantId, UserId};

const FIND_BY_USERNAME: &str = r#"
    SELECT id, username, password_hash, role, status, display_name, restaurant_id, last_login_at
    FROM users
    WHERE username = $1
"#;

const FIND_BY_ID: &str = r#"
    SELECT id, username, password_hash, role, status, display_name, restaurant_id, last_login_at
    FROM users
    WHERE id = $1
"#;

#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect with a small default pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `users` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id              UUID PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                role            TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'active',
                display_name    TEXT NOT NULL,
                restaurant_id   UUID NULL,
                last_login_at   TIMESTAMPTZ NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    /// Insert a new account row. Used for provisioning.
    #[instrument(skip(self, record), fields(username = %record.username), err)]
    pub async fn insert(&self, record: &StoredCredential) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, username, password_hash, role, status, display_name, restaurant_id, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*record.user_id.as_uuid())
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.status.as_str())
        .bind(&record.display_name)
        .bind(record.restaurant_id.map(|id| *id.as_uuid()))
        .bind(record.last_login_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredCredential>, StoreError> {
        let row = sqlx::query(FIND_BY_USERNAME)
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_username", e))?;

        row.as_ref().map(UserRow::from_pg_row).transpose()?.map(UserRow::into_credential).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<StoredCredential>, StoreError> {
        let row = sqlx::query(FIND_BY_ID)
            .bind(*user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(UserRow::from_pg_row).transpose()?.map(UserRow::into_credential).transpose()
    }

    /// Fire-and-forget: the UPDATE runs on a spawned task and this returns
    /// immediately. Failures are logged by the task.
    async fn record_login(&self, user_id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let pool = Arc::clone(&self.pool);
        tokio::spawn(async move {
            let result = sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
                .bind(*user_id.as_uuid())
                .bind(at)
                .execute(&*pool)
                .await;
            if let Err(e) = result {
                let err = map_sqlx_error("record_login", e);
                tracing::warn!(user_id = %user_id, error = %err, "last-login update failed");
            }
        });
        Ok(())
    }
}

/// Map SQLx errors to `StoreError` with consistent error messages.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("undecodable row in {operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    status: String,
    display_name: String,
    restaurant_id: Option<Uuid>,
    last_login_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn from_pg_row(row: &sqlx::postgres::PgRow) -> Result<Self, StoreError> {
        let decode = |e| map_sqlx_error("decode_user", e);
        Ok(UserRow {
            id: row.try_get("id").map_err(decode)?,
            username: row.try_get("username").map_err(decode)?,
            password_hash: row.try_get("password_hash").map_err(decode)?,
            role: row.try_get("role").map_err(decode)?,
            status: row.try_get("status").map_err(decode)?,
            display_name: row.try_get("display_name").map_err(decode)?,
            restaurant_id: row.try_get("restaurant_id").map_err(decode)?,
            last_login_at: row.try_get("last_login_at").map_err(decode)?,
        })
    }

    fn into_credential(self) -> Result<StoredCredential, StoreError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {e}", self.id)))?;
        let status: AccountStatus = self
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {e}", self.id)))?;

        Ok(StoredCredential {
            user_id: UserId::from_uuid(self.id),
            username: self.username,
            password_hash: self.password_hash,
            role,
            status,
            display_name: self.display_name,
            restaurant_id: self.restaurant_id.map(RestaurantId::from_uuid),
            last_login_at: self.last_login_at,
        })
    }
}
