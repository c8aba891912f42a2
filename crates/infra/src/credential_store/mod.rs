//! Implementations of [`landspice_auth::CredentialStore`].
//!
//! - [`InMemoryCredentialStore`]: tests, local runs, bootstrap admin
//! - [`PostgresCredentialStore`]: the `users` table

mod in_memory;
mod postgres;

pub use in_memory::{InMemoryCredentialStore, SeedError};
pub use postgres::PostgresCredentialStore;
