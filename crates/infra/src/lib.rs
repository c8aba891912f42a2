//! Infrastructure layer: credential-store adapters.

pub mod credential_store;

pub use credential_store::{InMemoryCredentialStore, PostgresCredentialStore, SeedError};
