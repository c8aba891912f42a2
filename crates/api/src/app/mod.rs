//! HTTP API application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;

use landspice_auth::{
    AccountStatus, AuthReporter, CredentialStore, CredentialVerifier, PermissionMatrix, Role,
    RouteTable, SessionService, SharedMatrix, TracingReporter,
};
use landspice_infra::{InMemoryCredentialStore, PostgresCredentialStore};

use crate::config::{ApiConfig, ConfigError, load_matrix};
use crate::middleware;

pub mod errors;
pub mod routes;

pub type DynCredentialStore = Arc<dyn CredentialStore>;

/// Everything a handler or the gate needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub matrix: Arc<SharedMatrix>,
    pub routes: Arc<RouteTable>,
    pub verifier: Arc<CredentialVerifier<DynCredentialStore>>,
    pub reporter: Arc<dyn AuthReporter>,
    pub secure_cookies: bool,
    /// Source of `POST /api/admin/matrix/reload`; `None` when using the built-in matrix.
    pub matrix_path: Option<PathBuf>,
}

impl AppState {
    /// Built-in matrix and route table, tracing reporter, insecure cookies.
    pub fn new(sessions: SessionService, store: DynCredentialStore) -> Self {
        let reporter: Arc<dyn AuthReporter> = Arc::new(TracingReporter);
        Self {
            sessions: Arc::new(sessions),
            matrix: Arc::new(SharedMatrix::default()),
            routes: Arc::new(RouteTable::landspice_default()),
            verifier: Arc::new(CredentialVerifier::new(store, Arc::clone(&reporter))),
            reporter,
            secure_cookies: false,
            matrix_path: None,
        }
    }

    /// Replace the reporter everywhere it is used, including the verifier.
    pub fn with_reporter(mut self, reporter: Arc<dyn AuthReporter>) -> Self {
        let store = Arc::clone(self.verifier.store());
        self.verifier = Arc::new(CredentialVerifier::new(store, Arc::clone(&reporter)));
        self.reporter = reporter;
        self
    }

    pub fn with_matrix(self, matrix: PermissionMatrix) -> Self {
        self.matrix.replace(matrix);
        self
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn with_matrix_path(mut self, path: Option<PathBuf>) -> Self {
        self.matrix_path = path;
        self
    }

    pub fn store(&self) -> &DynCredentialStore {
        self.verifier.store()
    }

    /// Startup wiring. Any error here is fatal.
    pub async fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let matrix = load_matrix(config.matrix_path.as_deref())?;
        let sessions = SessionService::new(config.session_secret.as_bytes(), config.session_ttl)?;

        let store: DynCredentialStore = match &config.database_url {
            Some(url) => {
                let pg = PostgresCredentialStore::connect(url).await?;
                pg.ensure_schema().await?;
                tracing::info!("using postgres credential store");
                Arc::new(pg)
            }
            None => {
                let mem = InMemoryCredentialStore::new();
                if let Some(admin) = &config.bootstrap_admin {
                    mem.seed(
                        &admin.username,
                        &admin.password,
                        Role::Admin,
                        AccountStatus::Active,
                        "Administrator",
                        None,
                    )?;
                    tracing::info!(username = %admin.username, "seeded bootstrap admin");
                }
                tracing::warn!("DATABASE_URL not set; using in-memory credential store");
                Arc::new(mem)
            }
        };

        Ok(Self::new(sessions, store)
            .with_matrix(matrix)
            .with_secure_cookies(config.secure_cookies)
            .with_matrix_path(config.matrix_path.clone()))
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every route, and the fallback, sits behind the route gate.
pub fn build_app(state: AppState) -> Router {
    routes::router()
        .layer(
            ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::route_gate,
            )),
        )
        .with_state(state)
}
