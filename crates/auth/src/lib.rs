//! `landspice-auth` — authentication and authorization core (zero-trust).
//!
//! Decoupled from HTTP and storage: the credential store is a trait, the
//! gate returns decisions instead of responses, and the guard takes the
//! session as an argument.

mod names;

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod gate;
pub mod guard;
pub mod identity;
pub mod matrix;
pub mod permissions;
pub mod report;
pub mod roles;
pub mod session;

pub use authorize::{
    AuthorizationExplanation, AuthzError, authorize, authorize_owned, can_access_resource,
    explain_authorization,
};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credentials::{
    AuthFailure, CredentialStore, CredentialVerifier, StoreError, StoredCredential, hash_password,
    verify_password,
};
pub use gate::{
    ErrorReason, GateDecision, PathPattern, RouteTable, canonical_path, local_callback,
};
pub use guard::{AccessGuard, AccessRequirement, GuardOutcome, SessionView};
pub use identity::{AccountStatus, Identity};
pub use matrix::{MatrixError, PermissionMatrix, PermissionSet, SharedMatrix};
pub use names::UnknownName;
pub use permissions::{Permission, Resource};
pub use report::{AttemptOutcome, AuthReporter, TracingReporter};
pub use roles::Role;
pub use session::{SessionError, SessionKeyError, SessionService};
