use landspice_auth::{Identity, Role};
use landspice_core::UserId;

/// Session context for a request, inserted by the route gate.
///
/// Present on every non-public route. Public routes see it only when the
/// caller carried a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSession {
    identity: Identity,
}

impl CurrentSession {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }
}
