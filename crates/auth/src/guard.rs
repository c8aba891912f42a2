//! Render-time access checks for UI fragments.
//!
//! The current session is always passed in explicitly as a [`SessionView`];
//! nothing here reads ambient state or caches a decision, so a new view
//! (after sign-in, sign-out or expiry) is simply evaluated again.

use crate::gate::RouteTable;
use crate::matrix::PermissionMatrix;
use crate::{Identity, Permission, Resource, Role};

/// What the caller currently knows about the session.
#[derive(Debug, Clone, Copy)]
pub enum SessionView<'a> {
    /// Session lookup still in flight.
    Resolving,
    Anonymous,
    Resolved(&'a Identity),
}

impl<'a> From<Option<&'a Identity>> for SessionView<'a> {
    fn from(value: Option<&'a Identity>) -> Self {
        match value {
            Some(identity) => SessionView::Resolved(identity),
            None => SessionView::Anonymous,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show a placeholder; neither content nor fallback.
    Loading,
    Content,
    Fallback,
}

/// Declared requirement. Every populated clause must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    roles: Option<Vec<Role>>,
    single: Option<(Resource, Permission)>,
    list: Option<PermissionList>,
    route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PermissionList {
    resource: Resource,
    permissions: Vec<Permission>,
    require_all: bool,
}

impl AccessRequirement {
    /// No clauses: any active session passes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }

    pub fn permission(mut self, resource: Resource, permission: Permission) -> Self {
        self.single = Some((resource, permission));
        self
    }

    /// Any of `permissions` on `resource`, or all of them when `require_all`.
    /// An empty list adds no check.
    pub fn permissions(mut self, resource: Resource, permissions: &[Permission], require_all: bool) -> Self {
        self.list = (!permissions.is_empty()).then(|| PermissionList {
            resource,
            permissions: permissions.to_vec(),
            require_all,
        });
        self
    }

    pub fn route(mut self, path: impl Into<String>) -> Self {
        self.route = Some(path.into());
        self
    }

    fn is_met_by(&self, identity: &Identity, matrix: &PermissionMatrix, routes: &RouteTable) -> bool {
        if !identity.is_active() {
            return false;
        }

        if let Some(roles) = &self.roles {
            if !roles.contains(&identity.role) {
                return false;
            }
        }

        if let Some((resource, permission)) = self.single {
            if !matrix.has_permission(identity.role, resource, permission) {
                return false;
            }
        }

        if let Some(list) = &self.list {
            let ok = if list.require_all {
                matrix.has_all_permissions(identity.role, list.resource, &list.permissions)
            } else {
                matrix.has_any_permission(identity.role, list.resource, &list.permissions)
            };
            if !ok {
                return false;
            }
        }

        if let Some(path) = &self.route {
            if !routes.role_may_access(identity.role, path) {
                return false;
            }
        }

        true
    }
}

/// Evaluates [`AccessRequirement`]s against a session view.
#[derive(Debug, Clone, Copy)]
pub struct AccessGuard<'a> {
    matrix: &'a PermissionMatrix,
    routes: &'a RouteTable,
}

impl<'a> AccessGuard<'a> {
    pub fn new(matrix: &'a PermissionMatrix, routes: &'a RouteTable) -> Self {
        Self { matrix, routes }
    }

    pub fn evaluate(&self, requirement: &AccessRequirement, session: SessionView<'_>) -> GuardOutcome {
        match session {
            SessionView::Resolving => GuardOutcome::Loading,
            SessionView::Anonymous => GuardOutcome::Fallback,
            SessionView::Resolved(identity) => {
                if requirement.is_met_by(identity, self.matrix, self.routes) {
                    GuardOutcome::Content
                } else {
                    GuardOutcome::Fallback
                }
            }
        }
    }

    /// Produce the fragment to show: `content` when allowed, `fallback` (or
    /// nothing) when denied, `loading` while the session resolves.
    pub fn render<T>(
        &self,
        requirement: &AccessRequirement,
        session: SessionView<'_>,
        content: impl FnOnce() -> T,
        fallback: Option<T>,
        loading: impl FnOnce() -> T,
    ) -> Option<T> {
        match self.evaluate(requirement, session) {
            GuardOutcome::Loading => Some(loading()),
            GuardOutcome::Content => Some(content()),
            GuardOutcome::Fallback => fallback,
        }
    }
}
