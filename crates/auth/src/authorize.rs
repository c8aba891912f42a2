use serde::Serialize;
use thiserror::Error;

use landspice_core::UserId;

use crate::matrix::PermissionMatrix;
use crate::{Identity, Permission, Resource, Role};

/// Resources internal staff may act on regardless of who owns the row.
pub const EMPLOYEE_RESOURCES: &[Resource] = &[
    Resource::Restaurants,
    Resource::Contracts,
    Resource::Guarantees,
    Resource::Designs,
    Resource::PrintOrders,
    Resource::Inventory,
    Resource::Invoices,
    Resource::Installments,
    Resource::Reports,
    Resource::Workflow,
    Resource::ProductionBatches,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("account is not active")]
    AccountNotActive,

    #[error("forbidden: {role} may not {permission} {resource}")]
    Forbidden {
        role: Role,
        resource: Resource,
        permission: Permission,
    },

    #[error("forbidden: {resource} record belongs to another account")]
    NotOwner { resource: Resource },
}

/// Instance-level ownership check, layered on top of the matrix.
///
/// - `admin` always passes
/// - `landspice_employee` passes for [`EMPLOYEE_RESOURCES`]
/// - everyone else only for rows they own
pub fn can_access_resource(
    role: Role,
    user_id: UserId,
    resource_owner_id: UserId,
    resource: Resource,
) -> bool {
    match role {
        Role::Admin => true,
        Role::LandspiceEmployee if EMPLOYEE_RESOURCES.contains(&resource) => true,
        _ => user_id == resource_owner_id,
    }
}

/// Resource-level check for an authenticated identity.
///
/// - No IO
/// - No panics
pub fn authorize(
    matrix: &PermissionMatrix,
    identity: &Identity,
    resource: Resource,
    permission: Permission,
) -> Result<(), AuthzError> {
    if !identity.is_active() {
        return Err(AuthzError::AccountNotActive);
    }
    if matrix.has_permission(identity.role, resource, permission) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: identity.role,
            resource,
            permission,
        })
    }
}

/// [`authorize`] followed by the ownership check for one specific row.
pub fn authorize_owned(
    matrix: &PermissionMatrix,
    identity: &Identity,
    resource: Resource,
    permission: Permission,
    owner_id: UserId,
) -> Result<(), AuthzError> {
    authorize(matrix, identity, resource, permission)?;
    if can_access_resource(identity.role, identity.user_id, owner_id, resource) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner { resource })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a `(role, resource, permission)` check came out the way it did.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub role: Role,
    pub resource: Resource,
    pub permission: Permission,
    pub granted: bool,
    pub reason: String,
    /// Everything the role holds on the resource.
    pub granted_permissions: Vec<Permission>,
    /// Roles that would pass this check.
    pub granting_roles: Vec<Role>,
}

pub fn explain_authorization(
    matrix: &PermissionMatrix,
    role: Role,
    resource: Resource,
    permission: Permission,
) -> AuthorizationExplanation {
    let granted_permissions: Vec<Permission> =
        matrix.permissions(role, resource).iter().copied().collect();
    let granted = granted_permissions.contains(&permission);

    let reason = if granted {
        format!("role '{role}' is granted '{permission}' on '{resource}'")
    } else if granted_permissions.is_empty() {
        format!("role '{role}' has no permissions on '{resource}'")
    } else {
        format!(
            "role '{role}' holds {:?} on '{resource}' but not '{permission}'",
            granted_permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>()
        )
    };

    AuthorizationExplanation {
        role,
        resource,
        permission,
        granted,
        reason,
        granted_permissions,
        granting_roles: matrix.roles_granting(resource, permission),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountStatus;

    fn identity(role: Role, status: AccountStatus) -> Identity {
        Identity {
            user_id: UserId::new(),
            username: "someone".to_string(),
            role,
            status,
            display_name: "Someone".to_string(),
            restaurant_id: None,
        }
    }

    #[test]
    fn admin_accesses_any_owner() {
        for resource in Resource::ALL {
            assert!(can_access_resource(Role::Admin, UserId::new(), UserId::new(), *resource));
        }
    }

    #[test]
    fn restaurant_only_accesses_own_contracts() {
        let me = UserId::new();
        let other = UserId::new();
        assert!(!can_access_resource(Role::Restaurant, me, other, Resource::Contracts));
        assert!(can_access_resource(Role::Restaurant, me, me, Resource::Contracts));
    }

    #[test]
    fn employee_allow_list_ignores_ownership() {
        let me = UserId::new();
        let other = UserId::new();
        assert!(can_access_resource(Role::LandspiceEmployee, me, other, Resource::PrintOrders));
        assert!(!can_access_resource(Role::LandspiceEmployee, me, other, Resource::Users));
        assert!(!can_access_resource(Role::LandspiceEmployee, me, other, Resource::System));
        assert!(can_access_resource(Role::LandspiceEmployee, me, me, Resource::Users));
    }

    #[test]
    fn authorize_requires_active_account() {
        let m = PermissionMatrix::landspice_default();
        let suspended = identity(Role::Admin, AccountStatus::Suspended);
        assert_eq!(
            authorize(&m, &suspended, Resource::System, Permission::Manage),
            Err(AuthzError::AccountNotActive)
        );
    }

    #[test]
    fn authorize_owned_applies_both_layers() {
        let m = PermissionMatrix::landspice_default();
        let diner = identity(Role::Restaurant, AccountStatus::Active);

        assert_eq!(
            authorize_owned(&m, &diner, Resource::Contracts, Permission::Read, diner.user_id),
            Ok(())
        );
        assert_eq!(
            authorize_owned(&m, &diner, Resource::Contracts, Permission::Read, UserId::new()),
            Err(AuthzError::NotOwner {
                resource: Resource::Contracts
            })
        );
        assert_eq!(
            authorize_owned(&m, &diner, Resource::Contracts, Permission::Delete, diner.user_id),
            Err(AuthzError::Forbidden {
                role: Role::Restaurant,
                resource: Resource::Contracts,
                permission: Permission::Delete,
            })
        );
    }

    #[test]
    fn explanation_lists_alternatives() {
        let m = PermissionMatrix::landspice_default();
        let e = explain_authorization(&m, Role::Marketer, Resource::Guarantees, Permission::Approve);
        assert!(!e.granted);
        assert!(e.granted_permissions.is_empty());
        assert_eq!(
            e.granting_roles,
            vec![Role::Admin, Role::Bank, Role::LandspiceEmployee]
        );

        let e = explain_authorization(&m, Role::Bank, Resource::Guarantees, Permission::Approve);
        assert!(e.granted);
        assert!(e.reason.contains("granted"));
    }
}
