//! Static role × resource → permission-set table.
//!
//! The matrix is built once at startup and never mutated. A reload replaces
//! the whole table through [`SharedMatrix`], so concurrent readers always see
//! one consistent version without taking a lock.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::names::UnknownName;
use crate::{Permission, Resource, Role};

/// Set of actions granted on one resource. Ordered so UI action lists are stable.
pub type PermissionSet = BTreeSet<Permission>;

static EMPTY: PermissionSet = BTreeSet::new();

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("malformed permission matrix: {0}")]
    Parse(String),

    #[error("invalid permission matrix entry: {0}")]
    UnknownName(#[from] UnknownName),
}

/// Total function `Role × Resource → PermissionSet`.
///
/// Pairs without an entry behave as the empty set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionMatrix {
    entries: HashMap<(Role, Resource), PermissionSet>,
}

/// Accumulates grants; the only way to populate a [`PermissionMatrix`].
#[derive(Debug, Default)]
pub struct MatrixBuilder {
    entries: HashMap<(Role, Resource), PermissionSet>,
}

impl MatrixBuilder {
    pub fn grant(mut self, role: Role, resource: Resource, permissions: &[Permission]) -> Self {
        self.entries
            .entry((role, resource))
            .or_default()
            .extend(permissions.iter().copied());
        self
    }

    pub fn build(self) -> PermissionMatrix {
        PermissionMatrix {
            entries: self.entries,
        }
    }
}

impl PermissionMatrix {
    pub fn builder() -> MatrixBuilder {
        MatrixBuilder::default()
    }

    /// The LandSpice production policy.
    pub fn landspice_default() -> Self {
        use Permission::*;
        use Resource::*;

        let mut builder = Self::builder();
        for resource in Resource::ALL {
            builder = builder.grant(Role::Admin, *resource, Permission::ALL);
        }

        builder
            // Internal staff: operate the supply chain, no user or system administration.
            .grant(Role::LandspiceEmployee, Users, &[Read])
            .grant(Role::LandspiceEmployee, Restaurants, &[Create, Read, Update])
            .grant(Role::LandspiceEmployee, Contracts, &[Create, Read, Update, Review, Export])
            .grant(Role::LandspiceEmployee, Guarantees, &[Read, Review, Approve, Reject])
            .grant(Role::LandspiceEmployee, Designs, &[Create, Read, Update, Approve, Reject])
            .grant(Role::LandspiceEmployee, PrintOrders, &[Create, Read, Update, Approve, Cancel])
            .grant(Role::LandspiceEmployee, Inventory, &[Read, Update, Import, Export])
            .grant(Role::LandspiceEmployee, Invoices, &[Create, Read, Update, Export])
            .grant(Role::LandspiceEmployee, Installments, &[Read, Update])
            .grant(Role::LandspiceEmployee, Reports, &[Read, Export])
            .grant(Role::LandspiceEmployee, Workflow, &[Read, Review, Approve, Reject])
            .grant(Role::LandspiceEmployee, Commissions, &[Read])
            .grant(Role::LandspiceEmployee, ProductionBatches, &[Create, Read, Update])
            // Restaurants see their own commercial records and sign off on designs.
            .grant(Role::Restaurant, Restaurants, &[Read, Update])
            .grant(Role::Restaurant, Contracts, &[Read])
            .grant(Role::Restaurant, Guarantees, &[Read])
            .grant(Role::Restaurant, Designs, &[Read, Approve, Reject])
            .grant(Role::Restaurant, PrintOrders, &[Create, Read])
            .grant(Role::Restaurant, Invoices, &[Read])
            .grant(Role::Restaurant, Installments, &[Read, Pay])
            .grant(Role::Restaurant, Reports, &[Read])
            .grant(Role::Restaurant, Workflow, &[Read])
            // Banks issue and decide on guarantees.
            .grant(Role::Bank, Restaurants, &[Read])
            .grant(Role::Bank, Contracts, &[Read])
            .grant(Role::Bank, Guarantees, &[Create, Read, Update, Approve, Reject])
            .grant(Role::Bank, Installments, &[Read, Update])
            .grant(Role::Bank, Reports, &[Read, Export])
            // Suppliers fulfil print orders.
            .grant(Role::Supplier, Designs, &[Read])
            .grant(Role::Supplier, PrintOrders, &[Read, Update])
            .grant(Role::Supplier, Inventory, &[Read, Update])
            .grant(Role::Supplier, Invoices, &[Create, Read])
            .grant(Role::Supplier, ProductionBatches, &[Create, Read, Update])
            // Marketers onboard restaurants and track commissions.
            .grant(Role::Marketer, Restaurants, &[Create, Read])
            .grant(Role::Marketer, Contracts, &[Create, Read])
            .grant(Role::Marketer, Designs, &[Read])
            .grant(Role::Marketer, Reports, &[Read])
            .grant(Role::Marketer, Commissions, &[Read])
            .build()
    }

    /// Parse a matrix document of the form
    /// `{ "<role>": { "<resource>": ["<permission>", ...] } }`.
    ///
    /// Any unknown role, resource or permission name rejects the whole document.
    pub fn from_json(raw: &str) -> Result<Self, MatrixError> {
        let doc: BTreeMap<String, BTreeMap<String, Vec<String>>> =
            serde_json::from_str(raw).map_err(|e| MatrixError::Parse(e.to_string()))?;

        let mut builder = Self::builder();
        for (role_name, resources) in doc {
            let role: Role = role_name.parse()?;
            for (resource_name, names) in resources {
                let resource: Resource = resource_name.parse()?;
                let permissions = names
                    .iter()
                    .map(|name| name.parse::<Permission>())
                    .collect::<Result<Vec<_>, _>>()?;
                builder = builder.grant(role, resource, &permissions);
            }
        }

        Ok(builder.build())
    }

    /// Serializable view, sorted by role then resource.
    pub fn to_document(&self) -> BTreeMap<Role, BTreeMap<Resource, PermissionSet>> {
        let mut doc: BTreeMap<Role, BTreeMap<Resource, PermissionSet>> = BTreeMap::new();
        for ((role, resource), set) in &self.entries {
            if set.is_empty() {
                continue;
            }
            doc.entry(*role).or_default().insert(*resource, set.clone());
        }
        doc
    }

    /// Matrix entry for `(role, resource)`; the empty set when absent.
    pub fn permissions(&self, role: Role, resource: Resource) -> &PermissionSet {
        self.entries.get(&(role, resource)).unwrap_or(&EMPTY)
    }

    pub fn has_permission(&self, role: Role, resource: Resource, permission: Permission) -> bool {
        self.permissions(role, resource).contains(&permission)
    }

    /// False for an empty `permissions` slice.
    pub fn has_any_permission(
        &self,
        role: Role,
        resource: Resource,
        permissions: &[Permission],
    ) -> bool {
        let granted = self.permissions(role, resource);
        permissions.iter().any(|p| granted.contains(p))
    }

    /// True for an empty `permissions` slice.
    pub fn has_all_permissions(
        &self,
        role: Role,
        resource: Resource,
        permissions: &[Permission],
    ) -> bool {
        let granted = self.permissions(role, resource);
        permissions.iter().all(|p| granted.contains(p))
    }

    /// Owned copy of the entry, used to drive UI action lists.
    pub fn user_permissions(&self, role: Role, resource: Resource) -> PermissionSet {
        self.permissions(role, resource).clone()
    }

    /// String-keyed check for untrusted input. Unknown names are `false`.
    pub fn check_named(&self, role: &str, resource: &str, permission: &str) -> bool {
        match (
            role.parse::<Role>(),
            resource.parse::<Resource>(),
            permission.parse::<Permission>(),
        ) {
            (Ok(role), Ok(resource), Ok(permission)) => {
                self.has_permission(role, resource, permission)
            }
            _ => false,
        }
    }

    /// Roles whose entry for `resource` contains `permission`.
    pub fn roles_granting(&self, resource: Resource, permission: Permission) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|role| self.has_permission(*role, resource, permission))
            .collect()
    }
}

/// Process-wide handle to the current matrix.
///
/// Readers take a snapshot with [`SharedMatrix::load`]; a reload swaps the
/// whole table atomically.
#[derive(Debug)]
pub struct SharedMatrix {
    current: ArcSwap<PermissionMatrix>,
}

impl SharedMatrix {
    pub fn new(matrix: PermissionMatrix) -> Self {
        Self {
            current: ArcSwap::from_pointee(matrix),
        }
    }

    pub fn load(&self) -> Arc<PermissionMatrix> {
        self.current.load_full()
    }

    /// Install `matrix` for all subsequent reads. Snapshots already taken stay valid.
    pub fn replace(&self, matrix: PermissionMatrix) {
        self.current.store(Arc::new(matrix));
    }
}

impl Default for SharedMatrix {
    fn default() -> Self {
        Self::new(PermissionMatrix::landspice_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restaurant_contract_access_is_read_only() {
        let m = PermissionMatrix::landspice_default();
        assert!(m.has_permission(Role::Restaurant, Resource::Contracts, Permission::Read));
        assert!(!m.has_permission(Role::Restaurant, Resource::Contracts, Permission::Update));
        assert!(!m.has_permission(Role::Restaurant, Resource::Users, Permission::Read));
    }

    #[test]
    fn manage_does_not_imply_delete() {
        let m = PermissionMatrix::builder()
            .grant(Role::Bank, Resource::Guarantees, &[Permission::Manage])
            .build();
        assert!(m.has_permission(Role::Bank, Resource::Guarantees, Permission::Manage));
        assert!(!m.has_permission(Role::Bank, Resource::Guarantees, Permission::Delete));
    }

    #[test]
    fn admin_holds_every_permission_explicitly() {
        let m = PermissionMatrix::landspice_default();
        for resource in Resource::ALL {
            assert!(m.has_all_permissions(Role::Admin, *resource, Permission::ALL));
        }
    }

    #[test]
    fn system_resource_is_admin_only() {
        let m = PermissionMatrix::landspice_default();
        assert_eq!(m.roles_granting(Resource::System, Permission::Read), vec![Role::Admin]);
    }

    #[test]
    fn any_and_all_on_empty_slices() {
        let m = PermissionMatrix::landspice_default();
        assert!(!m.has_any_permission(Role::Restaurant, Resource::Designs, &[]));
        assert!(m.has_all_permissions(Role::Restaurant, Resource::Designs, &[]));
    }

    #[test]
    fn any_versus_all() {
        let m = PermissionMatrix::landspice_default();
        let wanted = [Permission::Approve, Permission::Delete];
        assert!(m.has_any_permission(Role::Restaurant, Resource::Designs, &wanted));
        assert!(!m.has_all_permissions(Role::Restaurant, Resource::Designs, &wanted));
    }

    #[test]
    fn user_permissions_lists_the_configured_set() {
        let m = PermissionMatrix::landspice_default();
        let got: Vec<_> = m
            .user_permissions(Role::Supplier, Resource::PrintOrders)
            .into_iter()
            .collect();
        assert_eq!(got, vec![Permission::Read, Permission::Update]);
        assert!(m.user_permissions(Role::Supplier, Resource::Users).is_empty());
    }

    #[test]
    fn check_named_rejects_unknown_names() {
        let m = PermissionMatrix::landspice_default();
        assert!(m.check_named("bank", "guarantees", "approve"));
        assert!(!m.check_named("root", "guarantees", "approve"));
        assert!(!m.check_named("bank", "vaults", "approve"));
        assert!(!m.check_named("bank", "guarantees", "launder"));
        assert!(!m.check_named("", "", ""));
    }

    #[test]
    fn from_json_builds_matching_matrix() {
        let m = PermissionMatrix::from_json(
            r#"{ "marketer": { "commissions": ["read", "export"] } }"#,
        )
        .unwrap();
        assert!(m.has_permission(Role::Marketer, Resource::Commissions, Permission::Export));
        assert!(!m.has_permission(Role::Marketer, Resource::Restaurants, Permission::Read));
    }

    #[test]
    fn from_json_rejects_unknown_names() {
        let err = PermissionMatrix::from_json(r#"{ "janitor": {} }"#).unwrap_err();
        assert_eq!(err, MatrixError::UnknownName(UnknownName::new("role", "janitor")));

        let err = PermissionMatrix::from_json(r#"{ "bank": { "vaults": ["read"] } }"#).unwrap_err();
        assert!(matches!(err, MatrixError::UnknownName(n) if n.kind == "resource"));

        let err =
            PermissionMatrix::from_json(r#"{ "bank": { "guarantees": ["launder"] } }"#).unwrap_err();
        assert!(matches!(err, MatrixError::UnknownName(n) if n.kind == "permission"));
    }

    #[test]
    fn from_json_rejects_bad_shape() {
        let err = PermissionMatrix::from_json(r#"{ "bank": ["read"] }"#).unwrap_err();
        assert!(matches!(err, MatrixError::Parse(_)));
    }

    #[test]
    fn document_round_trips_through_json() {
        let m = PermissionMatrix::landspice_default();
        let raw = serde_json::to_string(&m.to_document()).unwrap();
        assert_eq!(PermissionMatrix::from_json(&raw).unwrap(), m);
    }

    #[test]
    fn shared_matrix_swap_keeps_old_snapshots() {
        let shared = SharedMatrix::default();
        let before = shared.load();
        shared.replace(PermissionMatrix::builder().build());

        assert!(before.has_permission(Role::Bank, Resource::Guarantees, Permission::Approve));
        assert!(!shared.load().has_permission(Role::Bank, Resource::Guarantees, Permission::Approve));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn role() -> impl Strategy<Value = Role> {
            prop::sample::select(Role::ALL)
        }

        fn resource() -> impl Strategy<Value = Resource> {
            prop::sample::select(Resource::ALL)
        }

        fn permission() -> impl Strategy<Value = Permission> {
            prop::sample::select(Permission::ALL)
        }

        proptest! {
            /// Property: pairs without an entry never grant anything.
            #[test]
            fn unmapped_pairs_deny(r in role(), x in resource(), p in permission()) {
                let m = PermissionMatrix::builder()
                    .grant(Role::Bank, Resource::Guarantees, Permission::ALL)
                    .build();
                if (r, x) != (Role::Bank, Resource::Guarantees) {
                    prop_assert!(!m.has_permission(r, x, p));
                    prop_assert!(m.user_permissions(r, x).is_empty());
                }
            }

            /// Property: checks are pure (same inputs, same answer).
            #[test]
            fn has_permission_is_idempotent(r in role(), x in resource(), p in permission()) {
                let m = PermissionMatrix::landspice_default();
                prop_assert_eq!(m.has_permission(r, x, p), m.has_permission(r, x, p));
            }

            /// Property: the exposed set agrees with membership checks.
            #[test]
            fn user_permissions_agree_with_has_permission(r in role(), x in resource()) {
                let m = PermissionMatrix::landspice_default();
                let set = m.user_permissions(r, x);
                for p in Permission::ALL {
                    prop_assert_eq!(set.contains(p), m.has_permission(r, x, *p));
                }
            }

            /// Property: the string-keyed check matches the typed one.
            #[test]
            fn check_named_matches_typed(r in role(), x in resource(), p in permission()) {
                let m = PermissionMatrix::landspice_default();
                prop_assert_eq!(
                    m.check_named(r.as_str(), x.as_str(), p.as_str()),
                    m.has_permission(r, x, p)
                );
            }
        }
    }
}
