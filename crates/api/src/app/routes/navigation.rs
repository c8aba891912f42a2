//! Menu entries filtered through the access guard.

use axum::{
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use landspice_auth::{
    AccessGuard, AccessRequirement, GuardOutcome, Permission, Resource, Role, SessionView,
};

use crate::app::AppState;
use crate::context::CurrentSession;

#[derive(Debug, Clone, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
}

fn menu() -> Vec<(NavEntry, AccessRequirement)> {
    use Permission::*;
    use Resource::*;

    fn entry(label: &'static str, path: &'static str) -> NavEntry {
        NavEntry { label, path }
    }

    vec![
        (
            entry("Users", "/admin/users"),
            AccessRequirement::new().roles(&[Role::Admin]).permission(Users, Manage),
        ),
        (
            entry("System settings", "/admin/system"),
            AccessRequirement::new().permission(System, Manage),
        ),
        (
            entry("Restaurants", "/employee/restaurants"),
            AccessRequirement::new().route("/employee/restaurants").permission(Restaurants, Read),
        ),
        (
            entry("My contracts", "/restaurant/contracts"),
            AccessRequirement::new().route("/restaurant/contracts").permission(Contracts, Read),
        ),
        (
            entry("Design approvals", "/restaurant/designs"),
            AccessRequirement::new()
                .route("/restaurant/designs")
                .permissions(Designs, &[Approve, Reject], false),
        ),
        (
            entry("Installments", "/restaurant/installments"),
            AccessRequirement::new().route("/restaurant/installments").permission(Installments, Pay),
        ),
        (
            entry("Guarantees", "/bank/guarantees"),
            AccessRequirement::new()
                .route("/bank/guarantees")
                .permissions(Guarantees, &[Approve, Reject], true),
        ),
        (
            entry("Print orders", "/supplier/print-orders"),
            AccessRequirement::new().route("/supplier/print-orders").permission(PrintOrders, Update),
        ),
        (
            entry("Production batches", "/supplier/batches"),
            AccessRequirement::new().route("/supplier/batches").permission(ProductionBatches, Create),
        ),
        (
            entry("Commissions", "/marketer/commissions"),
            AccessRequirement::new().route("/marketer/commissions").permission(Commissions, Read),
        ),
        (
            entry("Reports", "/reports"),
            AccessRequirement::new().permission(Reports, Read),
        ),
    ]
}

/// Entries whose requirement the identity meets.
pub fn visible_entries(guard: &AccessGuard<'_>, view: SessionView<'_>) -> Vec<NavEntry> {
    menu()
        .into_iter()
        .filter(|(_, req)| guard.evaluate(req, view) == GuardOutcome::Content)
        .map(|(entry, _)| entry)
        .collect()
}

/// GET /api/navigation
pub async fn navigation(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> impl IntoResponse {
    let matrix = state.matrix.load();
    let guard = AccessGuard::new(&matrix, &state.routes);
    let entries = visible_entries(&guard, SessionView::Resolved(session.identity()));
    Json(serde_json::json!({ "entries": entries }))
}

#[cfg(test)]
mod tests {
    use landspice_auth::{AccountStatus, Identity, PermissionMatrix, RouteTable};
    use landspice_core::UserId;

    use super::*;

    fn paths_for(role: Role) -> Vec<&'static str> {
        let matrix = PermissionMatrix::landspice_default();
        let routes = RouteTable::landspice_default();
        let guard = AccessGuard::new(&matrix, &routes);
        let identity = Identity {
            user_id: UserId::new(),
            username: "nav-user".to_string(),
            role,
            status: AccountStatus::Active,
            display_name: "Nav".to_string(),
            restaurant_id: None,
        };
        visible_entries(&guard, SessionView::Resolved(&identity))
            .into_iter()
            .map(|e| e.path)
            .collect()
    }

    #[test]
    fn admin_sees_every_entry() {
        assert_eq!(paths_for(Role::Admin).len(), menu().len());
    }

    #[test]
    fn bank_sees_only_its_area_and_reports() {
        assert_eq!(paths_for(Role::Bank), vec!["/bank/guarantees", "/reports"]);
    }

    #[test]
    fn restaurant_menu_excludes_other_areas() {
        let paths = paths_for(Role::Restaurant);
        assert!(paths.contains(&"/restaurant/designs"));
        assert!(paths.contains(&"/restaurant/installments"));
        assert!(!paths.contains(&"/bank/guarantees"));
        assert!(!paths.contains(&"/admin/users"));
    }

    #[test]
    fn nothing_is_visible_while_resolving() {
        let matrix = PermissionMatrix::landspice_default();
        let routes = RouteTable::landspice_default();
        let guard = AccessGuard::new(&matrix, &routes);
        assert!(visible_entries(&guard, SessionView::Resolving).is_empty());
        assert!(visible_entries(&guard, SessionView::Anonymous).is_empty());
    }
}
