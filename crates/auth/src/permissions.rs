use crate::names::named_enum;

named_enum! {
    /// Protected domain-object category. Resources carry no state here; they
    /// are keys into the permission matrix.
    pub enum Resource : "resource" {
        Users => "users",
        Restaurants => "restaurants",
        Contracts => "contracts",
        Guarantees => "guarantees",
        Designs => "designs",
        PrintOrders => "print_orders",
        Inventory => "inventory",
        Invoices => "invoices",
        Installments => "installments",
        Reports => "reports",
        System => "system",
        Workflow => "workflow",
        Commissions => "commissions",
        ProductionBatches => "production_batches",
    }
}

named_enum! {
    /// Action on a resource.
    ///
    /// Actions are flat: `Manage` does not imply `Delete` or anything else.
    pub enum Permission : "permission" {
        Create => "create",
        Read => "read",
        Update => "update",
        Delete => "delete",
        Approve => "approve",
        Reject => "reject",
        Review => "review",
        Export => "export",
        Import => "import",
        Manage => "manage",
        Pay => "pay",
        Cancel => "cancel",
        Archive => "archive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_word_names_use_snake_case() {
        assert_eq!(Resource::PrintOrders.as_str(), "print_orders");
        assert_eq!(
            "production_batches".parse::<Resource>().unwrap(),
            Resource::ProductionBatches
        );
        let json = serde_json::to_string(&Resource::PrintOrders).unwrap();
        assert_eq!(json, "\"print_orders\"");
    }

    #[test]
    fn enums_are_complete() {
        assert_eq!(Resource::ALL.len(), 14);
        assert_eq!(Permission::ALL.len(), 13);
    }

    #[test]
    fn unknown_permission_names_its_kind() {
        let err = "destroy".parse::<Permission>().unwrap_err();
        assert_eq!(err.kind, "permission");
        assert_eq!(err.name, "destroy");
    }
}
