use serde::{Deserialize, Serialize};

use landspice_core::{RestaurantId, UserId};

use crate::Role;

/// Lifecycle state of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Can sign in and pass the gate.
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AccountStatus {
    type Err = crate::names::UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "suspended" => Ok(AccountStatus::Suspended),
            other => Err(crate::names::UnknownName::new("account status", other)),
        }
    }
}

/// Authenticated actor, as produced by the credential verifier and carried by
/// the session token.
///
/// The role in here is the only role the gate and the guard trust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
    pub display_name: String,
    /// Tenant linkage for restaurant-role accounts.
    pub restaurant_id: Option<RestaurantId>,
}

impl Identity {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
