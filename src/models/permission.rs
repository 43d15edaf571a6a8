//! Permission types and the per-user permission override record

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::error::AppError;

/// The closed set of named permissions known to the application.
///
/// Permission names travel over the wire as snake_case strings. The
/// superuser wildcard `"*"` is deliberately not a variant; it is carried
/// as an explicit flag on [`PermissionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Dashboard,
    ViewRequest,
    ViewApprove,
    AddStocks,
    EquipmentInventory,
    Reports,
    ControlPanel,
    ActivityLogs,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::Dashboard,
        Permission::ViewRequest,
        Permission::ViewApprove,
        Permission::AddStocks,
        Permission::EquipmentInventory,
        Permission::Reports,
        Permission::ControlPanel,
        Permission::ActivityLogs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Dashboard => "dashboard",
            Permission::ViewRequest => "view_request",
            Permission::ViewApprove => "view_approve",
            Permission::AddStocks => "add_stocks",
            Permission::EquipmentInventory => "equipment_inventory",
            Permission::Reports => "reports",
            Permission::ControlPanel => "control_panel",
            Permission::ActivityLogs => "activity_logs",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dashboard" => Ok(Permission::Dashboard),
            "view_request" => Ok(Permission::ViewRequest),
            "view_approve" => Ok(Permission::ViewApprove),
            "add_stocks" => Ok(Permission::AddStocks),
            "equipment_inventory" => Ok(Permission::EquipmentInventory),
            "reports" => Ok(Permission::Reports),
            "control_panel" => Ok(Permission::ControlPanel),
            "activity_logs" => Ok(Permission::ActivityLogs),
            other => Err(format!("Unknown permission: {}", other)),
        }
    }
}

/// A resolved set of permissions.
///
/// `all` is the wildcard: when set, [`PermissionSet::contains`] is true for
/// every permission regardless of the granted set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    pub all: bool,
    pub granted: BTreeSet<Permission>,
}

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse from stored permission names, dropping names the application
    /// no longer knows. Stored data is never an error source.
    pub fn from_stored(names: &[String]) -> Self {
        let mut set = PermissionSet::empty();
        for name in names {
            if name == "*" {
                set.all = true;
            } else if let Ok(p) = name.parse::<Permission>() {
                set.granted.insert(p);
            } else {
                tracing::warn!(permission = %name, "ignoring unknown stored permission");
            }
        }
        set
    }

    /// Parse from client-supplied permission names. Unknown names are a
    /// validation error; `"*"` becomes the wildcard flag.
    pub fn from_names(names: &[String]) -> Result<Self, AppError> {
        let mut set = PermissionSet::empty();
        for name in names {
            if name == "*" {
                set.all = true;
            } else {
                let p = name
                    .parse::<Permission>()
                    .map_err(AppError::Validation)?;
                set.granted.insert(p);
            }
        }
        Ok(set)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.all || self.granted.contains(&permission)
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.granted.is_empty()
    }

    /// Wire representation: `"*"` first if the wildcard is set, then the
    /// granted names in a stable order.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.all {
            names.push("*".to_string());
        }
        names.extend(self.granted.iter().map(|p| p.as_str().to_string()));
        names
    }
}

/// Per-user permission override record (1:1 with a user).
///
/// When `use_custom_permissions` is false the stored set is inert and the
/// owning user's role permissions apply.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserPermission {
    pub id: i32,
    pub user_id: i32,
    #[schema(value_type = Vec<String>)]
    pub permissions: sqlx::types::Json<Vec<String>>,
    pub use_custom_permissions: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserPermission {
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_stored(&self.permissions.0)
    }
}

/// Payload for setting custom permissions on a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPermissions {
    pub permissions: Vec<String>,
    /// When false, reverts the user to role permissions instead
    #[serde(default = "default_use_custom")]
    pub use_custom: bool,
}

fn default_use_custom() -> bool {
    true
}

/// Resolved permissions of a user, as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct EffectivePermissions {
    pub permissions: Vec<String>,
    pub is_custom: bool,
    pub role_permissions: Vec<String>,
}

/// Payload for adding or removing a single permission
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModifyPermission {
    pub permission: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        let set = PermissionSet::from_names(&[
            "view_request".to_string(),
            "equipment_inventory".to_string(),
        ])
        .unwrap();
        assert!(set.contains(Permission::ViewRequest));
        assert!(set.contains(Permission::EquipmentInventory));
        assert!(!set.contains(Permission::Reports));
    }

    #[test]
    fn rejects_unknown_names_from_clients() {
        let err = PermissionSet::from_names(&["make_coffee".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn drops_unknown_stored_names() {
        let set = PermissionSet::from_stored(&[
            "dashboard".to_string(),
            "legacy_thing".to_string(),
        ]);
        assert!(set.contains(Permission::Dashboard));
        assert_eq!(set.granted.len(), 1);
    }

    #[test]
    fn wildcard_grants_everything() {
        let set = PermissionSet::from_names(&["*".to_string()]).unwrap();
        assert!(set.all);
        for p in Permission::ALL {
            assert!(set.contains(p));
        }
    }

    #[test]
    fn names_round_trip_with_wildcard_first() {
        let set = PermissionSet::from_names(&[
            "reports".to_string(),
            "*".to_string(),
            "dashboard".to_string(),
        ])
        .unwrap();
        let names = set.names();
        assert_eq!(names[0], "*");
        assert!(names.contains(&"dashboard".to_string()));
        assert!(names.contains(&"reports".to_string()));
    }
}
