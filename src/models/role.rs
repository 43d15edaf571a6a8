//! Role model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::permission::PermissionSet;

/// A named bundle of permissions. Roles are seed data and rarely change
/// at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    #[schema(value_type = Vec<String>)]
    pub permissions: sqlx::types::Json<Vec<String>>,
}

impl Role {
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_stored(&self.permissions.0)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.name.as_str(), "admin" | "super_admin")
    }
}
