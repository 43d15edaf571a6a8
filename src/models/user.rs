//! User model, access resolution and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

use super::permission::{Permission, PermissionSet, UserPermission};
use super::role::Role;

/// User account from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user with its role and optional permission override loaded.
///
/// This is the input to permission resolution: the override, when enabled,
/// fully replaces the role's permissions (no union).
#[derive(Debug, Clone)]
pub struct UserWithAccess {
    pub user: User,
    pub role: Option<Role>,
    pub user_permissions: Option<UserPermission>,
}

impl UserWithAccess {
    /// Whether the custom override is present and enabled
    pub fn uses_custom_permissions(&self) -> bool {
        self.user_permissions
            .as_ref()
            .map(|p| p.use_custom_permissions)
            .unwrap_or(false)
    }

    /// The resolved permission set: custom set when the override is
    /// enabled, role set otherwise, empty when neither exists.
    pub fn effective_permissions(&self) -> PermissionSet {
        if self.uses_custom_permissions() {
            // uses_custom_permissions guarantees the record exists
            return self
                .user_permissions
                .as_ref()
                .map(|p| p.permission_set())
                .unwrap_or_default();
        }
        self.role
            .as_ref()
            .map(|r| r.permission_set())
            .unwrap_or_default()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.effective_permissions().contains(permission)
    }

    pub fn role_permissions(&self) -> PermissionSet {
        self.role
            .as_ref()
            .map(|r| r.permission_set())
            .unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().map(|r| r.is_admin()).unwrap_or(false)
    }

    pub fn into_details(self) -> UserDetails {
        let permissions = self.effective_permissions().names();
        UserDetails {
            id: self.user.id,
            name: self.user.name,
            email: self.user.email,
            role_id: self.user.role_id,
            employee_id: self.user.employee_id,
            position: self.user.position,
            department: self.user.department,
            phone: self.user.phone,
            is_active: self.user.is_active,
            created_at: self.user.created_at,
            updated_at: self.user.updated_at,
            role: self.role,
            user_permissions: self.user_permissions,
            permissions,
        }
    }
}

/// User as returned by the API, with role, override record and the
/// resolved permission names
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDetails {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role: Option<Role>,
    pub user_permissions: Option<UserPermission>,
    pub permissions: Vec<String>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Update user request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// Change password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// User list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// JWT claims for authenticated users.
///
/// The permission snapshot is taken at login and is a routing hint;
/// permission-management endpoints re-resolve from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_stored(&self.permissions)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permission_set().contains(permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role.as_deref(), Some("admin") | Some("super_admin"))
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(permissions: &[&str]) -> Role {
        Role {
            id: 1,
            name: "employee".to_string(),
            display_name: "Employee".to_string(),
            permissions: sqlx::types::Json(
                permissions.iter().map(|p| p.to_string()).collect(),
            ),
        }
    }

    fn override_record(permissions: &[&str], enabled: bool) -> UserPermission {
        UserPermission {
            id: 1,
            user_id: 1,
            permissions: sqlx::types::Json(
                permissions.iter().map(|p| p.to_string()).collect(),
            ),
            use_custom_permissions: enabled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user() -> User {
        User {
            id: 1,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: "hash".to_string(),
            role_id: Some(1),
            employee_id: None,
            position: None,
            department: None,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_permissions_apply_without_override() {
        let access = UserWithAccess {
            user: user(),
            role: Some(role(&["view_request"])),
            user_permissions: None,
        };
        assert!(access.has_permission(Permission::ViewRequest));
        assert!(!access.has_permission(Permission::EquipmentInventory));
        assert_eq!(access.effective_permissions(), access.role_permissions());
    }

    #[test]
    fn disabled_override_falls_back_to_role() {
        let access = UserWithAccess {
            user: user(),
            role: Some(role(&["view_request"])),
            user_permissions: Some(override_record(&["equipment_inventory"], false)),
        };
        assert!(access.has_permission(Permission::ViewRequest));
        assert!(!access.has_permission(Permission::EquipmentInventory));
    }

    #[test]
    fn enabled_override_replaces_role_entirely() {
        let access = UserWithAccess {
            user: user(),
            role: Some(role(&["view_request"])),
            user_permissions: Some(override_record(&["equipment_inventory"], true)),
        };
        // The custom set fully overrides, it does not union with the role
        assert!(access.has_permission(Permission::EquipmentInventory));
        assert!(!access.has_permission(Permission::ViewRequest));
    }

    #[test]
    fn no_role_no_override_means_no_permissions() {
        let access = UserWithAccess {
            user: user(),
            role: None,
            user_permissions: None,
        };
        assert!(access.effective_permissions().is_empty());
        for p in Permission::ALL {
            assert!(!access.has_permission(p));
        }
    }

    #[test]
    fn wildcard_role_grants_every_permission() {
        let access = UserWithAccess {
            user: user(),
            role: Some(role(&["*"])),
            user_permissions: None,
        };
        for p in Permission::ALL {
            assert!(access.has_permission(p));
        }
    }

    #[test]
    fn claims_permission_checks() {
        let claims = UserClaims {
            sub: "test@example.com".to_string(),
            user_id: 1,
            role: Some("employee".to_string()),
            permissions: vec!["view_request".to_string()],
            exp: 0,
            iat: 0,
        };
        assert!(claims.require(Permission::ViewRequest).is_ok());
        assert!(claims.require(Permission::ControlPanel).is_err());
        assert!(claims.require_admin().is_err());
    }

    #[test]
    fn token_round_trip() {
        let claims = UserClaims {
            sub: "test@example.com".to_string(),
            user_id: 42,
            role: Some("admin".to_string()),
            permissions: vec!["*".to_string()],
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        };
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 42);
        assert!(parsed.is_admin());
        assert!(parsed.has_permission(Permission::Reports));
    }
}
