//! Per-user permission overrides.
//!
//! A user either inherits their role's permissions or, when the custom
//! flag is set, uses their own set exclusively. Mutations here always
//! re-check the acting user's rights against the database rather than
//! trusting the JWT snapshot.

use crate::{
    error::{AppError, AppResult},
    models::{
        activity_log::SubjectType,
        permission::{EffectivePermissions, Permission, PermissionSet, SetPermissions},
    },
    repository::Repository,
};

use super::activity_logs::ActivityLogsService;

#[derive(Clone)]
pub struct PermissionsService {
    repository: Repository,
    logs: ActivityLogsService,
}

impl PermissionsService {
    pub fn new(repository: Repository, logs: ActivityLogsService) -> Self {
        Self { repository, logs }
    }

    /// Verify against current database state that the actor may manage
    /// permissions. The token's permission list is only a snapshot.
    pub async fn require_manager(&self, actor_id: i32) -> AppResult<()> {
        let access = self.repository.users.get_with_access(actor_id).await?;
        if access.is_admin() || access.has_permission(Permission::ControlPanel) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You do not have permission to manage user permissions".to_string(),
            ))
        }
    }

    pub async fn get(&self, user_id: i32) -> AppResult<EffectivePermissions> {
        let access = self.repository.users.get_with_access(user_id).await?;
        Ok(EffectivePermissions {
            permissions: access.effective_permissions().names(),
            is_custom: access.uses_custom_permissions(),
            role_permissions: access.role_permissions().names(),
        })
    }

    /// Replace the user's custom permission set. With `use_custom` off,
    /// the stored set is kept but the user falls back to role permissions.
    pub async fn set(
        &self,
        actor_id: i32,
        user_id: i32,
        data: &SetPermissions,
    ) -> AppResult<EffectivePermissions> {
        self.require_manager(actor_id).await?;
        let user = self.repository.users.get_by_id(user_id).await?;

        let set = PermissionSet::from_names(&data.permissions)?;

        let before = self.get(user_id).await?;
        self.repository
            .users
            .upsert_user_permission(user_id, &set.names(), data.use_custom)
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Updated user permissions",
                format!("Updated custom permissions for {} ({})", user.name, user.email),
                Some((SubjectType::User, user.id)),
                Some(serde_json::json!({
                    "permissions": before.permissions,
                    "is_custom": before.is_custom,
                })),
                Some(serde_json::json!({
                    "permissions": set.names(),
                    "is_custom": data.use_custom,
                })),
            )
            .await;

        self.get(user_id).await
    }

    /// Add a single permission to the user's custom set and switch the
    /// user onto custom permissions.
    pub async fn add(
        &self,
        actor_id: i32,
        user_id: i32,
        name: &str,
    ) -> AppResult<EffectivePermissions> {
        self.require_manager(actor_id).await?;
        let user = self.repository.users.get_by_id(user_id).await?;

        let permission: Permission = name.parse().map_err(AppError::Validation)?;

        let mut set = match self.repository.users.get_user_permission(user_id).await? {
            Some(record) => record.permission_set(),
            None => PermissionSet::empty(),
        };
        set.granted.insert(permission);

        self.repository
            .users
            .upsert_user_permission(user_id, &set.names(), true)
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Added user permission",
                format!(
                    "Granted '{}' to {} ({})",
                    permission.as_str(),
                    user.name,
                    user.email
                ),
                Some((SubjectType::User, user.id)),
                None,
                None,
            )
            .await;

        self.get(user_id).await
    }

    /// Remove a single permission from the custom set. The custom flag
    /// is left as is; removing from a user without a custom record is a
    /// no-op.
    pub async fn remove(
        &self,
        actor_id: i32,
        user_id: i32,
        name: &str,
    ) -> AppResult<EffectivePermissions> {
        self.require_manager(actor_id).await?;
        let user = self.repository.users.get_by_id(user_id).await?;

        let permission: Permission = name.parse().map_err(AppError::Validation)?;

        if let Some(record) = self.repository.users.get_user_permission(user_id).await? {
            let mut set = record.permission_set();
            set.granted.remove(&permission);
            self.repository
                .users
                .upsert_user_permission(user_id, &set.names(), record.use_custom_permissions)
                .await?;

            self.logs
                .record(
                    Some(actor_id),
                    "Removed user permission",
                    format!(
                        "Revoked '{}' from {} ({})",
                        permission.as_str(),
                        user.name,
                        user.email
                    ),
                    Some((SubjectType::User, user.id)),
                    None,
                    None,
                )
                .await;
        }

        self.get(user_id).await
    }

    /// Clear the custom set and return the user to role permissions.
    pub async fn reset(&self, actor_id: i32, user_id: i32) -> AppResult<EffectivePermissions> {
        self.require_manager(actor_id).await?;
        let user = self.repository.users.get_by_id(user_id).await?;

        self.repository
            .users
            .upsert_user_permission(user_id, &[], false)
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Reset user permissions",
                format!(
                    "Reset {} ({}) to role permissions",
                    user.name, user.email
                ),
                Some((SubjectType::User, user.id)),
                None,
                None,
            )
            .await;

        self.get(user_id).await
    }
}
