//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        activity_log::SubjectType,
        user::{
            ChangePassword, CreateUser, UpdateProfile, UpdateUser, User, UserClaims,
            UserDetails, UserQuery,
        },
    },
    repository::Repository,
};

use super::activity_logs::ActivityLogsService;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    logs: ActivityLogsService,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, logs: ActivityLogsService) -> Self {
        Self {
            repository,
            config,
            logs,
        }
    }

    /// Authenticate by email and password, returning a JWT and the user
    /// with role and permissions loaded.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, UserDetails)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let access = self.repository.users.get_with_access(user.id).await?;
        let token = self.create_token(&access.user, &access)?;

        self.logs
            .record(
                Some(user.id),
                "User login",
                format!("User {} ({}) logged in successfully", user.name, user.email),
                None,
                None,
                None,
            )
            .await;

        Ok((token, access.into_details()))
    }

    /// Record a logout in the audit trail
    pub async fn logout(&self, user_id: i32) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;
        self.logs
            .record(
                Some(user.id),
                "User logout",
                format!("User {} ({}) logged out", user.name, user.email),
                None,
                None,
                None,
            )
            .await;
        Ok(())
    }

    /// Current authenticated user with role and permissions
    pub async fn me(&self, user_id: i32) -> AppResult<UserDetails> {
        let access = self.repository.users.get_with_access(user_id).await?;
        Ok(access.into_details())
    }

    /// Create a user account (admin operation)
    pub async fn create(&self, actor_id: i32, data: &CreateUser) -> AppResult<UserDetails> {
        if self.repository.users.email_exists(&data.email, None).await? {
            return Err(AppError::Validation("Email is already taken".to_string()));
        }

        if let Some(role_id) = data.role_id {
            if self.repository.users.get_role(role_id).await?.is_none() {
                return Err(AppError::Validation(format!("Role {} does not exist", role_id)));
            }
        }

        let password_hash = self.hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(
                &data.name,
                &data.email,
                &password_hash,
                data.role_id,
                data.employee_id,
                data.position.as_deref(),
                data.department.as_deref(),
                data.phone.as_deref(),
            )
            .await?;

        let access = self.repository.users.get_with_access(user.id).await?;
        let role_name = access
            .role
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_else(|| "no role".to_string());

        self.logs
            .record(
                Some(actor_id),
                "Created new user",
                format!(
                    "Created user account for {} ({}) with role: {}",
                    user.name, user.email, role_name
                ),
                Some((SubjectType::User, user.id)),
                None,
                None,
            )
            .await;

        Ok(access.into_details())
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<UserDetails>, i64)> {
        let (users, total) = self.repository.users.list(query).await?;
        let mut details = Vec::with_capacity(users.len());
        for user in users {
            let access = self.repository.users.get_with_access(user.id).await?;
            details.push(access.into_details());
        }
        Ok((details, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<UserDetails> {
        let access = self.repository.users.get_with_access(id).await?;
        Ok(access.into_details())
    }

    /// Update a user account (admin operation)
    pub async fn update(&self, actor_id: i32, id: i32, data: &UpdateUser) -> AppResult<UserDetails> {
        let before = self.repository.users.get_by_id(id).await?;

        if let Some(ref email) = data.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Validation("Email is already taken".to_string()));
            }
        }

        let password_hash = match &data.password {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        let user = self
            .repository
            .users
            .update(
                id,
                data.name.as_deref(),
                data.email.as_deref(),
                password_hash.as_deref(),
                data.role_id,
                data.employee_id,
                data.position.as_deref(),
                data.department.as_deref(),
                data.phone.as_deref(),
                data.is_active,
            )
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Updated user",
                format!("Updated user account for {} ({})", user.name, user.email),
                Some((SubjectType::User, user.id)),
                Some(serde_json::json!({ "name": before.name, "email": before.email })),
                Some(serde_json::json!({ "name": user.name, "email": user.email })),
            )
            .await;

        let access = self.repository.users.get_with_access(user.id).await?;
        Ok(access.into_details())
    }

    /// Delete a user account (admin operation)
    pub async fn delete(&self, actor_id: i32, id: i32) -> AppResult<()> {
        let user = self.repository.users.get_by_id(id).await?;

        // Log before deleting so the entry captures the account details;
        // the schema nulls the user reference afterwards
        self.logs
            .record(
                Some(actor_id),
                "Deleted user",
                format!("Deleted user account for {} ({})", user.name, user.email),
                Some((SubjectType::User, user.id)),
                None,
                None,
            )
            .await;

        self.repository.users.delete(id).await
    }

    /// Update own profile
    pub async fn update_profile(&self, user_id: i32, data: &UpdateProfile) -> AppResult<UserDetails> {
        if let Some(ref email) = data.email {
            if self.repository.users.email_exists(email, Some(user_id)).await? {
                return Err(AppError::Validation("Email is already taken".to_string()));
            }
        }

        let user = self
            .repository
            .users
            .update(
                user_id,
                data.name.as_deref(),
                data.email.as_deref(),
                None,
                None,
                None,
                data.position.as_deref(),
                data.department.as_deref(),
                data.phone.as_deref(),
                None,
            )
            .await?;

        self.logs
            .record(
                Some(user.id),
                "Updated profile",
                format!("Updated profile information for {} ({})", user.name, user.email),
                Some((SubjectType::User, user.id)),
                None,
                None,
            )
            .await;

        let access = self.repository.users.get_with_access(user.id).await?;
        Ok(access.into_details())
    }

    /// Change own password, verifying the current one first
    pub async fn change_password(&self, user_id: i32, data: &ChangePassword) -> AppResult<()> {
        let user = self.repository.users.get_by_id(user_id).await?;

        if !self.verify_password(&user, &data.current_password)? {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = self.hash_password(&data.password)?;
        self.repository
            .users
            .update(
                user_id, None, None,
                Some(&password_hash),
                None, None, None, None, None, None,
            )
            .await?;

        self.logs
            .record(
                Some(user.id),
                "Password changed",
                format!("User {} ({}) changed their password", user.name, user.email),
                None,
                None,
                None,
            )
            .await;

        Ok(())
    }

    pub async fn list_roles(&self) -> AppResult<Vec<crate::models::role::Role>> {
        self.repository.users.list_roles().await
    }

    fn create_token(
        &self,
        user: &User,
        access: &crate::models::user::UserWithAccess,
    ) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: access.role.as_ref().map(|r| r.name.clone()),
            permissions: access.effective_permissions().names(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
