//! Users, roles and permission override repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        permission::UserPermission,
        role::Role,
        user::{User, UserQuery, UserWithAccess},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (authentication path)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user with role and permission override loaded
    pub async fn get_with_access(&self, id: i32) -> AppResult<UserWithAccess> {
        let user = self.get_by_id(id).await?;

        let role = match user.role_id {
            Some(role_id) => self.get_role(role_id).await?,
            None => None,
        };

        let user_permissions = self.get_user_permission(user.id).await?;

        Ok(UserWithAccess {
            user,
            role,
            user_permissions,
        })
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// List users with optional search, paginated
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            LEFT JOIN roles r ON u.role_id = r.id
            WHERE ($1::text IS NULL OR LOWER(u.name) LIKE $1 OR LOWER(u.email) LIKE $1)
              AND ($2::text IS NULL OR r.name = $2)
            ORDER BY u.name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&search)
        .bind(&query.role)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users u
            LEFT JOIN roles r ON u.role_id = r.id
            WHERE ($1::text IS NULL OR LOWER(u.name) LIKE $1 OR LOWER(u.email) LIKE $1)
              AND ($2::text IS NULL OR r.name = $2)
            "#,
        )
        .bind(&search)
        .bind(&query.role)
        .fetch_one(&self.pool)
        .await?;

        Ok((users, total))
    }

    /// Create a user. `password` must already be hashed.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role_id: Option<i32>,
        employee_id: Option<i32>,
        position: Option<&str>,
        department: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role_id, employee_id, position, department, phone, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role_id)
        .bind(employee_id)
        .bind(position)
        .bind(department)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update a user; None fields are left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: i32,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        role_id: Option<i32>,
        employee_id: Option<i32>,
        position: Option<&str>,
        department: Option<&str>,
        phone: Option<&str>,
        is_active: Option<bool>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password),
                role_id = COALESCE($5, role_id),
                employee_id = COALESCE($6, employee_id),
                position = COALESCE($7, position),
                department = COALESCE($8, department),
                phone = COALESCE($9, phone),
                is_active = COALESCE($10, is_active),
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role_id)
        .bind(employee_id)
        .bind(position)
        .bind(department)
        .bind(phone)
        .bind(is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user. Activity log references are set NULL by the schema.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    pub async fn get_role(&self, id: i32) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    pub async fn get_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    // ------------------------------------------------------------------
    // Permission overrides
    // ------------------------------------------------------------------

    pub async fn get_user_permission(&self, user_id: i32) -> AppResult<Option<UserPermission>> {
        let record = sqlx::query_as::<_, UserPermission>(
            "SELECT * FROM user_permissions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Create or overwrite the override record for a user
    pub async fn upsert_user_permission(
        &self,
        user_id: i32,
        permissions: &[String],
        use_custom: bool,
    ) -> AppResult<UserPermission> {
        let record = sqlx::query_as::<_, UserPermission>(
            r#"
            INSERT INTO user_permissions (user_id, permissions, use_custom_permissions)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                permissions = EXCLUDED.permissions,
                use_custom_permissions = EXCLUDED.use_custom_permissions,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(sqlx::types::Json(permissions.to_vec()))
        .bind(use_custom)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}
