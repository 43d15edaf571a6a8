//! Employees repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::employee::{CreateEmployee, Employee, EmployeeQuery, UpdateEmployee},
};

#[derive(Clone)]
pub struct EmployeesRepository {
    pool: Pool<Postgres>,
}

impl EmployeesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get employee by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee with id {} not found", id)))
    }

    /// List employees with optional search, paginated
    pub async fn list(&self, query: &EmployeeQuery) -> AppResult<(Vec<Employee>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE ($1::text IS NULL
                   OR LOWER(first_name) LIKE $1
                   OR LOWER(last_name) LIKE $1
                   OR LOWER(email) LIKE $1)
              AND ($2::text IS NULL OR employee_type = $2)
            ORDER BY last_name, first_name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&search)
        .bind(&query.employee_type)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM employees
            WHERE ($1::text IS NULL
                   OR LOWER(first_name) LIKE $1
                   OR LOWER(last_name) LIKE $1
                   OR LOWER(email) LIKE $1)
              AND ($2::text IS NULL OR employee_type = $2)
            "#,
        )
        .bind(&search)
        .bind(&query.employee_type)
        .fetch_one(&self.pool)
        .await?;

        Ok((employees, total))
    }

    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM employees WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM employees WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Create an employee
    pub async fn create(&self, data: &CreateEmployee) -> AppResult<Employee> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (first_name, last_name, email, employee_type, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.employee_type)
        .bind(&data.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Update an employee; None fields are left unchanged.
    pub async fn update(&self, id: i32, data: &UpdateEmployee) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                employee_type = COALESCE($5, employee_type),
                phone = COALESCE($6, phone),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.employee_type)
        .bind(&data.phone)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee with id {} not found", id)))
    }

    /// Delete an employee. Rows referenced by requests or transactions
    /// refuse to go (foreign key, no cascade) and map to a conflict.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                    AppError::Conflict(format!(
                        "Employee {} has borrow history and cannot be deleted",
                        id
                    ))
                }
                _ => AppError::from(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Employee with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
