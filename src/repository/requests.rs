//! Requests repository: creation and guarded status transitions

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        request::{CreateRequest, Request, RequestDetails, RequestQuery, RequestStatus},
        transaction::Transaction,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID (soft-deleted rows excluded)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Request> {
        sqlx::query_as::<_, Request>(
            "SELECT * FROM requests WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request with id {} not found", id)))
    }

    /// List requests with employee and equipment context, paginated
    pub async fn list(&self, query: &RequestQuery) -> AppResult<(Vec<RequestDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let requests = sqlx::query_as::<_, RequestDetails>(
            r#"
            SELECT r.id, r.employee_id,
                   emp.first_name || ' ' || emp.last_name AS employee_name,
                   emp.email AS employee_email,
                   r.equipment_id, e.serial_number, e.brand, c.name AS category_name,
                   r.request_type, r.request_mode, r.reason,
                   r.expected_start_date, r.expected_end_date, r.status,
                   r.approved_by, r.approval_notes, r.rejection_reason, r.created_at
            FROM requests r
            JOIN employees emp ON r.employee_id = emp.id
            JOIN equipment e ON r.equipment_id = e.id
            LEFT JOIN categories c ON e.category_id = c.id
            WHERE r.deleted_at IS NULL
              AND ($1::text IS NULL OR r.status = $1)
              AND ($2::int IS NULL OR r.employee_id = $2)
            ORDER BY r.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&query.status)
        .bind(query.employee_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM requests r
            WHERE r.deleted_at IS NULL
              AND ($1::text IS NULL OR r.status = $1)
              AND ($2::int IS NULL OR r.employee_id = $2)
            "#,
        )
        .bind(&query.status)
        .bind(query.employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((requests, total))
    }

    /// Create a new request in `pending` state
    pub async fn create(&self, data: &CreateRequest) -> AppResult<Request> {
        let request = sqlx::query_as::<_, Request>(
            r#"
            INSERT INTO requests (employee_id, equipment_id, request_type, request_mode,
                                  reason, expected_start_date, expected_end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(data.employee_id)
        .bind(data.equipment_id)
        .bind(&data.request_type)
        .bind(data.request_mode)
        .bind(&data.reason)
        .bind(data.expected_start_date)
        .bind(data.expected_end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Approve a pending request and create its transaction, atomically.
    ///
    /// The status update is a compare-and-swap on `status = 'pending'`:
    /// a concurrent transition makes this a 409, not a lost update.
    pub async fn approve(
        &self,
        id: i32,
        approver_id: i32,
        notes: Option<&str>,
    ) -> AppResult<(Request, Transaction)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, Request>(
            r#"
            UPDATE requests
            SET status = 'approved', approved_by = $2, approval_notes = $3,
                approved_at = $4, updated_at = $4
            WHERE id = $1 AND status = 'pending' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver_id)
        .bind(notes)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let request = match request {
            Some(r) => r,
            None => {
                // Distinguish missing from already-transitioned
                let current = self.get_by_id(id).await?;
                return Err(AppError::Conflict(format!(
                    "Request {} is already {}",
                    id, current.status
                )));
            }
        };

        let transaction_number = format!("TXN-{}", Uuid::new_v4().simple());
        let expected_return = request
            .expected_end_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (transaction_number, request_id, equipment_id,
                                      user_id, employee_id, status, request_mode,
                                      expected_return_date)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7)
            RETURNING *
            "#,
        )
        .bind(&transaction_number)
        .bind(request.id)
        .bind(request.equipment_id)
        .bind(approver_id)
        .bind(request.employee_id)
        .bind(request.request_mode)
        .bind(expected_return)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((request, transaction))
    }

    /// Reject a pending request (compare-and-swap). No transaction is
    /// created.
    pub async fn reject(&self, id: i32, approver_id: i32, reason: &str) -> AppResult<Request> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, Request>(
            r#"
            UPDATE requests
            SET status = 'rejected', approved_by = $2, rejection_reason = $3,
                rejected_at = $4, updated_at = $4
            WHERE id = $1 AND status = 'pending' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approver_id)
        .bind(reason)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match request {
            Some(r) => Ok(r),
            None => {
                let current = self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Request {} is already {}",
                    id, current.status
                )))
            }
        }
    }

    /// Cancel a pending request (compare-and-swap)
    pub async fn cancel(&self, id: i32) -> AppResult<Request> {
        let request = sqlx::query_as::<_, Request>(
            r#"
            UPDATE requests
            SET status = 'cancelled', updated_at = $2
            WHERE id = $1 AND status = 'pending' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match request {
            Some(r) => Ok(r),
            None => {
                let current = self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Request {} is already {}",
                    id, current.status
                )))
            }
        }
    }

    /// Count requests by status
    pub async fn count_by_status(&self, status: RequestStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM requests WHERE status = $1 AND deleted_at IS NULL",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
