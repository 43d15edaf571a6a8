//! Transactions repository: release/return flow with guarded transitions

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        employee::CurrentHolder,
        equipment::EquipmentStatus,
        transaction::{Transaction, TransactionDetails, TransactionQuery, TransactionStats},
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT t.id, t.transaction_number, t.request_id, t.equipment_id,
           e.serial_number, e.brand, c.name AS category_name,
           t.employee_id, emp.first_name || ' ' || emp.last_name AS employee_name,
           t.status, t.request_mode, t.release_condition, t.release_date,
           t.expected_return_date, t.return_condition, t.return_date, t.created_at
    FROM transactions t
    JOIN equipment e ON t.equipment_id = e.id
    LEFT JOIN categories c ON e.category_id = c.id
    JOIN employees emp ON t.employee_id = emp.id
"#;

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get transaction by ID (soft-deleted rows excluded)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Transaction> {
        sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction with id {} not found", id)))
    }

    /// List transactions with equipment/employee context, paginated
    pub async fn list(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<(Vec<TransactionDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let sql = format!(
            r#"{DETAILS_SELECT}
            WHERE t.deleted_at IS NULL
              AND ($1::text IS NULL OR t.status = $1)
              AND ($2::int IS NULL OR t.employee_id = $2)
            ORDER BY t.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let transactions = sqlx::query_as::<_, TransactionDetails>(&sql)
            .bind(&query.status)
            .bind(query.employee_id)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions t
            WHERE t.deleted_at IS NULL
              AND ($1::text IS NULL OR t.status = $1)
              AND ($2::int IS NULL OR t.employee_id = $2)
            "#,
        )
        .bind(&query.status)
        .bind(query.employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((transactions, total))
    }

    /// Transactions awaiting or past release (the "approved" view)
    pub async fn list_open(&self) -> AppResult<Vec<TransactionDetails>> {
        let sql = format!(
            r#"{DETAILS_SELECT}
            WHERE t.deleted_at IS NULL AND t.status IN ('pending', 'released')
            ORDER BY t.created_at DESC
            "#
        );
        let transactions = sqlx::query_as::<_, TransactionDetails>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(transactions)
    }

    /// Completed transactions (the "history" view)
    pub async fn list_history(&self) -> AppResult<Vec<TransactionDetails>> {
        let sql = format!(
            r#"{DETAILS_SELECT}
            WHERE t.deleted_at IS NULL AND t.status IN ('returned', 'lost', 'damaged')
            ORDER BY t.updated_at DESC
            "#
        );
        let transactions = sqlx::query_as::<_, TransactionDetails>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(transactions)
    }

    /// Aggregate counts per status
    pub async fn stats(&self) -> AppResult<TransactionStats> {
        let stats = sqlx::query_as::<_, TransactionStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'released') AS released,
                   COUNT(*) FILTER (WHERE status = 'returned') AS returned,
                   COUNT(*) FILTER (WHERE status = 'lost') AS lost,
                   COUNT(*) FILTER (WHERE status = 'damaged') AS damaged
            FROM transactions
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    /// Employees currently holding released equipment
    pub async fn current_holders(&self) -> AppResult<Vec<CurrentHolder>> {
        let holders = sqlx::query_as::<_, CurrentHolder>(
            r#"
            SELECT t.employee_id,
                   emp.first_name || ' ' || emp.last_name AS employee_name,
                   t.id AS transaction_id, t.transaction_number,
                   t.equipment_id, e.serial_number, e.brand,
                   t.release_date, t.expected_return_date
            FROM transactions t
            JOIN employees emp ON t.employee_id = emp.id
            JOIN equipment e ON t.equipment_id = e.id
            WHERE t.deleted_at IS NULL AND t.status = 'released'
            ORDER BY t.release_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(holders)
    }

    /// Mark equipment released (pending -> released, compare-and-swap) and
    /// flip the equipment to `in_use`, atomically.
    pub async fn release(
        &self,
        id: i32,
        released_by: i32,
        condition: &str,
        notes: Option<&str>,
        expected_return_date: Option<DateTime<Utc>>,
    ) -> AppResult<Transaction> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'released', release_condition = $2, release_notes = $3,
                release_date = $4, released_by = $5,
                expected_return_date = COALESCE($6, expected_return_date),
                updated_at = $4
            WHERE id = $1 AND status = 'pending' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(condition)
        .bind(notes)
        .bind(now)
        .bind(released_by)
        .bind(expected_return_date)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match transaction {
            Some(t) => t,
            None => {
                let current = self.get_by_id(id).await?;
                return Err(AppError::Conflict(format!(
                    "Transaction {} is already {}",
                    id, current.status
                )));
            }
        };

        sqlx::query("UPDATE equipment SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(transaction.equipment_id)
            .bind(EquipmentStatus::InUse)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    /// Verify a return (released -> returned, compare-and-swap) and flip
    /// the equipment back to `available`, atomically.
    pub async fn mark_returned(
        &self,
        id: i32,
        received_by: i32,
        condition: &str,
        notes: Option<&str>,
    ) -> AppResult<Transaction> {
        self.resolve(
            id,
            "returned",
            EquipmentStatus::Available,
            received_by,
            Some(condition),
            notes,
        )
        .await
    }

    /// Mark equipment lost (released -> lost); the equipment is retired.
    pub async fn mark_lost(&self, id: i32, received_by: i32, notes: Option<&str>) -> AppResult<Transaction> {
        self.resolve(id, "lost", EquipmentStatus::Retired, received_by, None, notes)
            .await
    }

    /// Mark equipment damaged (released -> damaged); the equipment goes to
    /// maintenance.
    pub async fn mark_damaged(
        &self,
        id: i32,
        received_by: i32,
        notes: Option<&str>,
    ) -> AppResult<Transaction> {
        self.resolve(id, "damaged", EquipmentStatus::Maintenance, received_by, None, notes)
            .await
    }

    /// Shared released -> terminal transition: CAS on `status = 'released'`
    /// plus the equipment status side effect, in one database transaction.
    async fn resolve(
        &self,
        id: i32,
        next_status: &str,
        equipment_status: EquipmentStatus,
        received_by: i32,
        condition: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<Transaction> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2, return_condition = $3, return_notes = $4,
                return_date = $5, received_by = $6, updated_at = $5
            WHERE id = $1 AND status = 'released' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next_status)
        .bind(condition)
        .bind(notes)
        .bind(now)
        .bind(received_by)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match transaction {
            Some(t) => t,
            None => {
                let current = self.get_by_id(id).await?;
                return Err(AppError::Conflict(format!(
                    "Transaction {} is {}, expected released",
                    id, current.status
                )));
            }
        };

        sqlx::query("UPDATE equipment SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(transaction.equipment_id)
            .bind(equipment_status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(transaction)
    }
}
