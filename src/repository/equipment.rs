//! Equipment and categories repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CreateCategory},
        equipment::{
            AddStock, CreateEquipment, Equipment, EquipmentDetails, EquipmentQuery,
            EquipmentStatus, UpdateEquipment,
        },
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get equipment by ID (soft-deleted rows excluded)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    /// List equipment with filters, paginated
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<(Vec<EquipmentDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let items = sqlx::query_as::<_, EquipmentDetails>(
            r#"
            SELECT e.id, e.category_id, c.name AS category_name, e.serial_number,
                   e.brand, e.supplier, e.description, e.purchase_price, e.status,
                   e.item_image, e.receipt_image, e.created_at, e.updated_at
            FROM equipment e
            LEFT JOIN categories c ON e.category_id = c.id
            WHERE e.deleted_at IS NULL
              AND ($1::text IS NULL OR e.status = $1)
              AND ($2::int IS NULL OR e.category_id = $2)
              AND ($3::text IS NULL
                   OR LOWER(e.serial_number) LIKE $3
                   OR LOWER(e.brand) LIKE $3
                   OR LOWER(e.description) LIKE $3)
            ORDER BY e.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&query.status)
        .bind(query.category_id)
        .bind(&search)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM equipment e
            WHERE e.deleted_at IS NULL
              AND ($1::text IS NULL OR e.status = $1)
              AND ($2::int IS NULL OR e.category_id = $2)
              AND ($3::text IS NULL
                   OR LOWER(e.serial_number) LIKE $3
                   OR LOWER(e.brand) LIKE $3
                   OR LOWER(e.description) LIKE $3)
            "#,
        )
        .bind(&query.status)
        .bind(query.category_id)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }

    pub async fn serial_exists(&self, serial: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1 AND id != $2 AND deleted_at IS NULL)",
            )
            .bind(serial)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1 AND deleted_at IS NULL)",
            )
            .bind(serial)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Create a single equipment item
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let status = data.status.unwrap_or(EquipmentStatus::Available);

        let equipment = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (category_id, serial_number, brand, supplier,
                                   description, purchase_price, status, item_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.category_id)
        .bind(&data.serial_number)
        .bind(&data.brand)
        .bind(&data.supplier)
        .bind(&data.description)
        .bind(data.purchase_price)
        .bind(status)
        .bind(&data.item_image)
        .fetch_one(&self.pool)
        .await?;

        Ok(equipment)
    }

    /// Insert a batch of items sharing category/brand/supplier/price.
    /// All inserts happen in one database transaction.
    pub async fn add_stock(&self, data: &AddStock) -> AppResult<Vec<Equipment>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(data.serial_numbers.len());

        for serial in &data.serial_numbers {
            let duplicate: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1 AND deleted_at IS NULL)",
            )
            .bind(serial)
            .fetch_one(&mut *tx)
            .await?;

            if duplicate {
                return Err(AppError::Conflict(format!(
                    "Serial number {} already exists",
                    serial
                )));
            }

            let equipment = sqlx::query_as::<_, Equipment>(
                r#"
                INSERT INTO equipment (category_id, serial_number, brand, supplier,
                                       description, purchase_price, status, receipt_image)
                VALUES ($1, $2, $3, $4, $5, $6, 'available', $7)
                RETURNING *
                "#,
            )
            .bind(data.category_id)
            .bind(serial)
            .bind(&data.brand)
            .bind(&data.supplier)
            .bind(&data.description)
            .bind(data.purchase_price)
            .bind(&data.receipt_image)
            .fetch_one(&mut *tx)
            .await?;

            created.push(equipment);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Update equipment; None fields are left unchanged.
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment SET
                category_id = COALESCE($2, category_id),
                serial_number = COALESCE($3, serial_number),
                brand = COALESCE($4, brand),
                supplier = COALESCE($5, supplier),
                description = COALESCE($6, description),
                purchase_price = COALESCE($7, purchase_price),
                status = COALESCE($8, status),
                item_image = COALESCE($9, item_image),
                updated_at = $10
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.category_id)
        .bind(&data.serial_number)
        .bind(&data.brand)
        .bind(&data.supplier)
        .bind(&data.description)
        .bind(data.purchase_price)
        .bind(data.status)
        .bind(&data.item_image)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    /// Soft-delete equipment
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE equipment SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Equipment with id {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Set equipment status as a lifecycle side effect
    pub async fn set_status(&self, id: i32, status: EquipmentStatus) -> AppResult<()> {
        sqlx::query("UPDATE equipment SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1))",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::Conflict(format!(
                "Category {} already exists",
                data.name
            )));
        }

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING *",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }
}
