//! Activity logs repository (append-only)

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::activity_log::{ActivityLog, ActivityLogQuery, SubjectType},
};

const LOG_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.name AS user_name, l.action, l.description,
           l.model_type, l.model_id, l.old_values, l.new_values, l.created_at
    FROM activity_logs l
    LEFT JOIN users u ON l.user_id = u.id
"#;

#[derive(Clone)]
pub struct ActivityLogsRepository {
    pool: Pool<Postgres>,
}

impl ActivityLogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an entry
    pub async fn insert(
        &self,
        user_id: Option<i32>,
        action: &str,
        description: &str,
        model_type: Option<SubjectType>,
        model_id: Option<i32>,
        old_values: Option<&serde_json::Value>,
        new_values: Option<&serde_json::Value>,
    ) -> AppResult<ActivityLog> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO activity_logs (user_id, action, description, model_type,
                                       model_id, old_values, new_values)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(description)
        .bind(model_type)
        .bind(model_id)
        .bind(old_values.map(|v| sqlx::types::Json(v.clone())))
        .bind(new_values.map(|v| sqlx::types::Json(v.clone())))
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ActivityLog> {
        let sql = format!("{LOG_SELECT} WHERE l.id = $1");
        let log = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(log)
    }

    /// List entries within a look-back window, filtered and paginated
    pub async fn list(&self, query: &ActivityLogQuery) -> AppResult<(Vec<ActivityLog>, i64)> {
        // Ten years is cap enough; anything larger would overflow the int cast
        let days = query.days.unwrap_or(30).clamp(1, 3650);
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(15).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let sql = format!(
            r#"{LOG_SELECT}
            WHERE l.created_at >= NOW() - make_interval(days => $1::int)
              AND ($2::int IS NULL OR l.user_id = $2)
              AND ($3::text IS NULL OR l.model_type = $3)
              AND ($4::int IS NULL OR l.model_id = $4)
            ORDER BY l.created_at DESC
            LIMIT $5 OFFSET $6
            "#
        );

        let logs = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(days)
            .bind(query.user_id)
            .bind(&query.model_type)
            .bind(query.model_id)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM activity_logs l
            WHERE l.created_at >= NOW() - make_interval(days => $1::int)
              AND ($2::int IS NULL OR l.user_id = $2)
              AND ($3::text IS NULL OR l.model_type = $3)
              AND ($4::int IS NULL OR l.model_id = $4)
            "#,
        )
        .bind(days)
        .bind(query.user_id)
        .bind(&query.model_type)
        .bind(query.model_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((logs, total))
    }

    /// Case-insensitive LIKE search over action and description
    pub async fn search(
        &self,
        term: &str,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<ActivityLog>, i64)> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let offset = (page - 1) * per_page;
        let pattern = format!("%{}%", term);

        let sql = format!(
            r#"{LOG_SELECT}
            WHERE l.action ILIKE $1 OR l.description ILIKE $1
            ORDER BY l.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let logs = sqlx::query_as::<_, ActivityLog>(&sql)
            .bind(&pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_logs WHERE action ILIKE $1 OR description ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((logs, total))
    }
}
