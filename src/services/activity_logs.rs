//! Activity log service: audit trail writes and queries

use crate::{
    error::AppResult,
    models::activity_log::{ActivityLog, ActivityLogQuery, CreateActivityLog, SubjectType},
    repository::Repository,
};

#[derive(Clone)]
pub struct ActivityLogsService {
    repository: Repository,
}

impl ActivityLogsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Best-effort audit write from other services. A failed insert never
    /// fails the parent operation.
    pub async fn record(
        &self,
        user_id: Option<i32>,
        action: &str,
        description: String,
        subject: Option<(SubjectType, i32)>,
        old_values: Option<serde_json::Value>,
        new_values: Option<serde_json::Value>,
    ) {
        let (model_type, model_id) = match subject {
            Some((t, id)) => (Some(t), Some(id)),
            None => (None, None),
        };

        if let Err(e) = self
            .repository
            .activity_logs
            .insert(
                user_id,
                action,
                &description,
                model_type,
                model_id,
                old_values.as_ref(),
                new_values.as_ref(),
            )
            .await
        {
            tracing::warn!(action, error = %e, "failed to write activity log");
        }
    }

    /// Explicit log entry via the API
    pub async fn create(
        &self,
        user_id: Option<i32>,
        data: &CreateActivityLog,
    ) -> AppResult<ActivityLog> {
        self.repository
            .activity_logs
            .insert(
                user_id,
                &data.action,
                &data.description,
                data.model_type,
                data.model_id,
                data.old_values.as_ref(),
                data.new_values.as_ref(),
            )
            .await
    }

    pub async fn list(&self, query: &ActivityLogQuery) -> AppResult<(Vec<ActivityLog>, i64)> {
        self.repository.activity_logs.list(query).await
    }

    pub async fn search(
        &self,
        term: &str,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<ActivityLog>, i64)> {
        self.repository.activity_logs.search(term, page, per_page).await
    }
}
