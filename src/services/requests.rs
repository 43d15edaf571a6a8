//! Borrow requests and their approval workflow.
//!
//! Status transitions are compare-and-swap updates in the repository, so
//! two approvers racing on the same request cannot both win; the loser
//! gets a conflict.

use crate::{
    error::{AppError, AppResult},
    models::{
        activity_log::SubjectType,
        request::{
            ApproveRequest, CreateRequest, RejectRequest, Request, RequestDetails, RequestQuery,
        },
        transaction::Transaction,
    },
    repository::Repository,
};

use super::activity_logs::ActivityLogsService;

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    logs: ActivityLogsService,
}

impl RequestsService {
    pub fn new(repository: Repository, logs: ActivityLogsService) -> Self {
        Self { repository, logs }
    }

    pub async fn list(&self, query: &RequestQuery) -> AppResult<(Vec<RequestDetails>, i64)> {
        self.repository.requests.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Request> {
        self.repository.requests.get_by_id(id).await
    }

    pub async fn create(&self, actor_id: i32, data: &CreateRequest) -> AppResult<Request> {
        let employee = self.repository.employees.get_by_id(data.employee_id).await?;
        let equipment = self.repository.equipment.get_by_id(data.equipment_id).await?;

        if let (Some(start), Some(end)) = (data.expected_start_date, data.expected_end_date) {
            if end < start {
                return Err(AppError::Validation(
                    "Expected end date must not be before the start date".to_string(),
                ));
            }
        }

        let request = self.repository.requests.create(data).await?;

        self.logs
            .record(
                Some(actor_id),
                "Created borrow request",
                format!(
                    "Created request #{} for {} {} (equipment {})",
                    request.id, employee.first_name, employee.last_name, equipment.serial_number
                ),
                Some((SubjectType::Request, request.id)),
                None,
                None,
            )
            .await;

        Ok(request)
    }

    /// Approve a pending request. A pending transaction is created in the
    /// same database transaction as the status flip.
    pub async fn approve(
        &self,
        actor_id: i32,
        id: i32,
        data: &ApproveRequest,
    ) -> AppResult<(Request, Transaction)> {
        let (request, transaction) = self
            .repository
            .requests
            .approve(id, actor_id, data.notes.as_deref())
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Approved borrow request",
                format!(
                    "Approved request #{}; created transaction {}",
                    request.id, transaction.transaction_number
                ),
                Some((SubjectType::Request, request.id)),
                None,
                None,
            )
            .await;

        Ok((request, transaction))
    }

    pub async fn reject(&self, actor_id: i32, id: i32, data: &RejectRequest) -> AppResult<Request> {
        let request = self
            .repository
            .requests
            .reject(id, actor_id, &data.reason)
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Rejected borrow request",
                format!("Rejected request #{}: {}", request.id, data.reason),
                Some((SubjectType::Request, request.id)),
                None,
                None,
            )
            .await;

        Ok(request)
    }

    pub async fn cancel(&self, actor_id: i32, id: i32) -> AppResult<Request> {
        let request = self.repository.requests.cancel(id).await?;

        self.logs
            .record(
                Some(actor_id),
                "Cancelled borrow request",
                format!("Cancelled request #{}", request.id),
                Some((SubjectType::Request, request.id)),
                None,
                None,
            )
            .await;

        Ok(request)
    }
}
