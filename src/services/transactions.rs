//! Equipment transactions: release, return, loss, damage.

use crate::{
    error::AppResult,
    models::{
        activity_log::SubjectType,
        employee::CurrentHolder,
        transaction::{
            ReleaseTransaction, ResolveTransaction, ReturnTransaction, Transaction,
            TransactionDetails, TransactionQuery, TransactionStats,
        },
    },
    repository::Repository,
};

use super::activity_logs::ActivityLogsService;

#[derive(Clone)]
pub struct TransactionsService {
    repository: Repository,
    logs: ActivityLogsService,
}

impl TransactionsService {
    pub fn new(repository: Repository, logs: ActivityLogsService) -> Self {
        Self { repository, logs }
    }

    pub async fn list(&self, query: &TransactionQuery) -> AppResult<(Vec<TransactionDetails>, i64)> {
        self.repository.transactions.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Transaction> {
        self.repository.transactions.get_by_id(id).await
    }

    /// Pending and released transactions, i.e. approvals not yet closed out
    pub async fn list_open(&self) -> AppResult<Vec<TransactionDetails>> {
        self.repository.transactions.list_open().await
    }

    /// Transactions that reached a terminal state
    pub async fn list_history(&self) -> AppResult<Vec<TransactionDetails>> {
        self.repository.transactions.list_history().await
    }

    pub async fn stats(&self) -> AppResult<TransactionStats> {
        self.repository.transactions.stats().await
    }

    pub async fn current_holders(&self) -> AppResult<Vec<CurrentHolder>> {
        self.repository.transactions.current_holders().await
    }

    /// Hand the equipment over (pending -> released, equipment to in_use)
    pub async fn release(
        &self,
        actor_id: i32,
        id: i32,
        data: &ReleaseTransaction,
    ) -> AppResult<Transaction> {
        let transaction = self
            .repository
            .transactions
            .release(
                id,
                actor_id,
                &data.condition,
                data.notes.as_deref(),
                data.expected_return_date,
            )
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Released equipment",
                format!(
                    "Released equipment for transaction {}",
                    transaction.transaction_number
                ),
                Some((SubjectType::Transaction, transaction.id)),
                None,
                None,
            )
            .await;

        Ok(transaction)
    }

    /// Verify a return (released -> returned, equipment back to available)
    pub async fn mark_returned(
        &self,
        actor_id: i32,
        id: i32,
        data: &ReturnTransaction,
    ) -> AppResult<Transaction> {
        let transaction = self
            .repository
            .transactions
            .mark_returned(id, actor_id, &data.condition, data.notes.as_deref())
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Returned equipment",
                format!(
                    "Verified return for transaction {} (condition: {})",
                    transaction.transaction_number, data.condition
                ),
                Some((SubjectType::Transaction, transaction.id)),
                None,
                None,
            )
            .await;

        Ok(transaction)
    }

    /// Close out as lost (released -> lost, equipment retired)
    pub async fn mark_lost(
        &self,
        actor_id: i32,
        id: i32,
        data: &ResolveTransaction,
    ) -> AppResult<Transaction> {
        let transaction = self
            .repository
            .transactions
            .mark_lost(id, actor_id, data.notes.as_deref())
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Marked equipment lost",
                format!(
                    "Marked transaction {} as lost",
                    transaction.transaction_number
                ),
                Some((SubjectType::Transaction, transaction.id)),
                None,
                None,
            )
            .await;

        Ok(transaction)
    }

    /// Close out as damaged (released -> damaged, equipment to maintenance)
    pub async fn mark_damaged(
        &self,
        actor_id: i32,
        id: i32,
        data: &ResolveTransaction,
    ) -> AppResult<Transaction> {
        let transaction = self
            .repository
            .transactions
            .mark_damaged(id, actor_id, data.notes.as_deref())
            .await?;

        self.logs
            .record(
                Some(actor_id),
                "Marked equipment damaged",
                format!(
                    "Marked transaction {} as damaged",
                    transaction.transaction_number
                ),
                Some((SubjectType::Transaction, transaction.id)),
                None,
                None,
            )
            .await;

        Ok(transaction)
    }
}
