//! Equipment transaction endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        permission::Permission,
        transaction::{
            ReleaseTransaction, ResolveTransaction, ReturnTransaction, Transaction,
            TransactionDetails, TransactionQuery, TransactionStats,
        },
    },
    AppState,
};

use super::{page_params, ApiResponse, AuthenticatedUser, Pagination};

/// List transactions
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionDetails>)
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<TransactionQuery>,
) -> AppResult<Json<ApiResponse<Vec<TransactionDetails>>>> {
    claims.require(Permission::ViewApprove)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    query.page = Some(page);
    query.per_page = Some(per_page);
    let (transactions, total) = state.services.transactions.list(&query).await?;
    Ok(Json(ApiResponse::paginated(
        transactions,
        Pagination::new(page, per_page, total),
    )))
}

/// Transaction counters by status
#[utoipa::path(
    get,
    path = "/transactions/stats",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters", body = TransactionStats)
    )
)]
pub async fn transaction_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<TransactionStats>>> {
    claims.require(Permission::Dashboard)?;

    let stats = state.services.transactions.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// Open transactions: pending release or out in the field
#[utoipa::path(
    get,
    path = "/transactions/approved",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open transactions", body = Vec<TransactionDetails>)
    )
)]
pub async fn approved_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<TransactionDetails>>>> {
    claims.require(Permission::ViewApprove)?;

    let transactions = state.services.transactions.list_open().await?;
    Ok(Json(ApiResponse::ok(transactions)))
}

/// Closed transactions: returned, lost or damaged
#[utoipa::path(
    get,
    path = "/transactions/history",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transaction history", body = Vec<TransactionDetails>)
    )
)]
pub async fn transaction_history(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<TransactionDetails>>>> {
    claims.require(Permission::Reports)?;

    let transactions = state.services.transactions.list_history().await?;
    Ok(Json(ApiResponse::ok(transactions)))
}

/// Get a single transaction
#[utoipa::path(
    get,
    path = "/transactions/{id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction", body = Transaction),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    claims.require(Permission::ViewApprove)?;

    let transaction = state.services.transactions.get(id).await?;
    Ok(Json(ApiResponse::ok(transaction)))
}

/// Release equipment to the employee
#[utoipa::path(
    post,
    path = "/transactions/{id}/release",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    request_body = ReleaseTransaction,
    responses(
        (status = 200, description = "Equipment released", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Transaction is not pending")
    )
)]
pub async fn release_transaction(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ReleaseTransaction>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    claims.require(Permission::ViewApprove)?;
    request.validate()?;

    let transaction = state
        .services
        .transactions
        .release(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(transaction, "Equipment released")))
}

/// Verify the return of released equipment
#[utoipa::path(
    post,
    path = "/transactions/{id}/return",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    request_body = ReturnTransaction,
    responses(
        (status = 200, description = "Return verified", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Transaction is not released")
    )
)]
pub async fn return_transaction(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ReturnTransaction>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    claims.require(Permission::ViewApprove)?;
    request.validate()?;

    let transaction = state
        .services
        .transactions
        .mark_returned(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(transaction, "Return verified")))
}

/// Close a released transaction as lost
#[utoipa::path(
    post,
    path = "/transactions/{id}/lost",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    request_body = ResolveTransaction,
    responses(
        (status = 200, description = "Marked lost", body = Transaction),
        (status = 409, description = "Transaction is not released")
    )
)]
pub async fn lost_transaction(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ResolveTransaction>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    claims.require(Permission::ViewApprove)?;

    let transaction = state
        .services
        .transactions
        .mark_lost(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(transaction, "Marked lost")))
}

/// Close a released transaction as damaged
#[utoipa::path(
    post,
    path = "/transactions/{id}/damaged",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Transaction ID")),
    request_body = ResolveTransaction,
    responses(
        (status = 200, description = "Marked damaged", body = Transaction),
        (status = 409, description = "Transaction is not released")
    )
)]
pub async fn damaged_transaction(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ResolveTransaction>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    claims.require(Permission::ViewApprove)?;

    let transaction = state
        .services
        .transactions
        .mark_damaged(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(transaction, "Marked damaged")))
}
