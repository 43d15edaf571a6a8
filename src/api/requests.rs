//! Borrow request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        permission::Permission,
        request::{
            ApproveRequest, CreateRequest, RejectRequest, Request, RequestDetails, RequestQuery,
        },
        transaction::Transaction,
    },
    AppState,
};

use super::{page_params, ApiResponse, AuthenticatedUser, Pagination};

/// Approval payload: the updated request and the transaction it opened
#[derive(Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub request: Request,
    pub transaction: Transaction,
}

/// List borrow requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Requests", body = Vec<RequestDetails>)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<RequestQuery>,
) -> AppResult<Json<ApiResponse<Vec<RequestDetails>>>> {
    claims.require(Permission::ViewRequest)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    query.page = Some(page);
    query.per_page = Some(per_page);
    let (requests, total) = state.services.requests.list(&query).await?;
    Ok(Json(ApiResponse::paginated(
        requests,
        Pagination::new(page, per_page, total),
    )))
}

/// Get a single borrow request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = Request),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Request>>> {
    claims.require(Permission::ViewRequest)?;

    let request = state.services.requests.get(id).await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// File a borrow request for an employee
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = Request),
        (status = 404, description = "Employee or equipment not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Request>>)> {
    claims.require(Permission::ViewRequest)?;
    request.validate()?;

    let created = state
        .services
        .requests
        .create(claims.user_id, &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, "Request created")),
    ))
}

/// Approve a pending request, opening a transaction
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Request approved", body = ApprovalResponse),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
pub async fn approve_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ApproveRequest>,
) -> AppResult<Json<ApiResponse<ApprovalResponse>>> {
    claims.require(Permission::ViewApprove)?;

    let (approved, transaction) = state
        .services
        .requests
        .approve(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(
        ApprovalResponse {
            request: approved,
            transaction,
        },
        "Request approved",
    )))
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = Request),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending"),
        (status = 422, description = "Missing rejection reason")
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<RejectRequest>,
) -> AppResult<Json<ApiResponse<Request>>> {
    claims.require(Permission::ViewApprove)?;
    request.validate()?;

    let rejected = state
        .services
        .requests
        .reject(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(rejected, "Request rejected")))
}

/// Cancel a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = Request),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Request>>> {
    claims.require(Permission::ViewRequest)?;

    let cancelled = state.services.requests.cancel(claims.user_id, id).await?;
    Ok(Json(ApiResponse::with_message(cancelled, "Request cancelled")))
}
