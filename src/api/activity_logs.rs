//! Activity log endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        activity_log::{ActivityLog, ActivityLogQuery, ActivityLogSearch, CreateActivityLog},
        permission::Permission,
    },
    AppState,
};

use super::{page_params, ApiResponse, AuthenticatedUser, Pagination};

/// List activity within a look-back window (30 days by default)
#[utoipa::path(
    get,
    path = "/activity-logs",
    tag = "activity-logs",
    security(("bearer_auth" = [])),
    params(ActivityLogQuery),
    responses(
        (status = 200, description = "Activity logs", body = Vec<ActivityLog>),
        (status = 403, description = "Missing activity_logs permission")
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<ActivityLogQuery>,
) -> AppResult<Json<ApiResponse<Vec<ActivityLog>>>> {
    claims.require(Permission::ActivityLogs)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    query.page = Some(page);
    query.per_page = Some(per_page);
    let (logs, total) = state.services.activity_logs.list(&query).await?;
    Ok(Json(ApiResponse::paginated(
        logs,
        Pagination::new(page, per_page, total),
    )))
}

/// Most recent activity, a fixed short window for dashboards
#[utoipa::path(
    get,
    path = "/activity-logs/recent",
    tag = "activity-logs",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recent activity", body = Vec<ActivityLog>)
    )
)]
pub async fn recent_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<ActivityLog>>>> {
    claims.require(Permission::Dashboard)?;

    let query = ActivityLogQuery {
        user_id: None,
        model_type: None,
        model_id: None,
        days: Some(7),
        page: Some(1),
        per_page: Some(10),
    };
    let (logs, _) = state.services.activity_logs.list(&query).await?;
    Ok(Json(ApiResponse::ok(logs)))
}

/// Full-text search over action and description
#[utoipa::path(
    get,
    path = "/activity-logs/search",
    tag = "activity-logs",
    security(("bearer_auth" = [])),
    params(ActivityLogSearch),
    responses(
        (status = 200, description = "Matching logs", body = Vec<ActivityLog>)
    )
)]
pub async fn search_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ActivityLogSearch>,
) -> AppResult<Json<ApiResponse<Vec<ActivityLog>>>> {
    claims.require(Permission::ActivityLogs)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    let (logs, total) = state
        .services
        .activity_logs
        .search(&query.q, page, per_page)
        .await?;
    Ok(Json(ApiResponse::paginated(
        logs,
        Pagination::new(page, per_page, total),
    )))
}

/// Record an explicit log entry
#[utoipa::path(
    post,
    path = "/activity-logs",
    tag = "activity-logs",
    security(("bearer_auth" = [])),
    request_body = CreateActivityLog,
    responses(
        (status = 201, description = "Log entry created", body = ActivityLog),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_log(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateActivityLog>,
) -> AppResult<(StatusCode, Json<ApiResponse<ActivityLog>>)> {
    claims.require(Permission::ActivityLogs)?;
    request.validate()?;

    let log = state
        .services
        .activity_logs
        .create(Some(claims.user_id), &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(log, "Log entry created")),
    ))
}
