//! User administration and permission management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        permission::{EffectivePermissions, ModifyPermission, Permission, SetPermissions},
        role::Role,
        user::{CreateUser, UpdateUser, UserDetails, UserQuery},
    },
    AppState,
};

use super::{page_params, ApiResponse, AuthenticatedUser, Pagination};

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Users", body = Vec<UserDetails>),
        (status = 403, description = "Missing control_panel permission")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserDetails>>>> {
    claims.require(Permission::ControlPanel)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    query.page = Some(page);
    query.per_page = Some(per_page);
    let (users, total) = state.services.users.list(&query).await?;
    Ok(Json(ApiResponse::paginated(
        users,
        Pagination::new(page, per_page, total),
    )))
}

/// Get a single user account
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserDetails),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<UserDetails>>> {
    claims.require(Permission::ControlPanel)?;

    let user = state.services.users.get(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserDetails),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserDetails>>)> {
    claims.require(Permission::ControlPanel)?;
    request.validate()?;

    let user = state.services.users.create(claims.user_id, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User created")),
    ))
}

/// Update a user account
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserDetails),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<ApiResponse<UserDetails>>> {
    claims.require(Permission::ControlPanel)?;
    request.validate()?;

    let user = state
        .services
        .users
        .update(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(user, "User updated")))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    claims.require(Permission::ControlPanel)?;

    state.services.users.delete(claims.user_id, id).await?;
    Ok(Json(ApiResponse::message("User deleted")))
}

/// List available roles
#[utoipa::path(
    get,
    path = "/roles",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Roles", body = Vec<Role>)
    )
)]
pub async fn list_roles(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Role>>>> {
    claims.require(Permission::ControlPanel)?;

    let roles = state.services.users.list_roles().await?;
    Ok(Json(ApiResponse::ok(roles)))
}

// --------------------------------------------------------------------------
// Permission overrides. These re-check the actor's rights against the
// database inside the service, not just the token snapshot.
// --------------------------------------------------------------------------

/// Effective permissions of a user
#[utoipa::path(
    get,
    path = "/users/{id}/permissions",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Effective permissions", body = EffectivePermissions),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<EffectivePermissions>>> {
    state.services.permissions.require_manager(claims.user_id).await?;

    let permissions = state.services.permissions.get(id).await?;
    Ok(Json(ApiResponse::ok(permissions)))
}

/// Replace a user's custom permission set
#[utoipa::path(
    put,
    path = "/users/{id}/permissions",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetPermissions,
    responses(
        (status = 200, description = "Permissions updated", body = EffectivePermissions),
        (status = 403, description = "Not allowed to manage permissions"),
        (status = 422, description = "Unknown permission name")
    )
)]
pub async fn set_permissions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<SetPermissions>,
) -> AppResult<Json<ApiResponse<EffectivePermissions>>> {
    let permissions = state
        .services
        .permissions
        .set(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(permissions, "Permissions updated")))
}

/// Grant one permission to a user
#[utoipa::path(
    post,
    path = "/users/{id}/permissions/add",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = ModifyPermission,
    responses(
        (status = 200, description = "Permission granted", body = EffectivePermissions),
        (status = 422, description = "Unknown permission name")
    )
)]
pub async fn add_permission(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ModifyPermission>,
) -> AppResult<Json<ApiResponse<EffectivePermissions>>> {
    let permissions = state
        .services
        .permissions
        .add(claims.user_id, id, &request.permission)
        .await?;
    Ok(Json(ApiResponse::with_message(permissions, "Permission granted")))
}

/// Revoke one permission from a user's custom set
#[utoipa::path(
    post,
    path = "/users/{id}/permissions/remove",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = ModifyPermission,
    responses(
        (status = 200, description = "Permission revoked", body = EffectivePermissions),
        (status = 422, description = "Unknown permission name")
    )
)]
pub async fn remove_permission(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ModifyPermission>,
) -> AppResult<Json<ApiResponse<EffectivePermissions>>> {
    let permissions = state
        .services
        .permissions
        .remove(claims.user_id, id, &request.permission)
        .await?;
    Ok(Json(ApiResponse::with_message(permissions, "Permission revoked")))
}

/// Reset a user to their role's permissions
#[utoipa::path(
    post,
    path = "/users/{id}/permissions/reset",
    tag = "permissions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Reset to role permissions", body = EffectivePermissions)
    )
)]
pub async fn reset_permissions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<EffectivePermissions>>> {
    let permissions = state
        .services
        .permissions
        .reset(claims.user_id, id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        permissions,
        "Reset to role permissions",
    )))
}
