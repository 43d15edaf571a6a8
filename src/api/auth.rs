//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{ChangePassword, CreateUser, LoginRequest, UpdateProfile, UserDetails},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

/// Successful login payload
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDetails,
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    request.validate()?;

    let (token, user) = state
        .services
        .users
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(ApiResponse::with_message(
        LoginResponse { token, user },
        "Login successful",
    )))
}

/// Register a user account. Only admins may create accounts.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = UserDetails),
        (status = 403, description = "Not an administrator"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserDetails>>)> {
    claims.require_admin()?;
    request.validate()?;

    let user = state.services.users.create(claims.user_id, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "Account created")),
    ))
}

/// Current authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserDetails),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<UserDetails>>> {
    let user = state.services.users.me(claims.user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserDetails),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<UserDetails>>> {
    request.validate()?;

    let user = state
        .services
        .users
        .update_profile(claims.user_id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(user, "Profile updated")))
}

/// Change own password
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed"),
        (status = 422, description = "Current password incorrect or new password invalid")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ChangePassword>,
) -> AppResult<Json<ApiResponse<()>>> {
    request.validate()?;

    state
        .services
        .users
        .change_password(claims.user_id, &request)
        .await?;
    Ok(Json(ApiResponse::message("Password changed")))
}

/// Log out (records the event; token invalidation is client-side)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.users.logout(claims.user_id).await?;
    Ok(Json(ApiResponse::message("Logged out")))
}
