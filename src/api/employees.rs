//! Employee directory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        employee::{CreateEmployee, CurrentHolder, Employee, EmployeeQuery, UpdateEmployee},
        permission::Permission,
    },
    AppState,
};

use super::{page_params, ApiResponse, AuthenticatedUser, Pagination};

/// List employees
#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees", body = Vec<Employee>)
    )
)]
pub async fn list_employees(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<EmployeeQuery>,
) -> AppResult<Json<ApiResponse<Vec<Employee>>>> {
    claims.require(Permission::ViewRequest)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    query.page = Some(page);
    query.per_page = Some(per_page);
    let (employees, total) = state.services.employees.list(&query).await?;
    Ok(Json(ApiResponse::paginated(
        employees,
        Pagination::new(page, per_page, total),
    )))
}

/// Employees currently holding released equipment
#[utoipa::path(
    get,
    path = "/employees/current-holders",
    tag = "employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current holders", body = Vec<CurrentHolder>)
    )
)]
pub async fn current_holders(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<CurrentHolder>>>> {
    claims.require(Permission::ViewRequest)?;

    let holders = state.services.transactions.current_holders().await?;
    Ok(Json(ApiResponse::ok(holders)))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = Employee),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    claims.require(Permission::ViewRequest)?;

    let employee = state.services.employees.get(id).await?;
    Ok(Json(ApiResponse::ok(employee)))
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    security(("bearer_auth" = [])),
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<ApiResponse<Employee>>)> {
    claims.require(Permission::ControlPanel)?;
    request.validate()?;

    let employee = state.services.employees.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(employee, "Employee created")),
    ))
}

/// Update an employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateEmployee>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    claims.require(Permission::ControlPanel)?;
    request.validate()?;

    let employee = state.services.employees.update(id, &request).await?;
    Ok(Json(ApiResponse::with_message(employee, "Employee updated")))
}

/// Delete an employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employees",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    claims.require(Permission::ControlPanel)?;

    state.services.employees.delete(id).await?;
    Ok(Json(ApiResponse::message("Employee deleted")))
}
