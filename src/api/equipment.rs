//! Equipment inventory endpoints, including batch stock intake

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CreateCategory},
        equipment::{
            AddStock, CreateEquipment, Equipment, EquipmentDetails, EquipmentQuery,
            UpdateEquipment,
        },
        permission::Permission,
    },
    AppState,
};

use super::{page_params, ApiResponse, AuthenticatedUser, Pagination};

/// List equipment with category names
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment", body = Vec<EquipmentDetails>)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<EquipmentQuery>,
) -> AppResult<Json<ApiResponse<Vec<EquipmentDetails>>>> {
    claims.require(Permission::EquipmentInventory)?;

    let (page, per_page) = page_params(query.page, query.per_page);
    query.page = Some(page);
    query.per_page = Some(per_page);
    let (equipment, total) = state.services.equipment.list(&query).await?;
    Ok(Json(ApiResponse::paginated(
        equipment,
        Pagination::new(page, per_page, total),
    )))
}

/// Get a single equipment item
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment item", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    claims.require(Permission::EquipmentInventory)?;

    let equipment = state.services.equipment.get(id).await?;
    Ok(Json(ApiResponse::ok(equipment)))
}

/// Create a single equipment item
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 409, description = "Serial number already exists"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<ApiResponse<Equipment>>)> {
    claims.require(Permission::AddStocks)?;
    request.validate()?;

    let equipment = state
        .services
        .equipment
        .create(claims.user_id, &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(equipment, "Equipment created")),
    ))
}

/// Register a batch of stock from a multipart form.
///
/// Expects repeated `serial_numbers[]` fields, optional scalar fields and
/// an optional `receipt_image` file which is written to the uploads
/// directory.
#[utoipa::path(
    post,
    path = "/equipment/add-stock",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Stock added", body = Vec<Equipment>),
        (status = 409, description = "A serial number already exists"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn add_stock(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<Equipment>>>)> {
    claims.require(Permission::AddStocks)?;

    let mut data = AddStock {
        serial_numbers: Vec::new(),
        category_id: None,
        brand: None,
        supplier: None,
        description: None,
        purchase_price: None,
        receipt_image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "serial_numbers" | "serial_numbers[]" => {
                let value = read_text(field).await?;
                if !value.trim().is_empty() {
                    data.serial_numbers.push(value.trim().to_string());
                }
            }
            "category_id" => {
                let value = read_text(field).await?;
                data.category_id = Some(value.parse().map_err(|_| {
                    AppError::Validation("category_id must be an integer".to_string())
                })?);
            }
            "brand" => data.brand = non_empty(read_text(field).await?),
            "supplier" => data.supplier = non_empty(read_text(field).await?),
            "description" => data.description = non_empty(read_text(field).await?),
            "purchase_price" => {
                let value = read_text(field).await?;
                data.purchase_price = Some(value.parse::<Decimal>().map_err(|_| {
                    AppError::Validation("purchase_price must be a number".to_string())
                })?);
            }
            "receipt_image" => {
                let original = field.file_name().unwrap_or("receipt").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read receipt image: {}", e))
                })?;
                if !bytes.is_empty() {
                    data.receipt_image =
                        Some(store_upload(&state, &original, &bytes).await?);
                }
            }
            _ => {}
        }
    }

    let items = state
        .services
        .equipment
        .add_stock(claims.user_id, &data)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(items, "Stock added")),
    ))
}

/// Update an equipment item
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Serial number already exists")
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateEquipment>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    claims.require(Permission::EquipmentInventory)?;
    request.validate()?;

    let equipment = state
        .services
        .equipment
        .update(claims.user_id, id, &request)
        .await?;
    Ok(Json(ApiResponse::with_message(equipment, "Equipment updated")))
}

/// Soft-delete an equipment item
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    claims.require(Permission::EquipmentInventory)?;

    state.services.equipment.delete(claims.user_id, id).await?;
    Ok(Json(ApiResponse::message("Equipment deleted")))
}

/// List equipment categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    claims.require(Permission::EquipmentInventory)?;

    let categories = state.services.equipment.list_categories().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// Create an equipment category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Category name already exists")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    claims.require(Permission::EquipmentInventory)?;
    request.validate()?;

    let category = state
        .services
        .equipment
        .create_category(claims.user_id, &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(category, "Category created")),
    ))
}

async fn read_text(field: axum_extra::extract::multipart::Field) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart field: {}", e)))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Write an uploaded file under the uploads directory with a generated
/// name, keeping the original extension.
async fn store_upload(state: &AppState, original: &str, bytes: &[u8]) -> AppResult<String> {
    let extension = std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let filename = format!("{}.{}", Uuid::new_v4(), extension);

    let dir = std::path::Path::new(&state.config.uploads.dir);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create uploads directory: {}", e)))?;
    tokio::fs::write(dir.join(&filename), bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

    Ok(filename)
}
