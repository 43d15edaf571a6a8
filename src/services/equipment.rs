//! Equipment inventory management

use crate::{
    error::{AppError, AppResult},
    models::{
        activity_log::SubjectType,
        category::{Category, CreateCategory},
        equipment::{
            AddStock, CreateEquipment, Equipment, EquipmentDetails, EquipmentQuery,
            UpdateEquipment,
        },
    },
    repository::Repository,
};

use super::activity_logs::ActivityLogsService;

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    logs: ActivityLogsService,
}

impl EquipmentService {
    pub fn new(repository: Repository, logs: ActivityLogsService) -> Self {
        Self { repository, logs }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<(Vec<EquipmentDetails>, i64)> {
        self.repository.equipment.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, actor_id: i32, data: &CreateEquipment) -> AppResult<Equipment> {
        if let Some(category_id) = data.category_id {
            self.require_category(category_id).await?;
        }
        if self
            .repository
            .equipment
            .serial_exists(&data.serial_number, None)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Serial number {} already exists",
                data.serial_number
            )));
        }

        let equipment = self.repository.equipment.create(data).await?;

        self.logs
            .record(
                Some(actor_id),
                "Created equipment",
                format!("Added equipment {} to the inventory", equipment.serial_number),
                Some((SubjectType::Equipment, equipment.id)),
                None,
                None,
            )
            .await;

        Ok(equipment)
    }

    /// Register a batch of serial numbers as new stock. Every serial is
    /// checked up front so a duplicate rejects the whole batch.
    pub async fn add_stock(&self, actor_id: i32, data: &AddStock) -> AppResult<Vec<Equipment>> {
        if data.serial_numbers.is_empty() {
            return Err(AppError::Validation(
                "At least one serial number is required".to_string(),
            ));
        }
        for serial in &data.serial_numbers {
            if crate::models::equipment::validate_serial_number(serial).is_err() {
                return Err(AppError::Validation(format!(
                    "Invalid serial number: {}",
                    serial
                )));
            }
        }
        if let Some(category_id) = data.category_id {
            self.require_category(category_id).await?;
        }

        let items = self.repository.equipment.add_stock(data).await?;

        self.logs
            .record(
                Some(actor_id),
                "Added stock",
                format!(
                    "Added {} unit(s) of stock: {}",
                    items.len(),
                    data.serial_numbers.join(", ")
                ),
                None,
                None,
                None,
            )
            .await;

        Ok(items)
    }

    pub async fn update(&self, actor_id: i32, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        if let Some(category_id) = data.category_id {
            self.require_category(category_id).await?;
        }
        if let Some(ref serial) = data.serial_number {
            if self
                .repository
                .equipment
                .serial_exists(serial, Some(id))
                .await?
            {
                return Err(AppError::Conflict(format!(
                    "Serial number {} already exists",
                    serial
                )));
            }
        }

        let before = self.repository.equipment.get_by_id(id).await?;
        let equipment = self.repository.equipment.update(id, data).await?;

        self.logs
            .record(
                Some(actor_id),
                "Updated equipment",
                format!("Updated equipment {}", equipment.serial_number),
                Some((SubjectType::Equipment, equipment.id)),
                Some(serde_json::json!({
                    "serial_number": before.serial_number,
                    "status": before.status,
                })),
                Some(serde_json::json!({
                    "serial_number": equipment.serial_number,
                    "status": equipment.status,
                })),
            )
            .await;

        Ok(equipment)
    }

    pub async fn delete(&self, actor_id: i32, id: i32) -> AppResult<()> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        self.repository.equipment.delete(id).await?;

        self.logs
            .record(
                Some(actor_id),
                "Deleted equipment",
                format!("Removed equipment {} from the inventory", equipment.serial_number),
                Some((SubjectType::Equipment, equipment.id)),
                None,
                None,
            )
            .await;

        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.equipment.list_categories().await
    }

    pub async fn create_category(&self, actor_id: i32, data: &CreateCategory) -> AppResult<Category> {
        let category = self.repository.equipment.create_category(data).await?;

        self.logs
            .record(
                Some(actor_id),
                "Created category",
                format!("Created equipment category {}", category.name),
                Some((SubjectType::Category, category.id)),
                None,
                None,
            )
            .await;

        Ok(category)
    }

    async fn require_category(&self, category_id: i32) -> AppResult<()> {
        let categories = self.repository.equipment.list_categories().await?;
        if categories.iter().any(|c| c.id == category_id) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Category {} does not exist",
                category_id
            )))
        }
    }
}
