//! Employee directory

use crate::{
    error::{AppError, AppResult},
    models::employee::{CreateEmployee, Employee, EmployeeQuery, UpdateEmployee},
    repository::Repository,
};

#[derive(Clone)]
pub struct EmployeesService {
    repository: Repository,
}

impl EmployeesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EmployeeQuery) -> AppResult<(Vec<Employee>, i64)> {
        self.repository.employees.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Employee> {
        self.repository.employees.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEmployee) -> AppResult<Employee> {
        if self
            .repository
            .employees
            .email_exists(&data.email, None)
            .await?
        {
            return Err(AppError::Validation("Email is already taken".to_string()));
        }
        self.repository.employees.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateEmployee) -> AppResult<Employee> {
        if let Some(ref email) = data.email {
            if self
                .repository
                .employees
                .email_exists(email, Some(id))
                .await?
            {
                return Err(AppError::Validation("Email is already taken".to_string()));
            }
        }
        self.repository.employees.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.employees.delete(id).await
    }
}
