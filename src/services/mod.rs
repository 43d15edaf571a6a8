//! Business logic services

pub mod activity_logs;
pub mod employees;
pub mod equipment;
pub mod permissions;
pub mod requests;
pub mod transactions;
pub mod users;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    repository: Repository,
    pub users: users::UsersService,
    pub permissions: permissions::PermissionsService,
    pub employees: employees::EmployeesService,
    pub equipment: equipment::EquipmentService,
    pub requests: requests::RequestsService,
    pub transactions: transactions::TransactionsService,
    pub activity_logs: activity_logs::ActivityLogsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> AppResult<Self> {
        let activity_logs = activity_logs::ActivityLogsService::new(repository.clone());
        Ok(Self {
            users: users::UsersService::new(
                repository.clone(),
                auth_config,
                activity_logs.clone(),
            ),
            permissions: permissions::PermissionsService::new(
                repository.clone(),
                activity_logs.clone(),
            ),
            employees: employees::EmployeesService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(
                repository.clone(),
                activity_logs.clone(),
            ),
            requests: requests::RequestsService::new(repository.clone(), activity_logs.clone()),
            transactions: transactions::TransactionsService::new(
                repository.clone(),
                activity_logs.clone(),
            ),
            activity_logs,
            repository,
        })
    }

    /// Database handle, used by the readiness probe
    pub fn pool(&self) -> sqlx::Pool<sqlx::Postgres> {
        self.repository.pool.clone()
    }
}
