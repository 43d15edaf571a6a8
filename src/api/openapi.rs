//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{activity_logs, auth, employees, equipment, health, requests, transactions, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EquipTrack API",
        version = "1.0.0",
        description = "Equipment Inventory & Request Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        auth::update_profile,
        auth::change_password,
        auth::logout,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::list_roles,
        // Permissions
        users::get_permissions,
        users::set_permissions,
        users::add_permission,
        users::remove_permission,
        users::reset_permissions,
        // Employees
        employees::list_employees,
        employees::current_holders,
        employees::get_employee,
        employees::create_employee,
        employees::update_employee,
        employees::delete_employee,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::add_stock,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_categories,
        equipment::create_category,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::approve_request,
        requests::reject_request,
        requests::cancel_request,
        // Transactions
        transactions::list_transactions,
        transactions::transaction_stats,
        transactions::approved_transactions,
        transactions::transaction_history,
        transactions::get_transaction,
        transactions::release_transaction,
        transactions::return_transaction,
        transactions::lost_transaction,
        transactions::damaged_transaction,
        // Activity logs
        activity_logs::list_logs,
        activity_logs::recent_logs,
        activity_logs::search_logs,
        activity_logs::create_log,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            crate::models::user::LoginRequest,
            crate::models::user::ChangePassword,
            crate::models::user::UpdateProfile,
            // Users
            crate::models::user::User,
            crate::models::user::UserDetails,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::role::Role,
            // Permissions
            crate::models::permission::UserPermission,
            crate::models::permission::SetPermissions,
            crate::models::permission::ModifyPermission,
            crate::models::permission::EffectivePermissions,
            // Employees
            crate::models::employee::Employee,
            crate::models::employee::EmployeeType,
            crate::models::employee::CreateEmployee,
            crate::models::employee::UpdateEmployee,
            crate::models::employee::CurrentHolder,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentDetails,
            crate::models::equipment::EquipmentStatus,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            // Requests
            crate::models::request::Request,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            crate::models::request::RequestMode,
            crate::models::request::CreateRequest,
            crate::models::request::ApproveRequest,
            crate::models::request::RejectRequest,
            requests::ApprovalResponse,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionDetails,
            crate::models::transaction::TransactionStatus,
            crate::models::transaction::TransactionStats,
            crate::models::transaction::ReleaseTransaction,
            crate::models::transaction::ReturnTransaction,
            crate::models::transaction::ResolveTransaction,
            // Activity logs
            crate::models::activity_log::ActivityLog,
            crate::models::activity_log::SubjectType,
            crate::models::activity_log::CreateActivityLog,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User account management"),
        (name = "permissions", description = "Per-user permission overrides"),
        (name = "employees", description = "Employee directory"),
        (name = "equipment", description = "Equipment inventory"),
        (name = "requests", description = "Borrow requests"),
        (name = "transactions", description = "Equipment transactions"),
        (name = "activity-logs", description = "Audit trail")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
