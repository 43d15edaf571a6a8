//! Employee model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Employee classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EmployeeType {
    Regular,
    Contractor,
    Temporary,
}

impl EmployeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeType::Regular => "Regular",
            EmployeeType::Contractor => "Contractor",
            EmployeeType::Temporary => "Temporary",
        }
    }
}

impl std::fmt::Display for EmployeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EmployeeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Regular" => Ok(EmployeeType::Regular),
            "Contractor" => Ok(EmployeeType::Contractor),
            "Temporary" => Ok(EmployeeType::Temporary),
            other => Err(format!("Invalid employee type: {}", other)),
        }
    }
}

impl sqlx::Type<Postgres> for EmployeeType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for EmployeeType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for EmployeeType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// A person eligible to request equipment, distinct from a login account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub employee_type: EmployeeType,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create employee request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployee {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub employee_type: EmployeeType,
    pub phone: Option<String>,
}

/// Update employee request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub employee_type: Option<EmployeeType>,
    pub phone: Option<String>,
}

/// Employee list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub employee_type: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// An employee currently holding released equipment
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CurrentHolder {
    pub employee_id: i32,
    pub employee_name: String,
    pub transaction_id: i32,
    pub transaction_number: String,
    pub equipment_id: i32,
    pub serial_number: String,
    pub brand: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub expected_return_date: Option<DateTime<Utc>>,
}
