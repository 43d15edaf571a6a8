//! Activity log model: append-only audit trail entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// The entity kinds an activity log entry may reference. A closed enum so
/// adding a loggable kind is a compile-time concern, not a stringly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    User,
    Role,
    Category,
    Employee,
    Equipment,
    Request,
    Transaction,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::User => "user",
            SubjectType::Role => "role",
            SubjectType::Category => "category",
            SubjectType::Employee => "employee",
            SubjectType::Equipment => "equipment",
            SubjectType::Request => "request",
            SubjectType::Transaction => "transaction",
        }
    }
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(SubjectType::User),
            "role" => Ok(SubjectType::Role),
            "category" => Ok(SubjectType::Category),
            "employee" => Ok(SubjectType::Employee),
            "equipment" => Ok(SubjectType::Equipment),
            "request" => Ok(SubjectType::Request),
            "transaction" => Ok(SubjectType::Transaction),
            other => Err(format!("Invalid model type: {}", other)),
        }
    }
}

impl sqlx::Type<Postgres> for SubjectType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for SubjectType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for SubjectType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Audit trail entry. `user_id` survives user deletion as NULL.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: i32,
    pub user_id: Option<i32>,
    pub user_name: Option<String>,
    pub action: String,
    pub description: String,
    pub model_type: Option<SubjectType>,
    pub model_id: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub old_values: Option<sqlx::types::Json<serde_json::Value>>,
    #[schema(value_type = Option<Object>)]
    pub new_values: Option<sqlx::types::Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
}

/// Create activity log request (explicit API entry)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityLog {
    #[validate(length(min = 1, max = 255, message = "Action is required"))]
    pub action: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub model_type: Option<SubjectType>,
    pub model_id: Option<i32>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
}

/// Activity log list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivityLogQuery {
    pub user_id: Option<i32>,
    pub model_type: Option<String>,
    pub model_id: Option<i32>,
    /// Look-back window in days (default 30)
    pub days: Option<i64>,
    pub page: Option<i64>,
    /// Page size (default 15, clamped 1-100)
    pub per_page: Option<i64>,
}

/// Search query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivityLogSearch {
    pub q: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
