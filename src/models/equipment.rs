//! Equipment model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Serial numbers: alphanumeric with dashes, 3-64 chars
static SERIAL_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-]{2,63}$").expect("valid regex"));

pub fn validate_serial_number(serial: &str) -> Result<(), ValidationError> {
    if SERIAL_NUMBER_RE.is_match(serial) {
        Ok(())
    } else {
        Err(ValidationError::new("serial_number"))
    }
}

/// Equipment inventory status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Available,
    InUse,
    Maintenance,
    Retired,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::InUse => "in_use",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Retired => "retired",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(EquipmentStatus::Available),
            "in_use" => Ok(EquipmentStatus::InUse),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            "retired" => Ok(EquipmentStatus::Retired),
            other => Err(format!("Invalid equipment status: {}", other)),
        }
    }
}

impl sqlx::Type<Postgres> for EquipmentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for EquipmentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for EquipmentStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// An inventory item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub category_id: Option<i32>,
    pub serial_number: String,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    pub status: EquipmentStatus,
    pub item_image: Option<String>,
    pub receipt_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Equipment with its category name, for lists
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EquipmentDetails {
    pub id: i32,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub serial_number: String,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    pub status: EquipmentStatus,
    pub item_image: Option<String>,
    pub receipt_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    pub category_id: Option<i32>,
    #[validate(custom(function = "validate_serial_number", message = "Invalid serial number"))]
    pub serial_number: String,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    pub status: Option<EquipmentStatus>,
    pub item_image: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    pub category_id: Option<i32>,
    #[validate(custom(function = "validate_serial_number", message = "Invalid serial number"))]
    pub serial_number: Option<String>,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub purchase_price: Option<Decimal>,
    pub status: Option<EquipmentStatus>,
    pub item_image: Option<String>,
}

/// Parsed multipart payload for the add-stock operation: a batch of serial
/// numbers sharing category, brand, supplier and price, with an optional
/// receipt image
#[derive(Debug)]
pub struct AddStock {
    pub serial_numbers: Vec<String>,
    pub category_id: Option<i32>,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub description: Option<String>,
    pub purchase_price: Option<Decimal>,
    /// Stored filename of the uploaded receipt image
    pub receipt_image: Option<String>,
}

/// Equipment list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct EquipmentQuery {
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_number_format() {
        assert!(validate_serial_number("SN-2024-0001").is_ok());
        assert!(validate_serial_number("ABC123").is_ok());
        assert!(validate_serial_number("ab").is_err());
        assert!(validate_serial_number("-leading-dash").is_err());
        assert!(validate_serial_number("has spaces").is_err());
    }

    #[test]
    fn status_round_trip() {
        for status in [
            EquipmentStatus::Available,
            EquipmentStatus::InUse,
            EquipmentStatus::Maintenance,
            EquipmentStatus::Retired,
        ] {
            assert_eq!(status.as_str().parse::<EquipmentStatus>().unwrap(), status);
        }
        assert!("broken".parse::<EquipmentStatus>().is_err());
    }
}
