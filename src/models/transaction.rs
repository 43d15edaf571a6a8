//! Transaction model: the release/return record created on approval

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::equipment::EquipmentStatus;
use super::request::RequestMode;

/// Transaction status lifecycle: `pending` until the equipment is handed
/// over, `released` while out, then one terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Released,
    Returned,
    Lost,
    Damaged,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Released => "released",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Lost => "lost",
            TransactionStatus::Damaged => "damaged",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Returned | TransactionStatus::Lost | TransactionStatus::Damaged
        )
    }

    /// Legal transitions. Terminal states admit none.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Released)
                | (
                    TransactionStatus::Released,
                    TransactionStatus::Returned
                        | TransactionStatus::Lost
                        | TransactionStatus::Damaged
                )
        )
    }

    /// Equipment status implied by entering this transaction state.
    /// Lost equipment is retired; damaged equipment goes to maintenance.
    pub fn equipment_status(&self) -> Option<EquipmentStatus> {
        match self {
            TransactionStatus::Pending => None,
            TransactionStatus::Released => Some(EquipmentStatus::InUse),
            TransactionStatus::Returned => Some(EquipmentStatus::Available),
            TransactionStatus::Lost => Some(EquipmentStatus::Retired),
            TransactionStatus::Damaged => Some(EquipmentStatus::Maintenance),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "released" => Ok(TransactionStatus::Released),
            "returned" => Ok(TransactionStatus::Returned),
            "lost" => Ok(TransactionStatus::Lost),
            "damaged" => Ok(TransactionStatus::Damaged),
            other => Err(format!("Invalid transaction status: {}", other)),
        }
    }
}

impl sqlx::Type<Postgres> for TransactionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for TransactionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for TransactionStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Operational record tracking physical release and return of equipment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub transaction_number: String,
    pub request_id: i32,
    pub equipment_id: i32,
    pub user_id: Option<i32>,
    pub employee_id: i32,
    pub status: TransactionStatus,
    pub request_mode: RequestMode,
    pub release_condition: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub release_notes: Option<String>,
    pub released_by: Option<i32>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub return_condition: Option<String>,
    pub return_date: Option<DateTime<Utc>>,
    pub return_notes: Option<String>,
    pub received_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Transaction with employee and equipment context, for lists
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TransactionDetails {
    pub id: i32,
    pub transaction_number: String,
    pub request_id: i32,
    pub equipment_id: i32,
    pub serial_number: String,
    pub brand: Option<String>,
    pub category_name: Option<String>,
    pub employee_id: i32,
    pub employee_name: String,
    pub status: TransactionStatus,
    pub request_mode: RequestMode,
    pub release_condition: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub return_condition: Option<String>,
    pub return_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Payload for marking equipment released
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReleaseTransaction {
    #[validate(length(min = 1, message = "Release condition is required"))]
    pub condition: String,
    pub notes: Option<String>,
    pub expected_return_date: Option<DateTime<Utc>>,
}

/// Payload for verifying a return
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReturnTransaction {
    #[validate(length(min = 1, message = "Return condition is required"))]
    pub condition: String,
    pub notes: Option<String>,
}

/// Payload for marking an exceptional outcome (lost/damaged)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResolveTransaction {
    pub notes: Option<String>,
}

/// Aggregate transaction counts
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TransactionStats {
    pub total: i64,
    pub pending: i64,
    pub released: i64,
    pub returned: i64,
    pub lost: i64,
    pub damaged: i64,
}

/// Transaction list query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionQuery {
    pub status: Option<String>,
    pub employee_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TransactionStatus; 5] = [
        TransactionStatus::Pending,
        TransactionStatus::Released,
        TransactionStatus::Returned,
        TransactionStatus::Lost,
        TransactionStatus::Damaged,
    ];

    #[test]
    fn pending_only_releases() {
        for to in ALL {
            assert_eq!(
                TransactionStatus::Pending.can_transition_to(to),
                to == TransactionStatus::Released
            );
        }
    }

    #[test]
    fn released_reaches_each_terminal_outcome() {
        assert!(TransactionStatus::Released.can_transition_to(TransactionStatus::Returned));
        assert!(TransactionStatus::Released.can_transition_to(TransactionStatus::Lost));
        assert!(TransactionStatus::Released.can_transition_to(TransactionStatus::Damaged));
        assert!(!TransactionStatus::Released.can_transition_to(TransactionStatus::Pending));
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for from in [
            TransactionStatus::Returned,
            TransactionStatus::Lost,
            TransactionStatus::Damaged,
        ] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn equipment_status_follows_transaction_state() {
        assert_eq!(
            TransactionStatus::Released.equipment_status(),
            Some(EquipmentStatus::InUse)
        );
        assert_eq!(
            TransactionStatus::Returned.equipment_status(),
            Some(EquipmentStatus::Available)
        );
        assert_eq!(
            TransactionStatus::Lost.equipment_status(),
            Some(EquipmentStatus::Retired)
        );
        assert_eq!(
            TransactionStatus::Damaged.equipment_status(),
            Some(EquipmentStatus::Maintenance)
        );
        assert_eq!(TransactionStatus::Pending.equipment_status(), None);
    }
}
