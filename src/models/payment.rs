//! Payment record types shared by the store, the lifecycle service and the API
//!
//! Status progresses: PENDING → COMPLETED
//!                            ↘ FAILED

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::payments;

/// Where a payment sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Recorded, outcome not yet known
    #[default]
    Pending,
    /// Settled successfully
    Completed,
    /// Did not go through
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    /// COMPLETED and FAILED are final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Pending may go anywhere; a terminal status only accepts itself again.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        !self.is_terminal() || *self == next
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

/// A persisted payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub contract_id: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated payment that has not been stored yet; the store assigns
/// `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub contract_id: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

/// Request body for POST /payments
///
/// Everything is optional at the wire level so that missing fields come back
/// as validation errors instead of JSON rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub contract_id: Option<String>,
    /// JSON number or string, read digit for digit (no f64 round trip)
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

/// Query parameters for PATCH /payments/{id}/status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusQuery {
    pub status: String,
}

/// Query parameters for GET /payments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    pub contract_id: Option<String>,
}

impl TryFrom<payments::Model> for Payment {
    type Error = DbErr;

    fn try_from(model: payments::Model) -> Result<Self, Self::Error> {
        let status = model.status.parse::<PaymentStatus>().map_err(|e| {
            DbErr::Type(format!("payment {} has invalid status: {}", model.id, e))
        })?;

        Ok(Self {
            id: model.id,
            contract_id: model.contract_id,
            amount: model.amount,
            status,
            payment_method: model.payment_method,
            transaction_id: model.transaction_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
