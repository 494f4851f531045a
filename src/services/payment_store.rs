//! Persistence contract for payment records and its PostgreSQL implementation

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{payments, prelude::*};
use crate::models::payment::{NewPayment, Payment};

/// Keyed storage for payment records.
///
/// Every call is a single self-contained operation; implementations must make
/// each `insert`, `update` and `delete_by_id` atomic with respect to
/// concurrent calls on the same id. Listings are ordered by `created_at`,
/// then `id`.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Assigns a fresh id and stamps `created_at` = `updated_at`.
    async fn insert(&self, payment: NewPayment) -> Result<Payment, DbErr>;

    /// Overwrites the mutable fields of an existing record and re-stamps
    /// `updated_at`. Returns `None` if no record has this id.
    async fn update(&self, payment: Payment) -> Result<Option<Payment>, DbErr>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, DbErr>;

    async fn find_all(&self) -> Result<Vec<Payment>, DbErr>;

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Payment>, DbErr>;

    /// Returns whether a record was removed. Missing ids are not an error.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DbErr>;
}

/// Current time at the precision PostgreSQL `timestamptz` keeps (microseconds)
pub(crate) fn stamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next `updated_at` for a record last stamped at `previous`; always strictly later.
pub(crate) fn next_update_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = stamp_now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// `PaymentStore` backed by the `payments` table
pub struct SeaOrmPaymentStore {
    db: DatabaseConnection,
}

impl SeaOrmPaymentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_payments(models: Vec<payments::Model>) -> Result<Vec<Payment>, DbErr> {
    models.into_iter().map(Payment::try_from).collect()
}

#[async_trait]
impl PaymentStore for SeaOrmPaymentStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, DbErr> {
        let now = stamp_now();

        let model = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            contract_id: Set(payment.contract_id),
            amount: Set(payment.amount),
            status: Set(payment.status.to_string()),
            payment_method: Set(payment.payment_method),
            transaction_id: Set(payment.transaction_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        Payment::try_from(model)
    }

    async fn update(&self, payment: Payment) -> Result<Option<Payment>, DbErr> {
        let stamp = next_update_stamp(payment.updated_at);

        let active_model = payments::ActiveModel {
            id: Unchanged(payment.id),
            contract_id: Set(payment.contract_id),
            amount: Set(payment.amount),
            status: Set(payment.status.to_string()),
            payment_method: Set(payment.payment_method),
            transaction_id: Set(payment.transaction_id),
            created_at: NotSet,
            updated_at: Set(stamp.into()),
        };

        match active_model.update(&self.db).await {
            Ok(model) => Ok(Some(Payment::try_from(model)?)),
            // Row deleted between lookup and write
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, DbErr> {
        Payments::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Payment>, DbErr> {
        let models = Payments::find()
            .order_by_asc(payments::Column::CreatedAt)
            .order_by_asc(payments::Column::Id)
            .all(&self.db)
            .await?;

        into_payments(models)
    }

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Payment>, DbErr> {
        let models = Payments::find()
            .filter(payments::Column::ContractId.eq(contract_id))
            .order_by_asc(payments::Column::CreatedAt)
            .order_by_asc(payments::Column::Id)
            .all(&self.db)
            .await?;

        into_payments(models)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Payments::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
