use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DbErr;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::payment::{NewPayment, Payment};
use crate::services::payment_store::{next_update_stamp, stamp_now, PaymentStore};

/// A thread-safe in-memory `PaymentStore`.
///
/// Each call takes the lock once, so writes are atomic per call. Nothing
/// survives a restart; used by tests and `STORAGE_BACKEND=memory`.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut payments: Vec<Payment>) -> Vec<Payment> {
    payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    payments
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, DbErr> {
        let now = stamp_now();
        let mut payments = self.payments.write().await;

        let mut id = Uuid::new_v4();
        while payments.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let stored = Payment {
            id,
            contract_id: payment.contract_id,
            amount: payment.amount,
            status: payment.status,
            payment_method: payment.payment_method,
            transaction_id: payment.transaction_id,
            created_at: now,
            updated_at: now,
        };
        payments.insert(id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, payment: Payment) -> Result<Option<Payment>, DbErr> {
        let mut payments = self.payments.write().await;

        let Some(existing) = payments.get_mut(&payment.id) else {
            return Ok(None);
        };

        existing.contract_id = payment.contract_id;
        existing.amount = payment.amount;
        existing.status = payment.status;
        existing.payment_method = payment.payment_method;
        existing.transaction_id = payment.transaction_id;
        existing.updated_at = next_update_stamp(existing.updated_at);

        Ok(Some(existing.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, DbErr> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Payment>, DbErr> {
        let payments = self.payments.read().await;
        Ok(sorted(payments.values().cloned().collect()))
    }

    async fn find_by_contract(&self, contract_id: &str) -> Result<Vec<Payment>, DbErr> {
        let payments = self.payments.read().await;
        Ok(sorted(
            payments
                .values()
                .filter(|p| p.contract_id == contract_id)
                .cloned()
                .collect(),
        ))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, DbErr> {
        let mut payments = self.payments.write().await;
        Ok(payments.remove(&id).is_some())
    }
}
