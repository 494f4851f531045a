//! Payment lifecycle rules: creation defaults, validation and status transitions.
//!
//! This is the only layer with business logic; persistence goes through the
//! injected `PaymentStore`.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{PaymentError, Result};
use crate::models::payment::{CreatePaymentRequest, NewPayment, Payment, PaymentStatus};
use crate::services::payment_store::PaymentStore;

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn PaymentStore>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Validates the candidate, defaults a missing or empty status to PENDING
    /// and stores it.
    pub async fn create(&self, request: CreatePaymentRequest) -> Result<Payment> {
        let new_payment = validate_new_payment(request)?;

        let payment = self.store.insert(new_payment).await?;
        tracing::info!(
            "Created payment {} for contract {} ({}, {})",
            payment.id,
            payment.contract_id,
            payment.amount,
            payment.status
        );

        Ok(payment)
    }

    pub async fn get_all(&self) -> Result<Vec<Payment>> {
        let payments = self.store.find_all().await?;
        tracing::debug!("Fetched {} payments", payments.len());
        Ok(payments)
    }

    pub async fn list_by_contract(&self, contract_id: &str) -> Result<Vec<Payment>> {
        let payments = self.store.find_by_contract(contract_id).await?;
        tracing::debug!(
            "Fetched {} payments for contract {}",
            payments.len(),
            contract_id
        );
        Ok(payments)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Moves a payment to `new_status`.
    ///
    /// An unknown token is rejected before any lookup. A missing id yields
    /// `Ok(None)` with no write. Terminal statuses only accept themselves.
    pub async fn update_status(&self, id: Uuid, new_status: &str) -> Result<Option<Payment>> {
        let next = new_status
            .parse::<PaymentStatus>()
            .map_err(PaymentError::Validation)?;

        let Some(mut payment) = self.store.find_by_id(id).await? else {
            tracing::debug!("Payment {} not found, status update skipped", id);
            return Ok(None);
        };

        let current = payment.status;
        if !current.can_transition_to(next) {
            tracing::warn!("Rejected transition {} -> {} for payment {}", current, next, id);
            return Err(PaymentError::InvalidTransition {
                id,
                from: current,
                to: next,
            });
        }

        payment.status = next;
        let updated = self.store.update(payment).await?;

        match &updated {
            Some(p) => tracing::info!("Payment {} status {} -> {}", id, current, p.status),
            None => tracing::debug!("Payment {} disappeared before status update", id),
        }

        Ok(updated)
    }

    /// Idempotent: deleting an unknown id succeeds.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let removed = self.store.delete_by_id(id).await?;
        if removed {
            tracing::info!("Deleted payment {}", id);
        } else {
            tracing::debug!("Delete of unknown payment {} ignored", id);
        }
        Ok(())
    }
}

fn validate_new_payment(request: CreatePaymentRequest) -> Result<NewPayment> {
    let contract_id = request
        .contract_id
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| PaymentError::validation("contractId is required"))?;

    let amount = request
        .amount
        .ok_or_else(|| PaymentError::validation("amount is required"))?;
    if amount < Decimal::ZERO {
        return Err(PaymentError::validation(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }

    let status = match request.status.as_deref().map(str::trim) {
        None | Some("") => PaymentStatus::Pending,
        Some(raw) => raw
            .parse::<PaymentStatus>()
            .map_err(PaymentError::Validation)?,
    };

    Ok(NewPayment {
        contract_id,
        amount,
        status,
        payment_method: request.payment_method,
        transaction_id: request.transaction_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::in_memory_store::InMemoryPaymentStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use sea_orm::DbErr;

    fn service() -> PaymentService {
        PaymentService::new(Arc::new(InMemoryPaymentStore::new()))
    }

    fn request(contract_id: &str, amount: Decimal) -> CreatePaymentRequest {
        CreatePaymentRequest {
            contract_id: Some(contract_id.to_string()),
            amount: Some(amount),
            ..Default::default()
        }
    }

    /// Store whose backend is always down
    struct UnavailableStore;

    #[async_trait]
    impl PaymentStore for UnavailableStore {
        async fn insert(&self, _payment: NewPayment) -> std::result::Result<Payment, DbErr> {
            Err(DbErr::Custom("connection refused".to_string()))
        }
        async fn update(&self, _payment: Payment) -> std::result::Result<Option<Payment>, DbErr> {
            Err(DbErr::Custom("connection refused".to_string()))
        }
        async fn find_by_id(&self, _id: Uuid) -> std::result::Result<Option<Payment>, DbErr> {
            Err(DbErr::Custom("connection refused".to_string()))
        }
        async fn find_all(&self) -> std::result::Result<Vec<Payment>, DbErr> {
            Err(DbErr::Custom("connection refused".to_string()))
        }
        async fn find_by_contract(
            &self,
            _contract_id: &str,
        ) -> std::result::Result<Vec<Payment>, DbErr> {
            Err(DbErr::Custom("connection refused".to_string()))
        }
        async fn delete_by_id(&self, _id: Uuid) -> std::result::Result<bool, DbErr> {
            Err(DbErr::Custom("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_defaults_status_to_pending() {
        let service = service();

        let payment = service.create(request("C1", dec!(100.00))).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        let mut blank = request("C1", dec!(5));
        blank.status = Some("".to_string());
        let payment = service.create(blank).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_preserves_given_status() {
        let service = service();
        let mut req = request("C1", dec!(100.00));
        req.status = Some("COMPLETED".to_string());
        req.payment_method = Some("bank_transfer".to_string());
        req.transaction_id = Some("tx-42".to_string());

        let payment = service.create(req).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.payment_method.as_deref(), Some("bank_transfer"));
        assert_eq!(payment.transaction_id.as_deref(), Some("tx-42"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service();

        let missing_contract = CreatePaymentRequest {
            amount: Some(dec!(1)),
            ..Default::default()
        };
        let blank_contract = request("   ", dec!(1));
        let missing_amount = CreatePaymentRequest {
            contract_id: Some("C1".to_string()),
            ..Default::default()
        };
        let negative = request("C1", dec!(-0.01));
        let mut bad_status = request("C1", dec!(1));
        bad_status.status = Some("REFUNDED".to_string());

        for req in [missing_contract, blank_contract, missing_amount, negative, bad_status] {
            let err = service.create(req).await.unwrap_err();
            assert!(matches!(err, PaymentError::Validation(_)), "got {:?}", err);
        }

        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_amount_is_allowed() {
        let payment = service().create(request("C1", Decimal::ZERO)).await.unwrap();
        assert_eq!(payment.amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_get_by_id_matches_created() {
        let service = service();
        let created = service.create(request("C1", dec!(42.50))).await.unwrap();

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
        assert!(service.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_empty() {
        assert!(service().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_to_failed() {
        let service = service();
        let created = service.create(request("C1", dec!(100.00))).await.unwrap();

        let updated = service
            .update_status(created.id, "FAILED")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, PaymentStatus::Failed);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.contract_id, created.contract_id);
        assert_eq!(updated.amount, created.amount);
    }

    #[tokio::test]
    async fn test_update_status_missing_id_has_no_effect() {
        let service = service();
        service.create(request("C1", dec!(1))).await.unwrap();
        let before = service.get_all().await.unwrap();

        let result = service.update_status(Uuid::new_v4(), "COMPLETED").await.unwrap();
        assert!(result.is_none());
        assert_eq!(service.get_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_token() {
        let service = service();
        let created = service.create(request("C1", dec!(1))).await.unwrap();

        let err = service.update_status(created.id, "SHIPPED").await.unwrap_err();
        assert!(matches!(err, PaymentError::Validation(_)));

        let unchanged = service.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn test_terminal_status_cannot_change() {
        let service = service();
        let created = service.create(request("C1", dec!(1))).await.unwrap();
        service.update_status(created.id, "COMPLETED").await.unwrap();

        let err = service.update_status(created.id, "FAILED").await.unwrap_err();
        assert!(matches!(
            err,
            PaymentError::InvalidTransition {
                from: PaymentStatus::Completed,
                to: PaymentStatus::Failed,
                ..
            }
        ));

        // Re-applying the same terminal status is allowed
        let again = service.update_status(created.id, "completed").await.unwrap();
        assert_eq!(again.map(|p| p.status), Some(PaymentStatus::Completed));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        let created = service.create(request("C1", dec!(1))).await.unwrap();

        service.delete(created.id).await.unwrap();
        service.delete(created.id).await.unwrap();
        service.delete(Uuid::new_v4()).await.unwrap();
        assert!(service.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_contract() {
        let service = service();
        service.create(request("C1", dec!(1))).await.unwrap();
        service.create(request("C2", dec!(2))).await.unwrap();

        let c2 = service.list_by_contract("C2").await.unwrap();
        assert_eq!(c2.len(), 1);
        assert_eq!(c2[0].amount, dec!(2));
    }

    #[tokio::test]
    async fn test_end_to_end_lifecycle() {
        let service = service();

        let created = service.create(request("C1", dec!(100.00))).await.unwrap();
        assert_eq!(created.status, PaymentStatus::Pending);

        let completed = service
            .update_status(created.id, "COMPLETED")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completed.status, PaymentStatus::Completed);

        service.delete(created.id).await.unwrap();
        assert!(service.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failures_propagate() {
        let service = PaymentService::new(Arc::new(UnavailableStore));

        assert!(matches!(
            service.create(request("C1", dec!(1))).await,
            Err(PaymentError::Storage(_))
        ));
        assert!(matches!(service.get_all().await, Err(PaymentError::Storage(_))));
        assert!(matches!(
            service.get_by_id(Uuid::new_v4()).await,
            Err(PaymentError::Storage(_))
        ));
        assert!(matches!(
            service.update_status(Uuid::new_v4(), "FAILED").await,
            Err(PaymentError::Storage(_))
        ));
        assert!(matches!(
            service.delete(Uuid::new_v4()).await,
            Err(PaymentError::Storage(_))
        ));
    }
}
