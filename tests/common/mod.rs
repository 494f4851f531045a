#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use axum::Router;
use payment_service::{
    build_router, services::in_memory_store::InMemoryPaymentStore,
    services::payment_service::PaymentService, AppState,
};
use sea_orm::{Database, DatabaseConnection, DbErr};

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://payments_user@localhost:5432/payments_test".to_string()
    });

    Database::connect(&database_url).await
}

/// Router backed by a fresh in-memory store
pub fn build_test_router() -> Router {
    let state = AppState {
        payments: PaymentService::new(Arc::new(InMemoryPaymentStore::new())),
    };
    build_router(state)
}
