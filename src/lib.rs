// src/lib.rs

use axum::{
    routing::{get, patch},
    Router,
};
use services::payment_service::PaymentService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub payments: PaymentService,
}

pub mod entities {
    pub mod prelude;
    pub mod payments;
}

pub mod services {
    pub mod in_memory_store;
    pub mod payment_service;
    pub mod payment_store;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

/// Routes for the payment API
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/payments",
            get(handlers::payment::list_payments).post(handlers::payment::create_payment),
        )
        .route(
            "/payments/{id}",
            get(handlers::payment::get_payment).delete(handlers::payment::delete_payment),
        )
        .route(
            "/payments/{id}/status",
            patch(handlers::payment::update_payment_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
