use std::sync::Arc;

use payment_service::{
    build_router,
    config::{AppConfig, StorageBackend},
    services::{
        in_memory_store::InMemoryPaymentStore,
        payment_service::PaymentService,
        payment_store::{PaymentStore, SeaOrmPaymentStore},
    },
    AppState,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,payment_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let store: Arc<dyn PaymentStore> = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set");

            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url)
                .await
                .expect("Failed to connect to database");

            if config.run_migrations {
                tracing::info!("Running migrations...");
                migration::Migrator::up(&db, None)
                    .await
                    .expect("Failed to run migrations");
            }

            Arc::new(SeaOrmPaymentStore::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory payment store; records are lost on restart");
            Arc::new(InMemoryPaymentStore::new())
        }
    };

    let state = AppState {
        payments: PaymentService::new(store),
    };

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(
        "Server listening on {}",
        listener.local_addr().expect("Listener has no local address")
    );

    axum::serve(listener, app).await.expect("Server error");
}
