use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutorhub_api::config::{ServerConfig, StorageBackend};
use tutorhub_api::router::build_app_router;
use tutorhub_api::state::AppState;
use tutorhub_core::gateway::PersistenceGateway;
use tutorhub_db::gateway::{MemoryGateway, PgGateway};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorhub_api=debug,tutorhub_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        wizard_session_ttl_mins = config.wizard_session_ttl_mins,
        "Loaded server configuration"
    );

    let gateway = connect_storage(&config.storage).await;
    let state = AppState::new(gateway, config.clone());
    let app = build_app_router(state.clone(), &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!(
        abandoned_wizard_sessions = state.wizards.len().await,
        "Server stopped"
    );
}

/// Open the configured store. Postgres is checked and migrated before the
/// server accepts traffic; any failure aborts startup.
async fn connect_storage(storage: &StorageBackend) -> Arc<dyn PersistenceGateway> {
    match storage {
        StorageBackend::Postgres { database_url } => {
            let pool = tutorhub_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tutorhub_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tutorhub_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("PostgreSQL ready, migrations applied");
            Arc::new(PgGateway::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryGateway::new())
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.expect("Failed to install Ctrl-C handler");
                tracing::info!("SIGINT received, shutting down");
            }
            _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!("Ctrl-C received, shutting down");
    }
}
