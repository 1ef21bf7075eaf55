//! Project Tracker server

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pt_api::AppState;
use pt_core::config::{AppConfig, ServerConfig, StoreBackend};
use pt_db::{Database, MemoryStore, PgStore};
use pt_files::{LocalStorage, Storage};
use pt_services::Tracker;

mod health;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        warn!("Failed to load config from env: {}, using defaults", e);
        AppConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.database.backend,
        "Starting Project Tracker"
    );

    let files: Arc<dyn Storage> = Arc::new(LocalStorage::new(
        &config.storage.upload_dir,
        config.storage.max_upload_size,
    ));
    let mut health_checker = HealthChecker::new(HealthConfig::default(), files.clone());

    let (tracker, database) = match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            let tracker = Tracker::new(Arc::new(MemoryStore::new()), files, &config.auth);
            (tracker, None)
        }
        StoreBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            info!("Connected to database");
            if config.database.migrate {
                db.migrate().await?;
            }
            health_checker = health_checker.with_database(db.clone());
            let tracker = Tracker::new(Arc::new(PgStore::new(db.clone())), files, &config.auth);
            (tracker, Some(db))
        }
    };

    let report = tracker.seed(&config.seed).await?;
    info!(
        document_types = report.document_types,
        users = report.users,
        "Seeding finished"
    );

    let app = build_router(
        AppState::new(Arc::new(tracker)),
        Arc::new(health_checker),
        &config.server,
    );

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,pt_server=debug,pt_api=debug,pt_services=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, server: &ServerConfig) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(pt_api::router(state))
        .layer(DefaultBodyLimit::max(server.max_body_size_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    server.request_timeout_seconds,
                )))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
