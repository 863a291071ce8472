//! OfficeOps RS Server
//!
//! Loads configuration, connects to PostgreSQL, wires the services and
//! serves the JSON API next to the stored evidence and visitor files.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use oo_api::{AppState, DisplayFormats};
use oo_auth::{Authenticator, JwtService};
use oo_core::config::{AppConfig, LogFormat, LoggingConfig};
use oo_core::time::SystemClock;
use oo_db::{Database, Stores};
use oo_evidence::LocalStorage;
use oo_services::ServiceContext;

mod health;

use health::{HealthChecker, HealthConfig, HealthState};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting {}",
        config.instance.app_title
    );
    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("auth.jwt_secret is the built-in default; set JWT_SECRET");
    }

    let db = Database::connect(&config.database).await?;
    info!("Connected to database");
    if config.database.run_migrations {
        db.migrate().await?;
    }

    let storage = Arc::new(LocalStorage::new(
        &config.storage.local_path,
        config.storage.public_base_url.clone(),
    ));
    let services = ServiceContext::from_config(
        &config,
        Stores::postgres(db.pool().clone()),
        storage,
        Arc::new(SystemClock),
    )?;
    let state = AppState::new(services, authenticator(&config))
        .with_display(DisplayFormats::from(&config.instance));

    let health = Arc::new(
        HealthChecker::new(HealthConfig::default())
            .with_database(db.clone())
            .with_storage_root(&config.storage.local_path),
    );

    let app = build_router(state, health, &config);

    let addr = config.server_addr();
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Plain => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

fn authenticator(config: &AppConfig) -> Authenticator {
    let mut jwt = JwtService::new(config.auth.jwt_secret.as_bytes());
    if let Some(ref issuer) = config.auth.issuer {
        jwt = jwt.with_issuer(issuer.clone());
    }
    Authenticator::new(jwt)
}

/// Build the application router
fn build_router(state: AppState, health: HealthState, config: &AppConfig) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::health))
        .with_state(health);

    let mut app = Router::new()
        .merge(health_routes)
        .merge(oo_api::router().with_state(state));

    // Stored files are public under their relative URL prefix
    let public_url = config.storage.public_base_url.trim_end_matches('/');
    if public_url.starts_with('/') && public_url.len() > 1 {
        app = app.nest_service(public_url, ServeDir::new(&config.storage.local_path));
    }

    app.layer(DefaultBodyLimit::max(config.server.max_body_size_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_seconds,
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

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
