use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stride_api::config::ServerConfig;
use stride_api::router::build_app_router;
use stride_api::state::AppState;
use stride_api::background;
use stride_delivery::{
    ContentGenerator, DisabledEmailTransport, EmailConfig, EmailTransport, FallbackGenerator,
    HttpContentGenerator, SmtpEmailTransport,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stride_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let clock = config
        .civil_clock()
        .expect("Invalid delivery timezone configuration");
    tracing::info!(
        timezone = %config.delivery_timezone,
        boundary_hour = config.day_boundary_hour,
        "Civil clock configured"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = stride_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    stride_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    stride_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Collaborators ---
    let content: Arc<dyn ContentGenerator> = match HttpContentGenerator::from_env() {
        Some(generator) => {
            tracing::info!("Content generation service configured");
            Arc::new(generator)
        }
        None => {
            tracing::warn!("CONTENT_API_URL not set; serving static fallback content only");
            Arc::new(FallbackGenerator)
        }
    };

    let mailer: Arc<dyn EmailTransport> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP transport configured");
            Arc::new(SmtpEmailTransport::new(email_config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; deliveries will be recorded as send_failed");
            Arc::new(DisabledEmailTransport)
        }
    };

    // --- Background tasks ---
    let cancel = tokio_util::sync::CancellationToken::new();
    let reconcile_handle = tokio::spawn(background::quota_reconciliation::run(
        pool.clone(),
        cancel.clone(),
    ));

    // --- App state / router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock,
        content,
        mailer,
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(config.host.parse().expect("Invalid HOST"), config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Drain background work.
    cancel.cancel();
    let _ = reconcile_handle.await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
