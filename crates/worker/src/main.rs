//! Cron-invoked delivery worker.
//!
//! Runs exactly one delivery cycle and exits. The scheduler (cron,
//! systemd timer, or a container job) owns the cadence; because the claim
//! inside the cycle is atomic and per-day idempotent, overlapping or
//! retried invocations are safe.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stride_core::civil::CivilClock;
use stride_delivery::{
    ContentGenerator, DisabledEmailTransport, EmailConfig, EmailTransport, FallbackGenerator,
    HttpContentGenerator, Orchestrator, SmtpEmailTransport,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stride_worker=debug,stride_delivery=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Delivery cycle failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let timezone =
        std::env::var("DELIVERY_TIMEZONE").unwrap_or_else(|_| "America/New_York".into());
    let boundary_hour: u32 = std::env::var("DAY_BOUNDARY_HOUR")
        .unwrap_or_else(|_| "3".into())
        .parse()?;
    let clock = CivilClock::new(&timezone, boundary_hour)?;
    tracing::info!(timezone, boundary_hour, "Civil clock configured");

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = stride_db::create_pool(&database_url).await?;
    stride_db::run_migrations(&pool).await?;

    let content: Arc<dyn ContentGenerator> = match HttpContentGenerator::from_env() {
        Some(generator) => Arc::new(generator),
        None => {
            tracing::warn!("CONTENT_API_URL not set; using static fallback content");
            Arc::new(FallbackGenerator)
        }
    };

    let mailer: Arc<dyn EmailTransport> = match EmailConfig::from_env() {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, "SMTP transport configured");
            Arc::new(SmtpEmailTransport::new(config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; deliveries will be recorded as send_failed");
            Arc::new(DisabledEmailTransport)
        }
    };

    let summary = Orchestrator::new(pool, clock, content, mailer)
        .run_cycle()
        .await?;

    tracing::info!(
        day = %summary.day,
        claimed = summary.claimed,
        sent = summary.sent,
        content_failed = summary.content_failed,
        send_failed = summary.send_failed,
        "Delivery cycle complete"
    );
    Ok(())
}
