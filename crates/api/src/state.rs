use std::sync::Arc;

use stride_core::civil::CivilClock;
use stride_delivery::{ContentGenerator, EmailTransport};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stride_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Civil-day clock for the product's reference timezone.
    pub clock: CivilClock,
    /// Motivational content collaborator.
    pub content: Arc<dyn ContentGenerator>,
    /// Outbound email collaborator.
    pub mailer: Arc<dyn EmailTransport>,
}
