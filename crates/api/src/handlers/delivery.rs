//! Handler for triggering the daily delivery cycle.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use stride_delivery::Orchestrator;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/internal/delivery/run
///
/// Runs one delivery cycle for the current civil day. Intended for
/// cron-over-HTTP invokers; retried or overlapping triggers are harmless
/// because the claim is atomic and idempotent per day. The gateway keeps
/// this path off the public surface.
pub async fn run_cycle(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let orchestrator = Orchestrator::new(
        state.pool.clone(),
        state.clock,
        Arc::clone(&state.content),
        Arc::clone(&state.mailer),
    );
    let summary = orchestrator.run_cycle().await?;
    Ok(Json(DataResponse { data: summary }))
}
