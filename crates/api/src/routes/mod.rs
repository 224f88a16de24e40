pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /goals                       create (POST), list (GET)
/// /goals/{id}                  get (GET), soft-delete (DELETE)
/// /goals/{id}/check-in         daily check-in (POST)
/// /goals/{id}/deliveries       delivery attempt history (GET)
/// /nudges                      on-demand nudge (POST, quota-gated)
/// /internal/delivery/run       trigger one delivery cycle (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/goals",
            post(handlers::goals::create_goal).get(handlers::goals::list_goals),
        )
        .route(
            "/goals/{id}",
            get(handlers::goals::get_goal).delete(handlers::goals::delete_goal),
        )
        .route("/goals/{id}/check-in", post(handlers::checkin::post_check_in))
        .route("/goals/{id}/deliveries", get(handlers::goals::list_deliveries))
        .route("/nudges", post(handlers::nudges::post_nudge))
        .route("/internal/delivery/run", post(handlers::delivery::run_cycle))
}
