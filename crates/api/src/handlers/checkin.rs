//! Handler for the daily check-in.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;
use stride_core::error::CoreError;
use stride_core::streak::{check_in, CheckInOutcome};
use stride_core::types::DbId;
use stride_db::repositories::GoalRepo;

use crate::error::{AppError, AppResult, PolicyRejection};
use crate::extract::CallerOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for POST /goals/{id}/check-in.
#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub goal_id: DbId,
    pub checked_in_day: NaiveDate,
    pub streak_count: i32,
    pub streak_insurance_days: i32,
}

/// POST /api/v1/goals/{id}/check-in
///
/// Runs the pure streak engine against the goal's current state, then
/// persists through the compare-and-swap write. A CAS loss means a
/// concurrent check-in won the race; we re-read and re-run the engine
/// once, which normally surfaces `ALREADY_CHECKED_IN`.
pub async fn post_check_in(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let today = state.clock.today();

    let mut goal = GoalRepo::find_owned(&state.pool, goal_id, owner.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Goal",
            id: goal_id,
        })?;

    for attempt in 0..2 {
        let prior = goal.streak_state();
        let next = match check_in(&prior, today) {
            CheckInOutcome::Accepted(next) => next,
            CheckInOutcome::AlreadyCheckedIn => {
                return Err(AppError::Policy(PolicyRejection::AlreadyCheckedIn));
            }
            CheckInOutcome::ClockSkew => {
                return Err(AppError::Policy(PolicyRejection::ClockSkew));
            }
        };

        match GoalRepo::apply_check_in(&state.pool, goal.id, prior.last_checkin_day, &next).await? {
            Some(updated) => {
                tracing::info!(
                    goal_id,
                    owner_id = owner.id,
                    day = %today,
                    streak = updated.streak_count,
                    insurance = updated.streak_insurance_days,
                    "Check-in recorded"
                );
                return Ok(Json(DataResponse {
                    data: CheckInResponse {
                        goal_id,
                        checked_in_day: today.date(),
                        streak_count: updated.streak_count,
                        streak_insurance_days: updated.streak_insurance_days,
                    },
                }));
            }
            None => {
                tracing::debug!(goal_id, attempt, "Check-in CAS miss, re-reading");
                goal = GoalRepo::find_owned(&state.pool, goal_id, owner.id)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "Goal",
                        id: goal_id,
                    })?;
            }
        }
    }

    // Two CAS losses in a row: the concurrent writer(s) own this day.
    Err(AppError::Policy(PolicyRejection::AlreadyCheckedIn))
}
