//! Handlers for goal CRUD.
//!
//! Thin wrappers over `GoalRepo`: validation, the creation-time goal quota
//! gate, and owner scoping. Streak and delivery fields are never writable
//! here.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_core::quota::QuotaPolicy;
use stride_core::types::{DbId, Tone};
use stride_db::models::goal::CreateGoal;
use stride_db::repositories::{DeliveryAttemptRepo, GoalRepo};
use validator::Validate;

use crate::error::{AppError, AppResult, PolicyRejection};
use crate::extract::CallerOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for POST /goals.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub tone: Tone,
    #[validate(range(min = 0, max = 23))]
    #[serde(default = "default_delivery_hour")]
    pub delivery_hour: i16,
}

fn default_delivery_hour() -> i16 {
    8
}

/// POST /api/v1/goals
///
/// Creates a goal after checking the owner's active-goal quota. The check
/// here is advisory under heavy concurrency; the periodic reconciliation
/// sweep restores the invariant either way.
pub async fn create_goal(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
    Json(input): Json<CreateGoalRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let policy = QuotaPolicy::for_tier(owner.effective_tier(Utc::now()));
    let active = GoalRepo::count_active(&state.pool, owner.id).await?;
    if active >= policy.max_active_goals {
        return Err(AppError::Policy(PolicyRejection::GoalLimitReached));
    }

    let goal = GoalRepo::create(
        &state.pool,
        owner.id,
        &CreateGoal {
            title: input.title,
            description: input.description,
            target_date: input.target_date,
            tone: input.tone,
            delivery_hour: input.delivery_hour,
        },
    )
    .await?;

    tracing::info!(goal_id = goal.id, owner_id = owner.id, "Goal created");
    Ok(Json(DataResponse { data: goal }))
}

/// GET /api/v1/goals
pub async fn list_goals(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let goals = GoalRepo::list_for_owner(&state.pool, owner.id).await?;
    Ok(Json(DataResponse { data: goals }))
}

/// GET /api/v1/goals/{id}
pub async fn get_goal(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let goal = GoalRepo::find_owned(&state.pool, goal_id, owner.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Goal",
            id: goal_id,
        })?;
    Ok(Json(DataResponse { data: goal }))
}

/// DELETE /api/v1/goals/{id}
///
/// Soft-delete: the row stays for audit, `is_active` flips off.
pub async fn delete_goal(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let goal = GoalRepo::deactivate(&state.pool, goal_id, owner.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Goal",
            id: goal_id,
        })?;

    tracing::info!(goal_id, owner_id = owner.id, "Goal deactivated");
    Ok(Json(DataResponse { data: goal }))
}

/// GET /api/v1/goals/{id}/deliveries
///
/// Attempt history for one goal, newest first. Diagnostic surface for
/// double-send investigations.
pub async fn list_deliveries(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
    Path(goal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    // Scope check before touching the audit table.
    GoalRepo::find_owned(&state.pool, goal_id, owner.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Goal",
            id: goal_id,
        })?;

    let attempts = DeliveryAttemptRepo::list_for_goal(&state.pool, goal_id).await?;
    Ok(Json(DataResponse { data: attempts }))
}
