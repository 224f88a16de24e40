//! Handler for on-demand motivational nudges.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use stride_core::quota::QuotaPolicy;
use stride_core::types::Tone;
use stride_db::repositories::{GoalRepo, NudgeRepo};
use stride_delivery::content::{fallback_content, ContentRequest};

use crate::error::{AppError, AppResult, PolicyRejection};
use crate::extract::CallerOwner;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for POST /nudges.
#[derive(Debug, Serialize)]
pub struct NudgeResponse {
    pub nudges_used: i32,
    pub nudges_allowed: i32,
    pub message: String,
}

/// POST /api/v1/nudges
///
/// Consumes one of the owner's daily nudge slots (single atomic
/// read-check-increment against the counter row), then generates and sends
/// a message immediately. The quota decision is the contract; the send
/// itself is fire-and-forget and its failure does not refund the slot.
pub async fn post_nudge(
    CallerOwner(owner): CallerOwner,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let today = state.clock.today();
    let policy = QuotaPolicy::for_tier(owner.effective_tier(Utc::now()));

    let used = NudgeRepo::try_increment(&state.pool, owner.id, today, policy.max_daily_nudges)
        .await?
        .ok_or(AppError::Policy(PolicyRejection::NudgeLimitReached))?;

    // Anchor the message on the owner's oldest active goal when one
    // exists; a goalless owner still gets (and pays for) a generic nudge.
    let anchor = GoalRepo::list_for_owner(&state.pool, owner.id)
        .await?
        .into_iter()
        .find(|g| g.is_active);

    let request = match &anchor {
        Some(goal) => ContentRequest {
            goal_title: goal.title.clone(),
            goal_description: goal.description.clone(),
            tone: goal.tone(),
            streak_count: goal.streak_count,
            target_date: goal.target_date,
        },
        None => ContentRequest {
            goal_title: "your next goal".to_string(),
            goal_description: None,
            tone: Tone::Encouraging,
            streak_count: 0,
            target_date: None,
        },
    };

    let content = match state.content.generate(&request).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(owner_id = owner.id, error = %e, "Nudge content generation failed, using fallback");
            fallback_content(&request.goal_title, request.streak_count)
        }
    };

    if let Some(email) = &owner.email {
        let subject = format!("A nudge for you: {}", request.goal_title);
        if let Err(e) = state.mailer.send(email, &subject, &content.message).await {
            tracing::warn!(owner_id = owner.id, error = %e, "Nudge email send failed");
        }
    }

    tracing::info!(
        owner_id = owner.id,
        day = %today,
        used,
        allowed = policy.max_daily_nudges,
        "Nudge accepted"
    );

    Ok(Json(DataResponse {
        data: NudgeResponse {
            nudges_used: used,
            nudges_allowed: policy.max_daily_nudges,
            message: content.message,
        },
    }))
}
