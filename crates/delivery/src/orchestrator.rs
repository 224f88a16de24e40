//! The daily delivery cycle.
//!
//! One cycle: derive today's civil day, atomically claim every due goal,
//! then work through the claimed set calling the content and email
//! collaborators and recording one audit row per goal.
//!
//! The claim is committed before any external call, so a crash or send
//! failure can lose at most one day's message per goal and can never
//! duplicate one (at-most-once). No store lock is ever held across a
//! collaborator call.

use std::sync::Arc;

use stride_core::civil::{CivilClock, CivilDay};
use stride_db::models::delivery::DeliveryOutcome;
use stride_db::models::goal::Goal;
use stride_db::repositories::{DeliveryAttemptRepo, GoalRepo, OwnerRepo};
use stride_db::DbPool;

use crate::content::{fallback_content, ContentGenerator, ContentRequest, MotivationContent};
use crate::email::{EmailError, EmailTransport};

/// Counters from one delivery cycle, for the trigger's log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CycleSummary {
    pub day: CivilDay,
    pub claimed: usize,
    pub sent: usize,
    pub content_failed: usize,
    pub send_failed: usize,
}

/// Drives delivery cycles. Cheap to clone; shared between the API trigger
/// endpoint and the worker binary.
#[derive(Clone)]
pub struct Orchestrator {
    pool: DbPool,
    clock: CivilClock,
    content: Arc<dyn ContentGenerator>,
    mailer: Arc<dyn EmailTransport>,
}

impl Orchestrator {
    pub fn new(
        pool: DbPool,
        clock: CivilClock,
        content: Arc<dyn ContentGenerator>,
        mailer: Arc<dyn EmailTransport>,
    ) -> Self {
        Self {
            pool,
            clock,
            content,
            mailer,
        }
    }

    /// Run one full cycle for the current civil day.
    ///
    /// Store errors abort the cycle and surface to the caller; unclaimed
    /// goals stay unclaimed, so the next scheduled invocation recovers.
    /// Collaborator failures are isolated per goal and never abort the
    /// remaining claimed goals.
    pub async fn run_cycle(&self) -> Result<CycleSummary, sqlx::Error> {
        let today = self.clock.today();
        let claimed = GoalRepo::claim_due(&self.pool, today).await?;
        tracing::info!(day = %today, claimed = claimed.len(), "Delivery cycle started");

        let mut summary = CycleSummary {
            day: today,
            claimed: claimed.len(),
            sent: 0,
            content_failed: 0,
            send_failed: 0,
        };

        for goal in &claimed {
            let outcome = self.deliver_one(goal, today).await?;
            match outcome {
                DeliveryOutcome::Sent => summary.sent += 1,
                DeliveryOutcome::ContentFailed => summary.content_failed += 1,
                DeliveryOutcome::SendFailed => summary.send_failed += 1,
            }
        }

        tracing::info!(
            day = %today,
            claimed = summary.claimed,
            sent = summary.sent,
            content_failed = summary.content_failed,
            send_failed = summary.send_failed,
            "Delivery cycle finished"
        );
        Ok(summary)
    }

    /// Deliver to a single already-claimed goal and record the attempt.
    ///
    /// Only store errors propagate; collaborator failures are folded into
    /// the recorded outcome.
    async fn deliver_one(&self, goal: &Goal, day: CivilDay) -> Result<DeliveryOutcome, sqlx::Error> {
        let (content, generation_error) = match self.content.generate(&content_request(goal)).await
        {
            Ok(content) => (content, None),
            Err(e) => {
                tracing::warn!(goal_id = goal.id, error = %e, "Content generation failed, using fallback");
                (
                    fallback_content(&goal.title, goal.streak_count),
                    Some(e.to_string()),
                )
            }
        };

        let send_result = self.send_to_owner(goal, &content).await;

        let (outcome, detail) = match (generation_error, send_result) {
            (None, Ok(())) => (DeliveryOutcome::Sent, None),
            (Some(gen_err), Ok(())) => (
                DeliveryOutcome::ContentFailed,
                Some(format!("fallback delivered; generator: {gen_err}")),
            ),
            (gen_err, Err(send_err)) => {
                tracing::warn!(goal_id = goal.id, error = %send_err, "Motivation send failed");
                let detail = match gen_err {
                    Some(g) => format!("send: {send_err}; generator: {g}"),
                    None => format!("send: {send_err}"),
                };
                (DeliveryOutcome::SendFailed, Some(detail))
            }
        };

        DeliveryAttemptRepo::record(&self.pool, goal.id, day, outcome, detail.as_deref()).await?;
        Ok(outcome)
    }

    async fn send_to_owner(
        &self,
        goal: &Goal,
        content: &MotivationContent,
    ) -> Result<(), EmailError> {
        let owner = OwnerRepo::find_by_id(&self.pool, goal.owner_id)
            .await
            .map_err(|e| EmailError::Build(format!("owner lookup failed: {e}")))?;
        let recipient = owner
            .and_then(|o| o.email)
            .ok_or(EmailError::NoRecipient)?;

        let (subject, body) = compose_email(goal, content);
        self.mailer.send(&recipient, &subject, &body).await
    }
}

fn content_request(goal: &Goal) -> ContentRequest {
    ContentRequest {
        goal_title: goal.title.clone(),
        goal_description: goal.description.clone(),
        tone: goal.tone(),
        streak_count: goal.streak_count,
        target_date: goal.target_date,
    }
}

/// Render the plain-text email for a goal's daily message.
pub fn compose_email(goal: &Goal, content: &MotivationContent) -> (String, String) {
    let subject = if goal.streak_count > 0 {
        format!("Day {}: {}", goal.streak_count + 1, goal.title)
    } else {
        format!("Let's go: {}", goal.title)
    };

    let mut body = String::new();
    body.push_str(&content.message);
    if !content.micro_plan.is_empty() {
        body.push_str("\n\nToday's plan:\n");
        for (i, step) in content.micro_plan.iter().enumerate() {
            body.push_str(&format!("  {}. {}\n", i + 1, step));
        }
    }
    if !content.challenge.is_empty() {
        body.push_str(&format!("\nChallenge: {}\n", content.challenge));
    }
    (subject, body)
}
