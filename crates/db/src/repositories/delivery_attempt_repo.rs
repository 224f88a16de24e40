//! Repository for the `motivation_delivery_attempts` audit log.

use sqlx::PgPool;
use stride_core::civil::CivilDay;
use stride_core::types::DbId;

use crate::models::delivery::{DeliveryOutcome, MotivationDeliveryAttempt};

const ATTEMPT_COLUMNS: &str = "id, goal_id, day, outcome, detail, created_at";

/// Data access for the `motivation_delivery_attempts` table.
pub struct DeliveryAttemptRepo;

impl DeliveryAttemptRepo {
    /// Record the outcome for a claimed (goal, day).
    ///
    /// `ON CONFLICT DO NOTHING` keeps the log append-only under retries; a
    /// conflict here means something attempted a second delivery for the
    /// same day, which the claim should have made impossible, so it is
    /// logged loudly rather than treated as an error.
    pub async fn record(
        pool: &PgPool,
        goal_id: DbId,
        day: CivilDay,
        outcome: DeliveryOutcome,
        detail: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let inserted: Option<(DbId,)> = sqlx::query_as(
            "INSERT INTO motivation_delivery_attempts (goal_id, day, outcome, detail) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (goal_id, day) DO NOTHING \
             RETURNING id",
        )
        .bind(goal_id)
        .bind(day.date())
        .bind(outcome.as_str())
        .bind(detail)
        .fetch_optional(pool)
        .await?;

        if inserted.is_none() {
            tracing::warn!(
                goal_id,
                day = %day,
                %outcome,
                "Duplicate delivery attempt for an already-recorded day; claim atomicity suspect"
            );
        }
        Ok(())
    }

    /// Attempt history for one goal, newest first.
    pub async fn list_for_goal(
        pool: &PgPool,
        goal_id: DbId,
    ) -> Result<Vec<MotivationDeliveryAttempt>, sqlx::Error> {
        let query = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM motivation_delivery_attempts \
             WHERE goal_id = $1 \
             ORDER BY day DESC, id DESC"
        );
        sqlx::query_as::<_, MotivationDeliveryAttempt>(&query)
            .bind(goal_id)
            .fetch_all(pool)
            .await
    }
}
