//! Repository for the `goals` table.
//!
//! Holds the two operations the rest of the system's correctness hangs on:
//! the atomic daily claim ([`GoalRepo::claim_due`]) and the
//! compare-and-swap check-in write ([`GoalRepo::apply_check_in`]).

use sqlx::PgPool;
use stride_core::civil::CivilDay;
use stride_core::streak::StreakState;
use stride_core::types::DbId;

use crate::models::goal::{CreateGoal, Goal};

const GOAL_COLUMNS: &str = "\
    id, owner_id, title, description, target_date, tone, delivery_hour, is_active, \
    streak_count, last_checkin_day, streak_insurance_days, last_insurance_earned_day, \
    last_motivation_day, created_at, updated_at";

/// Data access for the `goals` table.
pub struct GoalRepo;

impl GoalRepo {
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateGoal,
    ) -> Result<Goal, sqlx::Error> {
        let query = format!(
            "INSERT INTO goals (owner_id, title, description, target_date, tone, delivery_hour) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {GOAL_COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.target_date)
            .bind(input.tone.as_str())
            .bind(input.delivery_hour)
            .fetch_one(pool)
            .await
    }

    /// Find a goal scoped to its owner; other owners' goals read as absent.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Goal>, sqlx::Error> {
        let query = format!(
            "SELECT {GOAL_COLUMNS} FROM goals \
             WHERE owner_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_active(pool: &PgPool, owner_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM goals WHERE owner_id = $1 AND is_active")
                .bind(owner_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Soft-delete: flip `is_active`, keep the row for audit. Returns the
    /// updated goal, or `None` if it does not exist for this owner.
    pub async fn deactivate(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!(
            "UPDATE goals SET is_active = false, updated_at = now() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {GOAL_COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim every goal due a motivational send for `today`.
    ///
    /// One statement performs the filter, the `last_motivation_day` write,
    /// and the result-set selection, so a goal lands in the result of
    /// exactly one caller: a concurrent invocation for the same day sees
    /// the already-updated column and claims nothing. Re-running after all
    /// goals are claimed is an idempotent no-op returning the empty set,
    /// which is what makes retried cron triggers harmless.
    pub async fn claim_due(pool: &PgPool, today: CivilDay) -> Result<Vec<Goal>, sqlx::Error> {
        let query = format!(
            "UPDATE goals \
             SET last_motivation_day = $1, updated_at = now() \
             WHERE is_active \
               AND (last_motivation_day IS NULL OR last_motivation_day < $1) \
             RETURNING {GOAL_COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(today.date())
            .fetch_all(pool)
            .await
    }

    /// Persist a streak transition, guarded by an optimistic check that
    /// `last_checkin_day` still holds the value the state was computed
    /// from. Returns `None` on a CAS miss (a concurrent check-in won); the
    /// caller re-reads and re-runs the engine.
    pub async fn apply_check_in(
        pool: &PgPool,
        id: DbId,
        prior_checkin_day: Option<CivilDay>,
        next: &StreakState,
    ) -> Result<Option<Goal>, sqlx::Error> {
        let query = format!(
            "UPDATE goals \
             SET streak_count = $2, last_checkin_day = $3, streak_insurance_days = $4, \
                 last_insurance_earned_day = $5, updated_at = now() \
             WHERE id = $1 AND last_checkin_day IS NOT DISTINCT FROM $6 \
             RETURNING {GOAL_COLUMNS}"
        );
        sqlx::query_as::<_, Goal>(&query)
            .bind(id)
            .bind(next.streak_count)
            .bind(next.last_checkin_day.map(CivilDay::date))
            .bind(next.insurance_days)
            .bind(next.last_insurance_earned_day.map(CivilDay::date))
            .bind(prior_checkin_day.map(CivilDay::date))
            .fetch_optional(pool)
            .await
    }

    /// Deactivate every active goal beyond the tier limit, keeping the
    /// oldest by creation time (id as tie-break). Idempotent: a compliant
    /// owner is a no-op. Returns the number of goals deactivated.
    pub async fn deactivate_over_quota(
        pool: &PgPool,
        owner_id: DbId,
        max_active_goals: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE goals SET is_active = false, updated_at = now() \
             WHERE id IN ( \
                 SELECT id FROM goals \
                 WHERE owner_id = $1 AND is_active \
                 ORDER BY created_at ASC, id ASC \
                 OFFSET $2 \
             )",
        )
        .bind(owner_id)
        .bind(max_active_goals)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
