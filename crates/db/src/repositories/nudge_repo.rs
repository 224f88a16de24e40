//! Repository for the `daily_nudge_counters` table.

use sqlx::PgPool;
use stride_core::civil::CivilDay;
use stride_core::types::DbId;

use crate::models::nudge::DailyNudgeCounter;

const COUNTER_COLUMNS: &str = "id, owner_id, day, count, created_at, updated_at";

/// Data access for the `daily_nudge_counters` table.
pub struct NudgeRepo;

impl NudgeRepo {
    /// Consume one nudge slot for (owner, day) if any remain.
    ///
    /// The read-check-increment is a single statement: the insert creates
    /// the day's row at count 1, and the conflict arm only increments while
    /// `count < limit`. No row returned means the limit was already
    /// reached, so two simultaneous requests can never both take the last
    /// slot. Returns the count after the increment.
    pub async fn try_increment(
        pool: &PgPool,
        owner_id: DbId,
        day: CivilDay,
        limit: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        if limit < 1 {
            return Ok(None);
        }
        let row: Option<(i32,)> = sqlx::query_as(
            "INSERT INTO daily_nudge_counters (owner_id, day, count) \
             VALUES ($1, $2, 1) \
             ON CONFLICT (owner_id, day) DO UPDATE \
                 SET count = daily_nudge_counters.count + 1, updated_at = now() \
                 WHERE daily_nudge_counters.count < $3 \
             RETURNING count",
        )
        .bind(owner_id)
        .bind(day.date())
        .bind(limit)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(count,)| count))
    }

    /// Today's counter row, if the owner has nudged today.
    pub async fn find(
        pool: &PgPool,
        owner_id: DbId,
        day: CivilDay,
    ) -> Result<Option<DailyNudgeCounter>, sqlx::Error> {
        let query = format!(
            "SELECT {COUNTER_COLUMNS} FROM daily_nudge_counters \
             WHERE owner_id = $1 AND day = $2"
        );
        sqlx::query_as::<_, DailyNudgeCounter>(&query)
            .bind(owner_id)
            .bind(day.date())
            .fetch_optional(pool)
            .await
    }
}
