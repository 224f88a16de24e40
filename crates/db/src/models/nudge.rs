//! Per-(owner, civil day) nudge counter.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `daily_nudge_counters` table.
///
/// Created lazily on the first nudge of a day, never decremented, and
/// naturally superseded by a new row the next civil day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyNudgeCounter {
    pub id: DbId,
    pub owner_id: DbId,
    pub day: NaiveDate,
    pub count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
