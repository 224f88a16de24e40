//! Goal entity and its DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::civil::CivilDay;
use stride_core::streak::StreakState;
use stride_core::types::{DbId, Timestamp, Tone};

/// A row from the `goals` table.
///
/// The streak fields (`streak_count`, `last_checkin_day`,
/// `streak_insurance_days`, `last_insurance_earned_day`) are mutated only
/// through [`crate::repositories::GoalRepo::apply_check_in`], and
/// `last_motivation_day` only through
/// [`crate::repositories::GoalRepo::claim_due`]. Client input never touches
/// them directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Goal {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub tone: String,
    pub delivery_hour: i16,
    pub is_active: bool,
    pub streak_count: i32,
    pub last_checkin_day: Option<NaiveDate>,
    pub streak_insurance_days: i32,
    pub last_insurance_earned_day: Option<NaiveDate>,
    pub last_motivation_day: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Goal {
    /// The streak slice of this row in the core engine's vocabulary.
    pub fn streak_state(&self) -> StreakState {
        StreakState {
            streak_count: self.streak_count,
            last_checkin_day: self.last_checkin_day.map(CivilDay::from_date),
            insurance_days: self.streak_insurance_days,
            last_insurance_earned_day: self.last_insurance_earned_day.map(CivilDay::from_date),
        }
    }

    pub fn tone(&self) -> Tone {
        self.tone.parse().unwrap_or(Tone::Encouraging)
    }
}

/// DTO for creating a goal. Streak and delivery fields are intentionally
/// absent; they start at their column defaults.
#[derive(Debug, Deserialize)]
pub struct CreateGoal {
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub tone: Tone,
    #[serde(default = "default_delivery_hour")]
    pub delivery_hour: i16,
}

fn default_delivery_hour() -> i16 {
    8
}
