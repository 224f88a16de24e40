//! Streak state machine.
//!
//! Pure transitions over a goal's streak fields driven by a check-in on a
//! given civil day. Persistence (including the compare-and-swap guard
//! against racing check-ins) lives in `stride-db`; this module never sees
//! the store.
//!
//! Insurance mechanics: every 7th consecutive check-in earns one "streak
//! insurance" credit (at most one per milestone day, capped at
//! [`MAX_INSURANCE_DAYS`]). A gap of `n > 1` days can be forgiven by
//! spending `n - 1` credits, preserving streak continuity; with too few
//! credits the streak resets to 1 and the credits are kept.

use serde::Serialize;

use crate::civil::CivilDay;

/// Maximum banked insurance credits per goal.
pub const MAX_INSURANCE_DAYS: i32 = 3;

/// A credit is earned whenever the streak reaches a multiple of this.
pub const INSURANCE_MILESTONE: i32 = 7;

/// The streak-related slice of a goal's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakState {
    pub streak_count: i32,
    pub last_checkin_day: Option<CivilDay>,
    pub insurance_days: i32,
    pub last_insurance_earned_day: Option<CivilDay>,
}

impl StreakState {
    /// State of a goal that has never been checked in.
    pub fn fresh() -> Self {
        StreakState {
            streak_count: 0,
            last_checkin_day: None,
            insurance_days: 0,
            last_insurance_earned_day: None,
        }
    }
}

/// Result of applying a check-in event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// The check-in counts; persist the new state.
    Accepted(StreakState),
    /// A check-in for this civil day was already recorded; no-op.
    AlreadyCheckedIn,
    /// `today` is earlier than the recorded last check-in day. Should not
    /// occur when callers derive `today` through the civil clock; surfaced
    /// as a per-request error rather than a crash.
    ClockSkew,
}

/// Apply a `CheckIn(today)` event to `state`.
pub fn check_in(state: &StreakState, today: CivilDay) -> CheckInOutcome {
    let last = match state.last_checkin_day {
        // First check-in ever.
        None => {
            return CheckInOutcome::Accepted(StreakState {
                streak_count: 1,
                last_checkin_day: Some(today),
                ..*state
            });
        }
        Some(last) => last,
    };

    let gap = today.days_since(last);
    match gap {
        g if g < 0 => CheckInOutcome::ClockSkew,
        0 => CheckInOutcome::AlreadyCheckedIn,
        1 => {
            let streak_count = state.streak_count + 1;
            let next = StreakState {
                streak_count,
                last_checkin_day: Some(today),
                ..*state
            };
            CheckInOutcome::Accepted(maybe_earn_insurance(next, today))
        }
        gap => {
            let missed = (gap - 1) as i32;
            if state.insurance_days >= missed {
                // Forgiven: spend credits, continuity preserved.
                CheckInOutcome::Accepted(StreakState {
                    streak_count: state.streak_count + 1,
                    last_checkin_day: Some(today),
                    insurance_days: state.insurance_days - missed,
                    ..*state
                })
            } else {
                // Not enough credits: reset, keep whatever was banked.
                CheckInOutcome::Accepted(StreakState {
                    streak_count: 1,
                    last_checkin_day: Some(today),
                    ..*state
                })
            }
        }
    }
}

/// Grant an insurance credit on a 7-day milestone, at most once per
/// milestone day and never above the cap.
fn maybe_earn_insurance(state: StreakState, today: CivilDay) -> StreakState {
    let at_milestone = state.streak_count % INSURANCE_MILESTONE == 0;
    let under_cap = state.insurance_days < MAX_INSURANCE_DAYS;
    let already_earned_today = state.last_insurance_earned_day == Some(today);
    if at_milestone && under_cap && !already_earned_today {
        StreakState {
            insurance_days: state.insurance_days + 1,
            last_insurance_earned_day: Some(today),
            ..state
        }
    } else {
        state
    }
}
