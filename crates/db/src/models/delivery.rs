//! Append-only audit of motivational delivery attempts.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// Outcome of a claimed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Content generated (possibly via fallback) and accepted by the mail
    /// transport.
    Sent,
    /// Content generation failed and the static fallback was also not
    /// deliverable.
    ContentFailed,
    /// The mail transport rejected the message.
    SendFailed,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::ContentFailed => "content_failed",
            DeliveryOutcome::SendFailed => "send_failed",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `motivation_delivery_attempts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MotivationDeliveryAttempt {
    pub id: DbId,
    pub goal_id: DbId,
    pub day: NaiveDate,
    pub outcome: String,
    pub detail: Option<String>,
    pub created_at: Timestamp,
}
