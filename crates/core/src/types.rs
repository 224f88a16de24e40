use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Coaching style for generated motivational messages.
///
/// Stored as lowercase text in the `goals` table; parsed back through
/// [`FromStr`] at the repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Encouraging,
    DrillSergeant,
    Playful,
    Zen,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Encouraging => "encouraging",
            Tone::DrillSergeant => "drill_sergeant",
            Tone::Playful => "playful",
            Tone::Zen => "zen",
        }
    }
}

impl FromStr for Tone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encouraging" => Ok(Tone::Encouraging),
            "drill_sergeant" => Ok(Tone::DrillSergeant),
            "playful" => Ok(Tone::Playful),
            "zen" => Ok(Tone::Zen),
            other => Err(CoreError::Validation(format!("Unknown tone: {other}"))),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
