//! Subscription tiers and the quota policy.
//!
//! The limits here are the single source of truth; call sites never carry
//! their own copies of these constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
        }
    }

    /// The tier whose quotas actually apply at `now`: a premium tier whose
    /// trial has lapsed degrades to free without any row mutation.
    pub fn effective(self, trial_expires_at: Option<Timestamp>, now: Timestamp) -> Self {
        match (self, trial_expires_at) {
            (SubscriptionTier::Premium, Some(expiry)) if expiry <= now => SubscriptionTier::Free,
            (tier, _) => tier,
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            "premium" => Ok(SubscriptionTier::Premium),
            other => Err(CoreError::Validation(format!("Unknown tier: {other}"))),
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tier limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaPolicy {
    /// Active goals an owner may hold at once.
    pub max_active_goals: i64,
    /// On-demand nudges per owner per civil day.
    pub max_daily_nudges: i32,
}

impl QuotaPolicy {
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => QuotaPolicy {
                max_active_goals: 1,
                max_daily_nudges: 1,
            },
            SubscriptionTier::Premium => QuotaPolicy {
                max_active_goals: 3,
                max_daily_nudges: 3,
            },
        }
    }
}
