//! Owner entity: the paying or trial identity behind a set of goals.

use serde::Serialize;
use sqlx::FromRow;
use stride_core::quota::SubscriptionTier;
use stride_core::types::{DbId, Timestamp};

/// A row from the `owners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Owner {
    pub id: DbId,
    /// Opaque key from the upstream identity provider.
    pub owner_key: String,
    /// Delivery address, if the identity provider shared one.
    pub email: Option<String>,
    pub subscription_tier: String,
    pub trial_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Owner {
    /// The stored tier. An unrecognised value (bad manual edit) is treated
    /// as free rather than failing the request.
    pub fn tier(&self) -> SubscriptionTier {
        self.subscription_tier.parse().unwrap_or_else(|_| {
            tracing::warn!(
                owner_id = self.id,
                tier = %self.subscription_tier,
                "Unrecognised subscription tier, treating as free"
            );
            SubscriptionTier::Free
        })
    }

    /// The tier whose quotas apply at `now`, accounting for trial expiry.
    pub fn effective_tier(&self, now: Timestamp) -> SubscriptionTier {
        self.tier().effective(self.trial_expires_at, now)
    }
}
