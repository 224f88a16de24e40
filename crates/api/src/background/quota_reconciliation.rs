//! Periodic goal-quota reconciliation.
//!
//! Tier downgrades arrive out of band (subscription webhooks, trial
//! expiry), so an owner can hold more active goals than their tier allows.
//! This sweep walks every owner with active goals and deactivates the
//! newest goals beyond the limit, keeping the oldest. The operation is
//! deterministic and idempotent, so overlapping runs are harmless.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use stride_core::quota::QuotaPolicy;
use stride_db::repositories::{GoalRepo, OwnerRepo};
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const RECONCILE_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the reconciliation loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = RECONCILE_INTERVAL.as_secs(),
        "Quota reconciliation job started"
    );

    let mut interval = tokio::time::interval(RECONCILE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Quota reconciliation job stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = reconcile_all(&pool).await {
                    tracing::error!(error = %e, "Quota reconciliation sweep failed");
                }
            }
        }
    }
}

/// One full sweep over every owner holding active goals.
pub async fn reconcile_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let now = Utc::now();
    let mut total_deactivated = 0;

    for owner_id in OwnerRepo::ids_with_active_goals(pool).await? {
        let Some(owner) = OwnerRepo::find_by_id(pool, owner_id).await? else {
            continue;
        };
        let policy = QuotaPolicy::for_tier(owner.effective_tier(now));
        let deactivated =
            GoalRepo::deactivate_over_quota(pool, owner_id, policy.max_active_goals).await?;
        if deactivated > 0 {
            tracing::info!(
                owner_id,
                deactivated,
                limit = policy.max_active_goals,
                "Deactivated goals over quota"
            );
            total_deactivated += deactivated;
        }
    }

    if total_deactivated == 0 {
        tracing::debug!("Quota reconciliation: all owners compliant");
    }
    Ok(total_deactivated)
}
