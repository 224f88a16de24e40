//! Repository for the `owners` table.

use sqlx::PgPool;
use stride_core::quota::SubscriptionTier;
use stride_core::types::{DbId, Timestamp};

use crate::models::owner::Owner;

const OWNER_COLUMNS: &str = "\
    id, owner_key, email, subscription_tier, trial_expires_at, created_at, updated_at";

/// Data access for the `owners` table.
pub struct OwnerRepo;

impl OwnerRepo {
    /// Find or create the owner row for an opaque identity key.
    ///
    /// Upsert keyed on `owner_key` so first contact from the gateway
    /// bootstraps a free-tier row; concurrent first contacts resolve to the
    /// same row.
    pub async fn ensure(pool: &PgPool, owner_key: &str) -> Result<Owner, sqlx::Error> {
        let query = format!(
            "INSERT INTO owners (owner_key) VALUES ($1) \
             ON CONFLICT (owner_key) DO UPDATE SET updated_at = now() \
             RETURNING {OWNER_COLUMNS}"
        );
        sqlx::query_as::<_, Owner>(&query)
            .bind(owner_key)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Owner>, sqlx::Error> {
        let query = format!("SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1");
        sqlx::query_as::<_, Owner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_key(pool: &PgPool, owner_key: &str) -> Result<Option<Owner>, sqlx::Error> {
        let query = format!("SELECT {OWNER_COLUMNS} FROM owners WHERE owner_key = $1");
        sqlx::query_as::<_, Owner>(&query)
            .bind(owner_key)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite tier, trial expiry, and delivery address. Driven by the
    /// external subscription source (webhook relay), not by user requests.
    pub async fn set_subscription(
        pool: &PgPool,
        owner_key: &str,
        tier: SubscriptionTier,
        trial_expires_at: Option<Timestamp>,
        email: Option<&str>,
    ) -> Result<Owner, sqlx::Error> {
        let query = format!(
            "UPDATE owners \
             SET subscription_tier = $2, trial_expires_at = $3, \
                 email = COALESCE($4, email), updated_at = now() \
             WHERE owner_key = $1 \
             RETURNING {OWNER_COLUMNS}"
        );
        sqlx::query_as::<_, Owner>(&query)
            .bind(owner_key)
            .bind(tier.as_str())
            .bind(trial_expires_at)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Owner ids holding at least one active goal, for the periodic quota
    /// reconciliation sweep.
    pub async fn ids_with_active_goals(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT DISTINCT owner_id FROM goals WHERE is_active ORDER BY owner_id")
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
