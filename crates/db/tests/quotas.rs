//! Integration tests for nudge-counter atomicity and goal-quota
//! reconciliation.

use chrono::NaiveDate;
use sqlx::PgPool;
use stride_core::civil::CivilDay;
use stride_core::quota::{QuotaPolicy, SubscriptionTier};
use stride_core::types::Tone;
use stride_db::models::goal::CreateGoal;
use stride_db::repositories::{GoalRepo, NudgeRepo, OwnerRepo};

fn day(d: u32) -> CivilDay {
    CivilDay::from_date(NaiveDate::from_ymd_opt(2026, 7, d).unwrap())
}

fn new_goal(title: &str) -> CreateGoal {
    CreateGoal {
        title: title.to_string(),
        description: None,
        target_date: None,
        tone: Tone::Playful,
        delivery_hour: 8,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn free_tier_second_nudge_rejected(pool: PgPool) {
    let owner = OwnerRepo::ensure(&pool, "owner-free").await.unwrap();
    let limit = QuotaPolicy::for_tier(SubscriptionTier::Free).max_daily_nudges;

    assert_eq!(
        NudgeRepo::try_increment(&pool, owner.id, day(1), limit).await.unwrap(),
        Some(1)
    );
    assert_eq!(
        NudgeRepo::try_increment(&pool, owner.id, day(1), limit).await.unwrap(),
        None
    );
    // The next civil day opens a fresh counter.
    assert_eq!(
        NudgeRepo::try_increment(&pool, owner.id, day(2), limit).await.unwrap(),
        Some(1)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn premium_concurrent_nudges_accept_exactly_three(pool: PgPool) {
    let owner = OwnerRepo::ensure(&pool, "owner-premium").await.unwrap();
    let limit = QuotaPolicy::for_tier(SubscriptionTier::Premium).max_daily_nudges;

    let mut handles = Vec::new();
    for _ in 0..6 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            NudgeRepo::try_increment(&pool, owner.id, day(1), limit)
                .await
                .unwrap()
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 3);

    let counter = NudgeRepo::find(&pool, owner.id, day(1)).await.unwrap().unwrap();
    assert_eq!(counter.count, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconciliation_keeps_oldest_goal_for_free_tier(pool: PgPool) {
    let owner = OwnerRepo::ensure(&pool, "owner-free").await.unwrap();
    let mut ids = Vec::new();
    for n in 0..5 {
        let goal = GoalRepo::create(&pool, owner.id, &new_goal(&format!("goal-{n}")))
            .await
            .unwrap();
        ids.push(goal.id);
    }

    let limit = QuotaPolicy::for_tier(SubscriptionTier::Free).max_active_goals;
    let deactivated = GoalRepo::deactivate_over_quota(&pool, owner.id, limit)
        .await
        .unwrap();
    assert_eq!(deactivated, 4);

    let goals = GoalRepo::list_for_owner(&pool, owner.id).await.unwrap();
    let active: Vec<_> = goals.iter().filter(|g| g.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, ids[0], "the oldest goal must survive");

    // Idempotent: a compliant owner is a no-op.
    let again = GoalRepo::deactivate_over_quota(&pool, owner.id, limit)
        .await
        .unwrap();
    assert_eq!(again, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconciliation_is_noop_within_premium_limit(pool: PgPool) {
    let owner = OwnerRepo::ensure(&pool, "owner-premium").await.unwrap();
    for n in 0..3 {
        GoalRepo::create(&pool, owner.id, &new_goal(&format!("goal-{n}")))
            .await
            .unwrap();
    }
    let limit = QuotaPolicy::for_tier(SubscriptionTier::Premium).max_active_goals;
    assert_eq!(
        GoalRepo::deactivate_over_quota(&pool, owner.id, limit).await.unwrap(),
        0
    );
}
