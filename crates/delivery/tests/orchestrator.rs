//! Integration tests for the delivery cycle, with in-memory collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::PgPool;
use stride_core::civil::CivilClock;
use stride_core::quota::SubscriptionTier;
use stride_core::types::Tone;
use stride_db::models::goal::CreateGoal;
use stride_db::repositories::{DeliveryAttemptRepo, GoalRepo, OwnerRepo};
use stride_delivery::content::{ContentError, ContentGenerator, ContentRequest, MotivationContent};
use stride_delivery::email::{EmailError, EmailTransport};
use stride_delivery::Orchestrator;

// ---------------------------------------------------------------------------
// Collaborator doubles
// ---------------------------------------------------------------------------

struct StubGenerator {
    fail: bool,
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<MotivationContent, ContentError> {
        if self.fail {
            return Err(ContentError::Malformed("stub outage".to_string()));
        }
        Ok(MotivationContent {
            message: format!("Keep pushing on {}", request.goal_title),
            micro_plan: vec!["step one".to_string()],
            challenge: "one more rep".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingMailer {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EmailTransport for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Build("stub transport down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clock() -> CivilClock {
    CivilClock::new("UTC", 0).unwrap()
}

async fn seed_owner_with_goals(pool: &PgPool, email: Option<&str>, goals: usize) -> Vec<i64> {
    let owner = OwnerRepo::ensure(pool, "owner-a").await.unwrap();
    OwnerRepo::set_subscription(pool, "owner-a", SubscriptionTier::Premium, None, email)
        .await
        .unwrap();
    let mut ids = Vec::new();
    for n in 0..goals {
        let goal = GoalRepo::create(
            pool,
            owner.id,
            &CreateGoal {
                title: format!("goal-{n}"),
                description: None,
                target_date: None,
                tone: Tone::Encouraging,
                delivery_hour: 8,
            },
        )
        .await
        .unwrap();
        ids.push(goal.id);
    }
    ids
}

fn orchestrator(
    pool: &PgPool,
    generator: StubGenerator,
    mailer: Arc<RecordingMailer>,
) -> Orchestrator {
    Orchestrator::new(pool.clone(), clock(), Arc::new(generator), mailer)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cycle_delivers_each_goal_once(pool: PgPool) {
    let ids = seed_owner_with_goals(&pool, Some("user@example.com"), 3).await;
    let mailer = Arc::new(RecordingMailer::default());
    let orch = orchestrator(&pool, StubGenerator { fail: false }, Arc::clone(&mailer));

    let summary = orch.run_cycle().await.unwrap();
    assert_eq!(summary.claimed, 3);
    assert_eq!(summary.sent, 3);
    assert_eq!(mailer.sent.lock().unwrap().len(), 3);

    for id in &ids {
        let attempts = DeliveryAttemptRepo::list_for_goal(&pool, *id).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].outcome, "sent");
    }

    // A retried trigger for the same day claims nothing and sends nothing.
    let again = orch.run_cycle().await.unwrap();
    assert_eq!(again.claimed, 0);
    assert_eq!(mailer.sent.lock().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generator_outage_falls_back_and_still_sends(pool: PgPool) {
    let ids = seed_owner_with_goals(&pool, Some("user@example.com"), 1).await;
    let mailer = Arc::new(RecordingMailer::default());
    let orch = orchestrator(&pool, StubGenerator { fail: true }, Arc::clone(&mailer));

    let summary = orch.run_cycle().await.unwrap();
    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.content_failed, 1);
    assert_eq!(summary.sent, 0);

    // The fallback message still went out.
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);

    let attempts = DeliveryAttemptRepo::list_for_goal(&pool, ids[0]).await.unwrap();
    assert_eq!(attempts[0].outcome, "content_failed");
    assert!(attempts[0].detail.as_deref().unwrap().contains("fallback"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn send_failure_is_recorded_and_never_redelivered_same_day(pool: PgPool) {
    let ids = seed_owner_with_goals(&pool, Some("user@example.com"), 2).await;
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });
    let orch = orchestrator(&pool, StubGenerator { fail: false }, Arc::clone(&mailer));

    let summary = orch.run_cycle().await.unwrap();
    assert_eq!(summary.claimed, 2);
    assert_eq!(summary.send_failed, 2);

    for id in &ids {
        let attempts = DeliveryAttemptRepo::list_for_goal(&pool, *id).await.unwrap();
        assert_eq!(attempts[0].outcome, "send_failed");
    }

    // At-most-once: the claim stands despite the failures.
    let again = orch.run_cycle().await.unwrap();
    assert_eq!(again.claimed, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_without_email_records_send_failed(pool: PgPool) {
    let ids = seed_owner_with_goals(&pool, None, 1).await;
    let mailer = Arc::new(RecordingMailer::default());
    let orch = orchestrator(&pool, StubGenerator { fail: false }, Arc::clone(&mailer));

    let summary = orch.run_cycle().await.unwrap();
    assert_eq!(summary.send_failed, 1);
    assert!(mailer.sent.lock().unwrap().is_empty());

    let attempts = DeliveryAttemptRepo::list_for_goal(&pool, ids[0]).await.unwrap();
    assert_eq!(attempts[0].outcome, "send_failed");
}
