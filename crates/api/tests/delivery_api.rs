mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use stride_core::quota::SubscriptionTier;
use stride_db::repositories::OwnerRepo;

use common::{body_json, build_test_app_with_mailer, get, post_empty, post_json};

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivery_cycle_sends_once_per_day(pool: PgPool) {
    let (app, mailer) = build_test_app_with_mailer(pool.clone());

    OwnerRepo::ensure(&pool, "owner-a").await.unwrap();
    OwnerRepo::set_subscription(
        &pool,
        "owner-a",
        SubscriptionTier::Free,
        None,
        Some("a@example.com"),
    )
    .await
    .unwrap();

    let response = post_json(
        app.clone(),
        "/api/v1/goals",
        "owner-a",
        json!({ "title": "Learn Finnish", "tone": "encouraging" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let goal_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_empty(app.clone(), "/api/v1/internal/delivery/run", "owner-a").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["claimed"], 1);
    assert_eq!(json["data"]["sent"], 1);
    assert_eq!(json["data"]["send_failed"], 0);
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);

    // Retriggering the same day claims nothing and sends nothing.
    let response = post_empty(app.clone(), "/api/v1/internal/delivery/run", "owner-a").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["claimed"], 0);
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);

    // The attempt shows up in the goal's delivery history.
    let response = get(
        app,
        &format!("/api/v1/goals/{goal_id}/deliveries"),
        "owner-a",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let attempts = json["data"].as_array().unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0]["outcome"], "sent");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivery_without_recipient_records_send_failed(pool: PgPool) {
    let (app, mailer) = build_test_app_with_mailer(pool);

    // Owner bootstrapped via the API has no email on file.
    let response = post_json(
        app.clone(),
        "/api/v1/goals",
        "owner-a",
        json!({ "title": "Learn Finnish", "tone": "encouraging" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_empty(app, "/api/v1/internal/delivery/run", "owner-a").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["claimed"], 1);
    assert_eq!(json["data"]["sent"], 0);
    assert_eq!(json["data"]["send_failed"], 1);
    assert!(mailer.sent.lock().unwrap().is_empty());
}
