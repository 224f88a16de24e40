mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{assert_rejection, body_json, build_test_app, post_empty, post_json};

async fn create_goal(app: axum::Router, owner_key: &str, title: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/goals",
        owner_key,
        json!({ "title": title, "tone": "encouraging" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_check_in_starts_the_streak(pool: PgPool) {
    let app = build_test_app(pool);
    let goal_id = create_goal(app.clone(), "owner-a", "Meditate").await;

    let response = post_empty(
        app,
        &format!("/api/v1/goals/{goal_id}/check-in"),
        "owner-a",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["goal_id"], goal_id);
    assert_eq!(json["data"]["streak_count"], 1);
    assert_eq!(json["data"]["streak_insurance_days"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_check_in_same_day_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let goal_id = create_goal(app.clone(), "owner-a", "Meditate").await;

    let response = post_empty(
        app.clone(),
        &format!("/api/v1/goals/{goal_id}/check-in"),
        "owner-a",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_empty(
        app.clone(),
        &format!("/api/v1/goals/{goal_id}/check-in"),
        "owner-a",
    )
    .await;
    assert_rejection(response, StatusCode::CONFLICT, "ALREADY_CHECKED_IN").await;

    // The rejection left the streak untouched.
    let response = common::get(app, &format!("/api/v1/goals/{goal_id}"), "owner-a").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["streak_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_in_on_unknown_goal_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_empty(app, "/api/v1/goals/999999/check-in", "owner-a").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn check_in_on_foreign_goal_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);
    let goal_id = create_goal(app.clone(), "owner-a", "Meditate").await;

    let response = post_empty(
        app,
        &format!("/api/v1/goals/{goal_id}/check-in"),
        "owner-b",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
