mod common;

use axum::http::StatusCode;
use common::{admin_request, customer_get, customer_post, parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

async fn account_body(app: &TestApp, customer_id: &str) -> serde_json::Value {
    let res = app.router.clone().oneshot(customer_get("/api/v1/loyalty/me", customer_id)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

fn history_sum(body: &serde_json::Value) -> i64 {
    body["history"].as_array().unwrap()
        .iter().map(|e| e["points"].as_i64().unwrap())
        .sum()
}

#[tokio::test]
async fn test_fresh_customer_sees_zeroed_bronze_account() {
    let app = TestApp::new().await;

    let body = account_body(&app, "cust-new").await;
    assert_eq!(body["points"], 0);
    assert_eq!(body["tier"], "BRONZE");
    assert_eq!(body["total_earned"], 0);
    assert_eq!(body["next_tier_progress"]["points_needed"], 200);
    assert!(body["benefits"].as_array().unwrap().len() >= 2);
    assert_eq!(body["history"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_earning_crosses_tier_threshold() {
    let app = TestApp::new().await;

    app.state.ledger.add_points("cust-1", 150, "first booking", None, None).await.unwrap();
    let body = account_body(&app, "cust-1").await;
    assert_eq!(body["points"], 150);
    assert_eq!(body["tier"], "BRONZE");

    app.state.ledger.add_points("cust-1", 60, "second booking", None, None).await.unwrap();
    let body = account_body(&app, "cust-1").await;
    assert_eq!(body["points"], 210);
    assert_eq!(body["tier"], "SILVER");
    assert_eq!(body["total_earned"], 210);
    assert_eq!(body["next_tier_progress"]["points_needed"], 290);
    assert!((body["next_tier_progress"]["percentage"].as_f64().unwrap() - 42.0).abs() < 1e-9);

    assert_eq!(history_sum(&body), 210);
}

#[tokio::test]
async fn test_redeem_over_balance_fails_without_mutation() {
    let app = TestApp::new().await;
    app.state.ledger.add_points("cust-1", 210, "seed", None, None).await.unwrap();

    // Silver rate is 80 points per $10, so $30 needs 240 > 210.
    let res = app.router.clone().oneshot(customer_post(
        "/api/v1/loyalty/redeem", "cust-1",
        &json!({"discount_dollars": 30}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = account_body(&app, "cust-1").await;
    assert_eq!(body["points"], 210);
    assert_eq!(body["total_redeemed"], 0);
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_redeem_moves_tier_back_down() {
    let app = TestApp::new().await;
    app.state.ledger.add_points("cust-1", 210, "seed", None, None).await.unwrap();

    // $10 at the Silver rate debits 80 points.
    let res = app.router.clone().oneshot(customer_post(
        "/api/v1/loyalty/redeem", "cust-1",
        &json!({"discount_dollars": 10, "description": "discount"}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["points_redeemed"], 80);
    assert_eq!(body["discount_dollars"], 10);
    assert_eq!(body["account"]["points"], 130);
    assert_eq!(body["account"]["tier"], "BRONZE");
    assert_eq!(body["account"]["total_redeemed"], 80);

    assert_eq!(history_sum(&body["account"]), 130);
}

#[tokio::test]
async fn test_redeem_validation() {
    let app = TestApp::new().await;

    // No account yet.
    let res = app.router.clone().oneshot(customer_post(
        "/api/v1/loyalty/redeem", "cust-none",
        &json!({"discount_dollars": 10}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    app.state.ledger.add_points("cust-1", 500, "seed", None, None).await.unwrap();

    let res = app.router.clone().oneshot(customer_post(
        "/api/v1/loyalty/redeem", "cust-1",
        &json!({"discount_dollars": 15}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.router.clone().oneshot(customer_post(
        "/api/v1/loyalty/redeem", "cust-1",
        &json!({"discount_dollars": -10}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_adjust_and_expire() {
    let app = TestApp::new().await;
    app.state.ledger.add_points("cust-1", 300, "seed", None, None).await.unwrap();

    let res = app.router.clone().oneshot(admin_request(
        "POST", "/api/v1/admin/loyalty/cust-1/adjust",
        Some(&json!({"points": -50, "description": "double-credit correction"})),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["points"], 250);
    // Adjustments move the balance but not the earned/redeemed aggregates.
    assert_eq!(body["total_earned"], 300);
    assert_eq!(body["total_redeemed"], 0);

    let res = app.router.clone().oneshot(admin_request(
        "POST", "/api/v1/admin/loyalty/cust-1/expire",
        Some(&json!({"points": 100, "description": "2029 points expired"})),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["points"], 150);
    assert_eq!(body["total_expired"], 100);
    assert_eq!(body["tier"], "BRONZE");
    assert_eq!(history_sum(&body), 150);

    // A negative adjustment can never drive the balance below zero.
    let res = app.router.clone().oneshot(admin_request(
        "POST", "/api/v1/admin/loyalty/cust-1/adjust",
        Some(&json!({"points": -9999, "description": "bad idea"})),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = account_body(&app, "cust-1").await;
    assert_eq!(body["points"], 150);
}

#[tokio::test]
async fn test_admin_account_lookup() {
    let app = TestApp::new().await;

    let res = app.router.clone().oneshot(admin_request("GET", "/api/v1/admin/loyalty/ghost", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    app.state.ledger.add_points("cust-1", 1200, "big year", None, None).await.unwrap();
    let res = app.router.clone().oneshot(admin_request("GET", "/api/v1/admin/loyalty/cust-1", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["tier"], "PLATINUM");
    assert_eq!(body["next_tier_progress"]["points_needed"], 0);
    assert_eq!(body["next_tier_progress"]["percentage"], 100.0);
}

#[tokio::test]
async fn test_validation_rejects_bad_amounts() {
    let app = TestApp::new().await;

    assert!(app.state.ledger.add_points("cust-1", 0, "zero", None, None).await.is_err());
    assert!(app.state.ledger.add_points("cust-1", -5, "negative", None, None).await.is_err());
    assert!(app.state.ledger.redeem_points("cust-1", 0, "zero", None).await.is_err());
    assert!(app.state.ledger.adjust_points("cust-1", 0, "zero").await.is_err());

    // Nothing was created by the rejected calls.
    let body = account_body(&app, "cust-1").await;
    assert_eq!(body["history"].as_array().unwrap().len(), 0);
}
