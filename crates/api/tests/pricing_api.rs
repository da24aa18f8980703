mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, delete, get, post_json, put_json, token_for};
use serde_json::json;

const ADMIN: i64 = 1;

fn pro_tier() -> serde_json::Value {
    json!({
        "name": "Pro",
        "description": "For growing institutes",
        "price": 999.0,
        "billing_period": "monthly",
        "features": ["  Unlimited courses ", "", "Priority support"],
        "sort_order": 2
    })
}

#[tokio::test]
async fn non_admin_cannot_create_tier() {
    let (app, _) = common::build_test_app();
    let response = post_json(&app, "/api/v1/pricing-tiers", Some(&token_for(9)), pro_tier()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_creates_tier_with_normalized_features() {
    let (app, _) = common::build_test_app();
    let response = post_json(&app, "/api/v1/pricing-tiers", Some(&admin_token(ADMIN)), pro_tier()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tier = body_json(response).await["data"].clone();
    assert_eq!(tier["features"], json!(["Unlimited courses", "Priority support"]));
    assert_eq!(tier["is_active"], true);

    // Reads are public.
    let list = body_json(get(&app, "/api/v1/pricing-tiers", None).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_billing_period_is_a_field_error() {
    let (app, _) = common::build_test_app();
    let mut body = pro_tier();
    body["billing_period"] = json!("weekly");
    body["price"] = json!(-1.0);

    let response = post_json(&app, "/api/v1/pricing-tiers", Some(&admin_token(ADMIN)), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["billing_period"].is_array());
    assert!(json["fields"]["price"].is_array());
}

#[tokio::test]
async fn toggled_tier_is_hidden_by_default() {
    let (app, _) = common::build_test_app();
    let admin = admin_token(ADMIN);
    let response = post_json(&app, "/api/v1/pricing-tiers", Some(&admin), pro_tier()).await;
    let id = body_json(response).await["data"]["id"].clone();

    let uri = format!("/api/v1/pricing-tiers/{id}/toggle-active");
    let response = post_json(&app, &uri, Some(&admin), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let visible = body_json(get(&app, "/api/v1/pricing-tiers", None).await).await;
    assert!(visible["data"].as_array().unwrap().is_empty());

    let all = body_json(get(&app, "/api/v1/pricing-tiers?include_inactive=true", None).await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn partial_update_is_checked_against_stored_tier() {
    let (app, _) = common::build_test_app();
    let admin = admin_token(ADMIN);
    let response = post_json(&app, "/api/v1/pricing-tiers", Some(&admin), pro_tier()).await;
    let id = body_json(response).await["data"]["id"].clone();
    let uri = format!("/api/v1/pricing-tiers/{id}");

    let response = put_json(&app, &uri, Some(&admin), json!({ "price": 1299.0 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let tier = body_json(response).await["data"].clone();
    assert_eq!(tier["price"], 1299.0);
    assert_eq!(tier["name"], "Pro");

    let response = put_json(&app, &uri, Some(&admin), json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(delete(&app, &uri, Some(&admin)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri, None).await.status(), StatusCode::NOT_FOUND);
}
