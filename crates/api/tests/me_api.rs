mod common;

use axum::http::StatusCode;
use common::{body_json, get, token_for};
use serde_json::json;
use tutorhub_core::gateway::{PersistenceGateway, Table};

#[tokio::test]
async fn me_returns_the_stored_user() {
    let (app, gw) = common::build_test_app();
    let row = json!({ "email": "tutor@example.com" }).as_object().cloned().unwrap();
    let user = gw.insert(Table::Users, row).await.unwrap();
    let id = user["id"].as_i64().unwrap();

    let response = get(&app, "/api/v1/me", Some(&token_for(id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["email"], "tutor@example.com");
    assert!(json["data"]["email_confirmed_at"].is_null());
}

#[tokio::test]
async fn me_for_unknown_user_is_404() {
    let (app, _) = common::build_test_app();
    let response = get(&app, "/api/v1/me", Some(&token_for(404))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_rejects_a_bad_token() {
    let (app, _) = common::build_test_app();
    let response = get(&app, "/api/v1/me", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
