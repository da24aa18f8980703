mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json, token_for};
use serde_json::{json, Value};

const TUTOR: i64 = 5;

/// Only the fields a tutor must fill in; the rest take column defaults.
fn math_101() -> Value {
    json!({
        "title": "Math 101",
        "subject": "Mathematics",
        "start_time": "2030-01-15T10:00:00Z",
        "max_students": 10
    })
}

async fn create_course(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = post_json(app, "/api/v1/courses", Some(token), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn created_course_shows_in_listing_with_display_fields() {
    let (app, _) = common::build_test_app();
    let token = token_for(TUTOR);

    let course = create_course(&app, &token, math_101()).await;
    assert_eq!(course["tutor_id"], TUTOR);
    assert_eq!(course["is_active"], true);
    assert_eq!(course["duration_hours"], 1);
    assert_eq!(course["price"], 0.0);
    assert_eq!(course["description"], "");

    // Listing is public.
    let response = get(&app, "/api/v1/courses", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await["data"].clone();
    let rows = listing.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Math 101");
    assert_eq!(rows[0]["source"], "tutor");
    assert_eq!(rows[0]["status_label"], "Active");
    assert_eq!(rows[0]["start_display"], "1/15/2030, 10:00:00 AM");
}

#[tokio::test]
async fn create_course_validates_input() {
    let (app, _) = common::build_test_app();
    let mut body = math_101();
    body["title"] = json!("");
    body["max_students"] = json!(0);

    let response = post_json(&app, "/api/v1/courses", Some(&token_for(TUTOR)), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_course_requires_authentication() {
    let (app, _) = common::build_test_app();
    let response = post_json(&app, "/api/v1/courses", None, math_101()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn toggle_flips_status_label() {
    let (app, _) = common::build_test_app();
    let token = token_for(TUTOR);
    let id = create_course(&app, &token, math_101()).await["id"].clone();

    let uri = format!("/api/v1/courses/{id}/toggle-active");
    let response = post_json(&app, &uri, Some(&token), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    let listing = body_json(get(&app, &format!("/api/v1/courses/{id}"), None).await).await;
    assert_eq!(listing["data"]["status_label"], "Inactive");

    let active_only = body_json(get(&app, "/api/v1/courses?active=true", None).await).await;
    assert!(active_only["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn only_the_tutor_can_change_a_course() {
    let (app, _) = common::build_test_app();
    let id = create_course(&app, &token_for(TUTOR), math_101()).await["id"].clone();
    let other = token_for(77);
    let uri = format!("/api/v1/courses/{id}");

    let response = put_json(&app, &uri, Some(&other), json!({ "price": 1.0 })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(delete(&app, &uri, Some(&other)).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_and_delete_course() {
    let (app, _) = common::build_test_app();
    let token = token_for(TUTOR);
    let id = create_course(&app, &token, math_101()).await["id"].clone();
    let uri = format!("/api/v1/courses/{id}");

    let response = put_json(&app, &uri, Some(&token), json!({ "title": "Math 102" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["title"], "Math 102");
    assert_eq!(updated["subject"], "Mathematics");

    assert_eq!(delete(&app, &uri, Some(&token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn institution_courses_join_the_unified_listing() {
    let (app, gw) = common::build_test_app();
    let owner = token_for(TUTOR);
    let institution_id = common::seed_institution(&gw, TUTOR, "Apex Tutorials").await;

    create_course(&app, &owner, math_101()).await;
    let response = post_json(
        &app,
        "/api/v1/institution-courses",
        Some(&owner),
        json!({
            "institution_id": institution_id,
            "title": "JEE Foundation",
            "category": "Engineering",
            "duration": "12 weeks",
            "fee": 15000.0,
            "start_date": "2029-06-01T04:30:00Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let listing = body_json(get(&app, "/api/v1/courses", None).await).await["data"].clone();
    let rows = listing.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Soonest start first.
    assert_eq!(rows[0]["title"], "JEE Foundation");
    assert_eq!(rows[0]["source"], "institution");
    assert_eq!(rows[0]["subject"], "Engineering");
    assert_eq!(rows[0]["duration_hours"], 12);
    assert_eq!(rows[0]["max_students"], 50);
    assert_eq!(rows[1]["title"], "Math 101");

    let search = body_json(get(&app, "/api/v1/courses?search=jee", None).await).await;
    assert_eq!(search["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn institution_course_requires_owning_the_institution() {
    let (app, gw) = common::build_test_app();
    let institution_id = common::seed_institution(&gw, TUTOR, "Apex Tutorials").await;

    let response = post_json(
        &app,
        "/api/v1/institution-courses",
        Some(&token_for(77)),
        json!({
            "institution_id": institution_id,
            "title": "Crash Course",
            "category": "Medical",
            "fee": 100.0
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
