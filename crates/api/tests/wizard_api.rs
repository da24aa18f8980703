//! HTTP-level tests for the institution signup wizard.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, post_json, put_json, token_for};
use serde_json::{json, Value};
use tutorhub_core::gateway::Table;

const OWNER: i64 = 11;

async fn start_session(app: &axum::Router, token: &str, body: Value) -> Value {
    let response = post_json(app, "/api/v1/wizard-sessions", Some(token), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn set_field(app: &axum::Router, token: &str, id: &str, step: &str, field: &str, value: Value) -> Value {
    let uri = format!("/api/v1/wizard-sessions/{id}/steps/{step}/fields/{field}");
    let response = put_json(app, &uri, Some(token), json!({ "value": value })).await;
    assert_eq!(response.status(), StatusCode::OK, "setting {step}.{field}");
    body_json(response).await["data"].clone()
}

async fn advance(app: &axum::Router, token: &str, id: &str) -> axum::response::Response {
    let uri = format!("/api/v1/wizard-sessions/{id}/advance");
    post_json(app, &uri, Some(token), json!({})).await
}

/// Fill the three steps with required fields.
async fn fill_required(app: &axum::Router, token: &str, id: &str) {
    set_field(app, token, id, "basic_info", "institutionName", json!("Apex Tutorials")).await;
    set_field(app, token, id, "basic_info", "institutionType", json!("coaching")).await;
    set_field(app, token, id, "contact", "email", json!("apex@tutorials.in")).await;
    set_field(app, token, id, "contact", "phone", json!("9000000000")).await;
    set_field(app, token, id, "contact", "city", json!("Pune")).await;
    let uri = format!("/api/v1/wizard-sessions/{id}/course-categories/CBSE");
    let response = post_json(app, &uri, Some(token), json!({ "selected": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_session_returns_first_step() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);

    let session = start_session(&app, &token, json!({})).await;

    assert!(session["id"].is_string());
    assert_eq!(session["owner_id"], OWNER);
    assert_eq!(session["current_step"], "basic_info");
    assert_eq!(session["current_step_number"], 1);
    assert_eq!(session["total_steps"], 6);
    assert!(session["profile"].is_null());
}

#[tokio::test]
async fn session_requires_authentication() {
    let (app, _) = common::build_test_app();
    let response = post_json(&app, "/api/v1/wizard-sessions", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn other_users_cannot_touch_a_session() {
    let (app, _) = common::build_test_app();
    let session = start_session(&app, &token_for(OWNER), json!({})).await;
    let id = session["id"].as_str().unwrap();

    let intruder = token_for(99);
    let response = get(&app, &format!("/api/v1/wizard-sessions/{id}"), Some(&intruder)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn abandoned_session_is_gone() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let uri = format!("/api/v1/wizard-sessions/{id}");
    assert_eq!(delete(&app, &uri, Some(&token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_step_is_rejected() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let uri = format!("/api/v1/wizard-sessions/{id}/steps/payments");
    let response = get(&app, &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Step edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn written_step_reads_back_with_defaults() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let uri = format!("/api/v1/wizard-sessions/{id}/steps/contact");
    let response = put_json(&app, &uri, Some(&token), json!({ "city": "Pune", "pincode": "411001" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let step = body_json(get(&app, &uri, Some(&token)).await).await["data"].clone();
    assert_eq!(step["step"], "contact");
    assert_eq!(step["label"], "Contact & Location");
    assert_eq!(step["payload"]["city"], "Pune");
    assert_eq!(step["payload"]["pincode"], "411001");
    assert_eq!(step["payload"]["email"], "");
}

#[tokio::test]
async fn mistyped_field_value_is_a_field_error() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let uri = format!("/api/v1/wizard-sessions/{id}/steps/basic_info/fields/institutionName");
    let response = put_json(&app, &uri, Some(&token), json!({ "value": { "nested": true } })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["institutionName"].is_array());
}

#[tokio::test]
async fn cbse_selection_and_two_subjects() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let category = format!("/api/v1/wizard-sessions/{id}/course-categories/CBSE");
    let response = post_json(&app, &category, Some(&token), json!({ "selected": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let update = body_json(response).await["data"].clone();
    assert_eq!(update["step"], "courses");
    assert_eq!(update["propagated"], true);
    assert_eq!(update["draft_saved"], false);
    assert_eq!(update["payload"]["courseCategories"]["CBSE"], true);
    assert_eq!(
        update["payload"]["courseDetails"]["CBSE"]["subjectsOffered"],
        json!([])
    );

    for subject in ["Mathematics", "Science"] {
        let uri = format!("{category}/subjects/{subject}");
        let response = post_json(&app, &uri, Some(&token), json!({ "selected": true })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let view = body_json(get(&app, &format!("/api/v1/wizard-sessions/{id}"), Some(&token)).await)
        .await["data"]
        .clone();
    let subjects = &view["form_data"]["courses"]["courseDetails"]["CBSE"]["subjectsOffered"];
    assert_eq!(subjects.as_array().unwrap().len(), 2);

    // De-selecting keeps the detail.
    let response = post_json(&app, &category, Some(&token), json!({ "selected": false })).await;
    let update = body_json(response).await["data"].clone();
    assert_eq!(update["payload"]["courseCategories"]["CBSE"], false);
    assert_eq!(
        update["payload"]["courseDetails"]["CBSE"]["subjectsOffered"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn subject_for_unselected_category_is_rejected() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let uri = format!("/api/v1/wizard-sessions/{id}/course-categories/IB/subjects/Physics");
    let response = post_json(&app, &uri, Some(&token), json!({ "selected": true })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn advance_checks_required_fields() {
    let (app, _) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let response = advance(&app, &token, id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["institutionName"].is_array());
    assert!(json["fields"]["institutionType"].is_array());

    set_field(&app, &token, id, "basic_info", "institutionName", json!("Apex Tutorials")).await;
    set_field(&app, &token, id, "basic_info", "institutionType", json!("coaching")).await;
    let response = advance(&app, &token, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["current_step"], "contact");
    assert_eq!(view["current_step_number"], 2);

    let uri = format!("/api/v1/wizard-sessions/{id}/go-back");
    let view = body_json(post_json(&app, &uri, Some(&token), json!({})).await).await["data"].clone();
    assert_eq!(view["current_step"], "basic_info");
    assert_eq!(view["form_data"]["basic_info"]["institutionName"], "Apex Tutorials");
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_creates_profile_and_ends_session() {
    let (app, gw) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();
    fill_required(&app, &token, id).await;

    let uri = format!("/api/v1/wizard-sessions/{id}/submit");
    let response = post_json(&app, &uri, Some(&token), json!({})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let profile = body_json(response).await["data"].clone();
    assert_eq!(profile["name"], "Apex Tutorials");
    assert_eq!(profile["city"], "Pune");
    assert_eq!(profile["owner_id"], OWNER);
    assert_eq!(profile["version"], 1);
    assert_eq!(profile["step3_data"]["courseCategories"]["CBSE"], true);
    assert_eq!(gw.row_count(Table::Institutions).await, 1);

    let session_uri = format!("/api/v1/wizard-sessions/{id}");
    assert_eq!(get(&app, &session_uri, Some(&token)).await.status(), StatusCode::NOT_FOUND);

    let mine = body_json(get(&app, "/api/v1/institutions", Some(&token)).await).await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_submits_write_one_profile() {
    let (app, gw) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();
    fill_required(&app, &token, id).await;

    let uri = format!("/api/v1/wizard-sessions/{id}/submit");
    let (first, second) = tokio::join!(
        post_json(&app, &uri, Some(&token), json!({})),
        post_json(&app, &uri, Some(&token), json!({})),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::NOT_FOUND]);
    assert_eq!(gw.row_count(Table::Institutions).await, 1);
}

#[tokio::test]
async fn submit_with_missing_fields_keeps_session() {
    let (app, gw) = common::build_test_app();
    let token = token_for(OWNER);
    let session = start_session(&app, &token, json!({})).await;
    let id = session["id"].as_str().unwrap();

    let uri = format!("/api/v1/wizard-sessions/{id}/submit");
    let response = post_json(&app, &uri, Some(&token), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["courseCategories"].is_array());
    assert!(json["fields"]["city"].is_array());
    assert_eq!(gw.row_count(Table::Institutions).await, 0);

    let session_uri = format!("/api/v1/wizard-sessions/{id}");
    assert_eq!(get(&app, &session_uri, Some(&token)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn editing_session_is_prefilled_and_stale_submit_conflicts() {
    let (app, gw) = common::build_test_app();
    let token = token_for(OWNER);
    let profile_id = common::seed_institution(&gw, OWNER, "Apex Tutorials").await;

    let session = start_session(&app, &token, json!({ "profile_id": profile_id })).await;
    let id = session["id"].as_str().unwrap().to_string();
    assert_eq!(session["profile"]["id"], profile_id);
    assert_eq!(session["profile"]["version"], 1);
    assert_eq!(session["form_data"]["basic_info"]["institutionName"], "Apex Tutorials");

    // A concurrent single-step edit bumps the version.
    let patch_uri = format!("/api/v1/institutions/{profile_id}/steps/facilities");
    let response = patch_json(
        &app,
        &patch_uri,
        Some(&token),
        json!({ "version": 1, "payload": { "libraryAvailable": true } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await["data"].clone();
    assert_eq!(patched["version"], 2);
    assert_eq!(patched["name"], "Apex Tutorials");

    fill_required(&app, &token, &id).await;
    let uri = format!("/api/v1/wizard-sessions/{id}/submit");
    let response = post_json(&app, &uri, Some(&token), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn editing_someone_elses_profile_is_forbidden() {
    let (app, gw) = common::build_test_app();
    let profile_id = common::seed_institution(&gw, OWNER, "Apex Tutorials").await;

    let response = post_json(
        &app,
        "/api/v1/wizard-sessions",
        Some(&token_for(99)),
        json!({ "profile_id": profile_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Durable fees step
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fees_step_survives_an_abandoned_session() {
    let (app, gw) = common::build_test_app();
    let token = token_for(OWNER);
    let first = start_session(&app, &token, json!({})).await;
    let id = first["id"].as_str().unwrap();

    let update = set_field(&app, &token, id, "fees", "refundPolicy", json!("Pro-rata")).await;
    assert_eq!(update["draft_saved"], true);
    assert_eq!(gw.row_count(Table::WizardDrafts).await, 1);

    let basic = set_field(&app, &token, id, "basic_info", "description", json!("Evening")).await;
    assert_eq!(basic["draft_saved"], false);

    delete(&app, &format!("/api/v1/wizard-sessions/{id}"), Some(&token)).await;

    let second = start_session(&app, &token, json!({})).await;
    assert_eq!(second["form_data"]["fees"]["refundPolicy"], "Pro-rata");
    assert!(second["form_data"]["basic_info"].is_null());
}
