#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tutorhub_api::auth::jwt::{generate_access_token, JwtConfig};
use tutorhub_api::config::{ServerConfig, StorageBackend};
use tutorhub_api::router::build_app_router;
use tutorhub_api::state::AppState;
use tutorhub_core::roles::{ROLE_ADMIN, ROLE_USER};
use tutorhub_core::types::DbId;
use tutorhub_core::wizard::assembler::ProfileAssembler;
use tutorhub_core::wizard::context::StepContext;
use tutorhub_core::wizard::payload::{BasicInfoStep, StepPayload};
use tutorhub_db::gateway::MemoryGateway;
use tutorhub_db::repositories::InstitutionRepo;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` backed by the in-memory store.
///
/// Listing times are rendered in UTC so expected strings stay fixed.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage: StorageBackend::Memory,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        wizard_session_ttl_mins: 120,
        display_utc_offset_minutes: 0,
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// The store is returned too, so tests can seed rows and count them.
pub fn build_test_app() -> (Router, Arc<MemoryGateway>) {
    let config = test_config();
    let gateway = Arc::new(MemoryGateway::new());
    let state = AppState::new(gateway.clone(), config.clone());
    (build_app_router(state, &config), gateway)
}

pub fn token_for(user_id: DbId) -> String {
    generate_access_token(user_id, ROLE_USER, &test_config().jwt).unwrap()
}

pub fn admin_token(user_id: DbId) -> String {
    generate_access_token(user_id, ROLE_ADMIN, &test_config().jwt).unwrap()
}

/// Insert a minimal institution profile owned by `owner_id`.
pub async fn seed_institution(gw: &MemoryGateway, owner_id: DbId, name: &str) -> DbId {
    let mut context = StepContext::new();
    context.update_step(StepPayload::BasicInfo(BasicInfoStep {
        institution_name: name.to_string(),
        institution_type: "coaching".to_string(),
        ..Default::default()
    }));
    let write = ProfileAssembler::write_for(&context, owner_id, None);
    InstitutionRepo::save_profile(gw, write).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, token, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
