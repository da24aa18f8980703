//! `AppError` to HTTP response mapping, called directly through
//! `IntoResponse` without a server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use tutorhub_api::error::{AppError, GENERIC_ERROR_MESSAGE};
use tutorhub_core::error::CoreError;
use tutorhub_core::gateway::GatewayError;
use tutorhub_core::validation::FieldErrors;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Course",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Course with id 42 not found");
}

#[tokio::test]
async fn field_validation_lists_fields() {
    let mut errors = FieldErrors::new();
    errors.add("email", "email is required");
    errors.add("city", "city is required");

    let (status, json) = error_to_response(AppError::Core(CoreError::FieldValidation(errors))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["email"][0], "email is required");
    assert_eq!(json["fields"]["city"][0], "city is required");
}

#[tokio::test]
async fn plain_validation_has_no_fields() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad step".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad step");
    assert!(json.get("fields").is_none());
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Conflict("stale profile".into()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "stale profile");
}

#[tokio::test]
async fn unique_violation_returns_409() {
    let err = AppError::Gateway(GatewayError::UniqueViolation {
        constraint: "uq_enrollments_course_student".into(),
    });
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("uq_enrollments_course_student"));
}

#[tokio::test]
async fn backend_failure_is_sanitized() {
    let err = AppError::Gateway(GatewayError::Backend("password=hunter2 refused".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn internal_error_is_sanitized() {
    let (status, json) =
        error_to_response(AppError::InternalError("secret leaked".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn forbidden_and_unauthorized_keep_messages() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("Admin role required".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "Admin role required");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("expired".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}
