//! Handlers for contact-form inquiries.
//!
//! Submitting an inquiry is public. Reading and working the pipeline is
//! limited to the owner of the institution the inquiry was sent to.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tutorhub_core::error::CoreError;
use tutorhub_core::inquiry::{validate_inquiry, validate_status};
use tutorhub_core::types::DbId;
use tutorhub_db::models::inquiry::{CreateInquiry, Inquiry, UpdateInquiry};
use tutorhub_db::models::validate_input;
use tutorhub_db::repositories::InquiryRepo;

use super::institution::{find_institution, owned_institution};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct InquiryListParams {
    pub institution_id: DbId,
    pub status: Option<String>,
}

async fn owned_inquiry(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Inquiry> {
    let inquiry = InquiryRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Inquiry",
            id,
        })?;
    owned_institution(state, auth, inquiry.institution_id).await?;
    Ok(inquiry)
}

/// POST /api/v1/inquiries
///
/// Public contact form. No authentication.
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(input): Json<CreateInquiry>,
) -> AppResult<impl IntoResponse> {
    let mut errors = validate_inquiry(&input.name, &input.email, &input.message);
    if let Err(CoreError::FieldValidation(more)) = validate_input(&input) {
        errors.merge(more);
    }
    errors.into_result()?;
    find_institution(&state, input.institution_id).await?;

    let inquiry = InquiryRepo::create(state.gw(), &input).await?;

    tracing::info!(
        inquiry_id = inquiry.id,
        institution_id = inquiry.institution_id,
        course_id = ?inquiry.course_id,
        "Inquiry received"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: inquiry })))
}

/// GET /api/v1/inquiries?institution_id=&status=&limit=&offset=
pub async fn list_inquiries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<InquiryListParams>,
    Query(paging): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    owned_institution(&state, &auth, params.institution_id).await?;
    let status = params.status.as_deref().filter(|s| !s.is_empty());
    if let Some(status) = status {
        validate_status(status)?;
    }

    let page = paging.page(DEFAULT_LIMIT, MAX_LIMIT);
    let inquiries = InquiryRepo::list(state.gw(), params.institution_id, status, page).await?;

    Ok(Json(PageResponse::new(inquiries, page)))
}

/// GET /api/v1/inquiries/{id}
pub async fn get_inquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let inquiry = owned_inquiry(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: inquiry }))
}

/// PUT /api/v1/inquiries/{id}
///
/// Move the inquiry along the pipeline and/or edit its notes.
pub async fn update_inquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInquiry>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    let current = owned_inquiry(&state, &auth, id).await?;

    let inquiry = InquiryRepo::update(state.gw(), id, &input).await?;

    tracing::info!(
        inquiry_id = id,
        from = %current.status,
        to = %inquiry.status,
        "Inquiry updated"
    );

    Ok(Json(DataResponse { data: inquiry }))
}
