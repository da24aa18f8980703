//! Handlers for course batches.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tutorhub_core::batch::validate_batch;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::batch::{Batch, CreateBatch, UpdateBatch};
use tutorhub_db::models::validate_input;
use tutorhub_db::repositories::BatchRepo;

use super::institution::owned_institution;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchListParams {
    pub course_id: Option<DbId>,
    pub institution_id: Option<DbId>,
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Batch",
        id,
    }
}

async fn owned_batch(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Batch> {
    let batch = BatchRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    owned_institution(state, auth, batch.institution_id).await?;
    Ok(batch)
}

/// GET /api/v1/batches?course_id=&institution_id=
pub async fn list_batches(
    State(state): State<AppState>,
    Query(params): Query<BatchListParams>,
) -> AppResult<impl IntoResponse> {
    let batches = BatchRepo::list(state.gw(), params.course_id, params.institution_id).await?;
    Ok(Json(DataResponse { data: batches }))
}

/// GET /api/v1/batches/{id}
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let batch = BatchRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: batch }))
}

/// POST /api/v1/batches
pub async fn create_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateBatch>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    validate_batch(&input.name, input.start_date, input.end_date, input.capacity).into_result()?;
    owned_institution(&state, &auth, input.institution_id).await?;

    let batch = BatchRepo::create(state.gw(), &input).await?;

    tracing::info!(
        batch_id = batch.id,
        institution_id = batch.institution_id,
        course_id = ?batch.course_id,
        "Batch created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: batch })))
}

/// PUT /api/v1/batches/{id}
///
/// The patch is overlaid on the stored batch and the result re-validated,
/// so a new end date is checked against the existing start date.
pub async fn update_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBatch>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    let current = owned_batch(&state, &auth, id).await?;
    let (name, start_date, end_date, capacity) = input.merged_with(&current);
    validate_batch(&name, start_date, end_date, capacity).into_result()?;

    let batch = BatchRepo::update(state.gw(), id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(batch_id = id, "Batch updated");
    Ok(Json(DataResponse { data: batch }))
}

/// POST /api/v1/batches/{id}/toggle-active
pub async fn toggle_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    owned_batch(&state, &auth, id).await?;

    let batch = BatchRepo::toggle_active(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(batch_id = id, is_active = batch.is_active, "Batch toggled");
    Ok(Json(DataResponse { data: batch }))
}

/// DELETE /api/v1/batches/{id}
pub async fn delete_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_batch(&state, &auth, id).await?;

    if !BatchRepo::delete(state.gw(), id).await? {
        return Err(not_found(id).into());
    }

    tracing::info!(batch_id = id, "Batch deleted");
    Ok(StatusCode::NO_CONTENT)
}
