//! Handlers for saved institution profiles.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_core::wizard::payload::StepPayload;
use tutorhub_core::wizard::steps::StepId;
use tutorhub_db::models::institution::Institution;
use tutorhub_db::repositories::InstitutionRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `PATCH /institutions/{id}/steps/{step}`.
#[derive(Debug, Deserialize)]
pub struct PatchStepBody {
    /// Version the caller last read. Omit to patch whatever is current.
    pub version: Option<i64>,
    pub payload: Value,
}

/// Load an institution, 404 if absent.
pub(crate) async fn find_institution(state: &AppState, id: DbId) -> AppResult<Institution> {
    InstitutionRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Institution",
                id,
            }
            .into()
        })
}

/// Load an institution the caller owns.
pub(crate) async fn owned_institution(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Institution> {
    let institution = find_institution(state, id).await?;
    auth.ensure_owner(institution.owner_id, "institution")?;
    Ok(institution)
}

/// GET /api/v1/institutions
///
/// Profiles owned by the caller.
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let institutions = InstitutionRepo::find_by_owner(state.gw(), auth.user_id).await?;
    Ok(Json(DataResponse { data: institutions }))
}

/// GET /api/v1/institutions/{id}
pub async fn get_institution(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let institution = find_institution(&state, id).await?;
    Ok(Json(DataResponse { data: institution }))
}

/// PATCH /api/v1/institutions/{id}/steps/{step}
///
/// Save one step from the profile edit dialog. Only that step's columns or
/// blob are written.
pub async fn patch_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, step)): Path<(DbId, String)>,
    Json(body): Json<PatchStepBody>,
) -> AppResult<impl IntoResponse> {
    let step = StepId::parse(&step)?;
    owned_institution(&state, &auth, id).await?;

    let payload = StepPayload::parse(step, body.payload)?;
    payload.check_required().into_result()?;

    let institution = InstitutionRepo::patch_step(state.gw(), id, body.version, &payload).await?;

    tracing::info!(
        institution_id = id,
        step = %step,
        version = institution.version,
        user_id = auth.user_id,
        "Institution step patched"
    );

    Ok(Json(DataResponse { data: institution }))
}
