//! Handlers for the institution signup wizard.
//!
//! A wizard session lives in the [`WizardRegistry`](crate::wizard_registry::WizardRegistry)
//! until it is abandoned or submitted. Step edits only touch the session;
//! the profile row is written once, on submit. Durable steps are also
//! mirrored into the draft store so a later session can pick them up.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use tutorhub_core::error::CoreError;
use tutorhub_core::types::{DbId, Timestamp};
use tutorhub_core::wizard::assembler::{ProfileAssembler, ProfileRef, ProfileWrite};
use tutorhub_core::wizard::payload::StepPayload;
use tutorhub_core::wizard::session::{SetOutcome, WizardSession};
use tutorhub_core::wizard::steps::{StepId, TOTAL_STEPS};
use tutorhub_db::repositories::{InstitutionRepo, WizardDraftRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /wizard-sessions`. Send `{}` for a fresh signup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartWizard {
    /// Edit this existing profile instead of creating a new one.
    pub profile_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct SetFieldBody {
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct SelectBody {
    pub selected: bool,
}

/// Session summary plus the full `form_data` read model.
#[derive(Debug, Serialize)]
pub struct WizardSessionView {
    pub id: Uuid,
    pub owner_id: DbId,
    pub profile: Option<ProfileRef>,
    pub current_step: StepId,
    pub current_step_number: u8,
    pub current_step_label: &'static str,
    pub total_steps: u8,
    pub revision: u64,
    pub form_data: Value,
    pub created_at: Timestamp,
    pub last_touched_at: Timestamp,
}

impl From<&WizardSession> for WizardSessionView {
    fn from(session: &WizardSession) -> Self {
        let step = session.current_step();
        Self {
            id: session.id(),
            owner_id: session.owner_id(),
            profile: session.profile(),
            current_step: step,
            current_step_number: step.to_number(),
            current_step_label: step.label(),
            total_steps: TOTAL_STEPS,
            revision: session.context().revision(),
            form_data: session.context().form_data_json(),
            created_at: session.created_at(),
            last_touched_at: session.last_touched_at(),
        }
    }
}

/// One step's hydrated fields.
#[derive(Debug, Serialize)]
pub struct StepView {
    pub step: StepId,
    pub number: u8,
    pub label: &'static str,
    pub payload: StepPayload,
}

impl StepView {
    fn new(payload: StepPayload) -> Self {
        let step = payload.step();
        Self {
            step,
            number: step.to_number(),
            label: step.label(),
            payload,
        }
    }
}

/// Result of a step edit.
#[derive(Debug, Serialize)]
pub struct StepUpdateView {
    pub step: StepId,
    /// Whether the edit reached the session's shared form data.
    pub propagated: bool,
    /// Whether the step was mirrored into the draft store.
    pub draft_saved: bool,
    pub payload: Option<StepPayload>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_step(step: &str) -> AppResult<StepId> {
    Ok(StepId::parse(step)?)
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::Core(CoreError::NotFoundKey {
        entity: "WizardSession",
        key: id.to_string(),
    })
}

/// Lock a session the caller owns and mark it as used.
///
/// A request that was queued on the lock while another one submitted the
/// session sees it as gone.
async fn lock_session(
    state: &AppState,
    id: Uuid,
    auth: &AuthUser,
) -> AppResult<OwnedMutexGuard<WizardSession>> {
    let shared = state.wizards.get(id).await.ok_or_else(|| session_not_found(id))?;
    let mut session = shared.lock_owned().await;
    if session.is_submitted() {
        return Err(session_not_found(id));
    }
    auth.ensure_owner(session.owner_id(), "wizard session")?;
    session.touch();
    Ok(session)
}

/// Mirror a durable step into the draft store. A failed mirror is logged
/// and reported, but the in-session edit stands.
async fn mirror_durable(state: &AppState, session: &WizardSession, outcome: &SetOutcome) -> bool {
    let Some(payload) = &outcome.durable else {
        return false;
    };
    match WizardDraftRepo::upsert(state.gw(), session.owner_id(), outcome.step, payload.to_value())
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(
                session_id = %session.id(),
                step = %outcome.step,
                error = %e,
                "Failed to mirror durable wizard step"
            );
            false
        }
    }
}

async fn step_update_view(
    state: &AppState,
    session: &WizardSession,
    outcome: SetOutcome,
) -> StepUpdateView {
    let draft_saved = mirror_durable(state, session, &outcome).await;
    StepUpdateView {
        step: outcome.step,
        propagated: outcome.propagated,
        draft_saved,
        payload: session.context().step(outcome.step).cloned(),
    }
}

/// Build a session that edits `profile_id`, pre-filled from the stored row.
async fn editing_session(
    state: &AppState,
    auth: &AuthUser,
    profile_id: DbId,
) -> AppResult<WizardSession> {
    let row = InstitutionRepo::find_record(state.gw(), profile_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Institution",
            id: profile_id,
        })?;
    let owner_id = row.get("owner_id").and_then(Value::as_i64).unwrap_or_default();
    auth.ensure_owner(owner_id, "institution")?;
    let profile = ProfileRef::from_row(&row).ok_or_else(|| {
        AppError::InternalError(format!("Institution {profile_id} row has no id"))
    })?;
    Ok(WizardSession::editing(
        auth.user_id,
        profile,
        ProfileAssembler::disassemble(&row),
    ))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions
// ---------------------------------------------------------------------------

/// Start a wizard session for the caller, restoring any mirrored drafts
/// into steps that are still empty.
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<StartWizard>,
) -> AppResult<impl IntoResponse> {
    let mut session = match body.profile_id {
        Some(profile_id) => editing_session(&state, &auth, profile_id).await?,
        None => WizardSession::new(auth.user_id),
    };

    for step in StepId::ALL.into_iter().filter(|s| s.is_durable()) {
        if let Some(draft) = WizardDraftRepo::load(state.gw(), auth.user_id, step).await? {
            let payload = StepPayload::hydrate(step, Some(&draft.payload));
            if session.restore_draft(payload)? {
                tracing::info!(session_id = %session.id(), step = %step, "Restored wizard draft");
            }
        }
    }
    session.open_step(session.current_step())?;

    let view = WizardSessionView::from(&session);
    state.wizards.insert(session).await;

    tracing::info!(
        session_id = %view.id,
        user_id = auth.user_id,
        profile_id = ?body.profile_id,
        "Wizard session started"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// GET /wizard-sessions/{id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = lock_session(&state, id, &auth).await?;
    Ok(Json(DataResponse {
        data: WizardSessionView::from(&*session),
    }))
}

// ---------------------------------------------------------------------------
// DELETE /wizard-sessions/{id}
// ---------------------------------------------------------------------------

/// Abandon a session. Mirrored drafts are kept for the next session.
pub async fn abandon_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let session = lock_session(&state, id, &auth).await?;
    state.wizards.remove(id).await;
    drop(session);

    tracing::info!(session_id = %id, user_id = auth.user_id, "Wizard session abandoned");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /wizard-sessions/{id}/steps/{step}
// ---------------------------------------------------------------------------

/// Hydrate a step's fields from the session's form data.
pub async fn get_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, step)): Path<(Uuid, String)>,
) -> AppResult<impl IntoResponse> {
    let step = parse_step(&step)?;
    let mut session = lock_session(&state, id, &auth).await?;
    let payload = session.open_step(step)?;
    Ok(Json(DataResponse {
        data: StepView::new(payload),
    }))
}

// ---------------------------------------------------------------------------
// PUT /wizard-sessions/{id}/steps/{step}
// ---------------------------------------------------------------------------

/// Replace a step's whole payload.
pub async fn replace_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, step)): Path<(Uuid, String)>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let step = parse_step(&step)?;
    let payload = StepPayload::parse(step, body)?;
    let mut session = lock_session(&state, id, &auth).await?;
    let outcome = session.replace_step(payload)?;

    tracing::info!(session_id = %id, step = %step, "Wizard step replaced");
    let view = step_update_view(&state, &session, outcome).await;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PUT /wizard-sessions/{id}/steps/{step}/fields/{field}
// ---------------------------------------------------------------------------

/// Overwrite a single field of a step.
pub async fn set_field(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, step, field)): Path<(Uuid, String, String)>,
    Json(body): Json<SetFieldBody>,
) -> AppResult<impl IntoResponse> {
    let step = parse_step(&step)?;
    let mut session = lock_session(&state, id, &auth).await?;
    let outcome = session.set_field(step, &field, body.value)?;

    tracing::debug!(session_id = %id, step = %step, field = %field, "Wizard field set");
    let view = step_update_view(&state, &session, outcome).await;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/course-categories/{category}
// ---------------------------------------------------------------------------

/// Select or de-select a course category.
pub async fn select_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, category)): Path<(Uuid, String)>,
    Json(body): Json<SelectBody>,
) -> AppResult<impl IntoResponse> {
    let mut session = lock_session(&state, id, &auth).await?;
    let outcome = session.select_category(&category, body.selected)?;

    tracing::debug!(session_id = %id, category = %category, selected = body.selected, "Course category toggled");
    let view = step_update_view(&state, &session, outcome).await;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/course-categories/{category}/subjects/{subject}
// ---------------------------------------------------------------------------

/// Add or remove a subject under a selected category.
pub async fn select_subject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, category, subject)): Path<(Uuid, String, String)>,
    Json(body): Json<SelectBody>,
) -> AppResult<impl IntoResponse> {
    let mut session = lock_session(&state, id, &auth).await?;
    let outcome = session.set_subject(&category, &subject, body.selected)?;
    let view = step_update_view(&state, &session, outcome).await;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/advance, /go-back
// ---------------------------------------------------------------------------

/// Move to the next step once the current one passes its required fields.
pub async fn advance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut session = lock_session(&state, id, &auth).await?;
    let from = session.current_step();
    let to = session.advance()?;

    tracing::info!(session_id = %id, from_step = %from, to_step = %to, "Wizard advanced");
    Ok(Json(DataResponse {
        data: WizardSessionView::from(&*session),
    }))
}

pub async fn go_back(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut session = lock_session(&state, id, &auth).await?;
    let from = session.current_step();
    let to = session.go_back()?;

    tracing::info!(session_id = %id, from_step = %from, to_step = %to, "Wizard went back");
    Ok(Json(DataResponse {
        data: WizardSessionView::from(&*session),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/submit
// ---------------------------------------------------------------------------

/// Validate every step and write the profile in one operation.
///
/// On success the session is destroyed and the caller's drafts are cleared.
/// On failure the session stays, so the user can fix and resubmit.
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut session = lock_session(&state, id, &auth).await?;
    session.validate_all()?;

    let write = session.submission();
    let created = matches!(write, ProfileWrite::Insert(_));
    let institution = InstitutionRepo::save_profile(state.gw(), write).await?;
    session.mark_submitted();

    if let Err(e) = WizardDraftRepo::clear(state.gw(), session.owner_id()).await {
        tracing::warn!(session_id = %id, error = %e, "Failed to clear wizard drafts");
    }
    state.wizards.remove(id).await;
    drop(session);

    tracing::info!(
        session_id = %id,
        institution_id = institution.id,
        version = institution.version,
        created,
        "Wizard submitted"
    );

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: institution })))
}
