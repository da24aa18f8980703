//! Handlers for subscription pricing tiers.
//!
//! Anyone can read the active tiers; creating, editing, toggling and
//! deleting require the `admin` role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tutorhub_core::error::CoreError;
use tutorhub_core::pricing::{normalize_features, validate_tier};
use tutorhub_core::types::DbId;
use tutorhub_db::models::pricing_tier::{CreatePricingTier, UpdatePricingTier};
use tutorhub_db::models::validate_input;
use tutorhub_db::repositories::PricingTierRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "PricingTier",
        id,
    }
}

/// GET /api/v1/pricing-tiers?include_inactive=
pub async fn list_tiers(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let tiers = PricingTierRepo::list(state.gw(), !params.include_inactive).await?;
    Ok(Json(DataResponse { data: tiers }))
}

/// GET /api/v1/pricing-tiers/{id}
pub async fn get_tier(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tier = PricingTierRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: tier }))
}

/// POST /api/v1/pricing-tiers
pub async fn create_tier(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreatePricingTier>,
) -> AppResult<impl IntoResponse> {
    input.features = normalize_features(input.features);
    validate_input(&input)?;
    validate_tier(&input.name, input.price, &input.billing_period, &input.features)
        .into_result()?;

    let tier = PricingTierRepo::create(state.gw(), &input).await?;

    tracing::info!(
        tier_id = tier.id,
        name = %tier.name,
        user_id = admin.user_id,
        "Pricing tier created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: tier })))
}

/// PUT /api/v1/pricing-tiers/{id}
///
/// The patch is checked against the stored tier, so a partial update cannot
/// leave the tier invalid.
pub async fn update_tier(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdatePricingTier>,
) -> AppResult<impl IntoResponse> {
    input.features = input.features.map(normalize_features);
    validate_input(&input)?;

    let current = PricingTierRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    validate_tier(
        input.name.as_deref().unwrap_or(&current.name),
        input.price.unwrap_or(current.price),
        input
            .billing_period
            .as_deref()
            .unwrap_or(&current.billing_period),
        input.features.as_deref().unwrap_or(&current.features),
    )
    .into_result()?;

    let tier = PricingTierRepo::update(state.gw(), id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(tier_id = id, user_id = admin.user_id, "Pricing tier updated");
    Ok(Json(DataResponse { data: tier }))
}

/// POST /api/v1/pricing-tiers/{id}/toggle-active
pub async fn toggle_tier(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tier = PricingTierRepo::toggle_active(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        tier_id = id,
        is_active = tier.is_active,
        user_id = admin.user_id,
        "Pricing tier toggled"
    );
    Ok(Json(DataResponse { data: tier }))
}

/// DELETE /api/v1/pricing-tiers/{id}
pub async fn delete_tier(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PricingTierRepo::delete(state.gw(), id).await? {
        return Err(not_found(id).into());
    }

    tracing::info!(tier_id = id, user_id = admin.user_id, "Pricing tier deleted");
    Ok(StatusCode::NO_CONTENT)
}
