//! Repository for the `pricing_tiers` table.

use tutorhub_core::gateway::{GatewayError, PersistenceGateway, Query, Table};
use tutorhub_core::types::DbId;

use super::rows;
use crate::models::pricing_tier::{CreatePricingTier, PricingTier, UpdatePricingTier};
use crate::models::to_record;

pub struct PricingTierRepo;

impl PricingTierRepo {
    /// List tiers in display order.
    pub async fn list(
        gw: &dyn PersistenceGateway,
        active_only: bool,
    ) -> Result<Vec<PricingTier>, GatewayError> {
        let mut query = Query::new().order_by("sort_order", true).order_by("id", true);
        if active_only {
            query = query.eq("is_active", true);
        }
        rows::fetch_all(gw, Table::PricingTiers, &query).await
    }

    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<PricingTier>, GatewayError> {
        rows::find_by_id(gw, Table::PricingTiers, id).await
    }

    pub async fn create(
        gw: &dyn PersistenceGateway,
        input: &CreatePricingTier,
    ) -> Result<PricingTier, GatewayError> {
        rows::insert(gw, Table::PricingTiers, to_record(input)?).await
    }

    pub async fn update(
        gw: &dyn PersistenceGateway,
        id: DbId,
        input: &UpdatePricingTier,
    ) -> Result<Option<PricingTier>, GatewayError> {
        rows::update_by_id(gw, Table::PricingTiers, id, to_record(input)?).await
    }

    pub async fn toggle_active(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<PricingTier>, GatewayError> {
        rows::toggle_active(gw, Table::PricingTiers, id).await
    }

    pub async fn delete(gw: &dyn PersistenceGateway, id: DbId) -> Result<bool, GatewayError> {
        rows::delete_by_id(gw, Table::PricingTiers, id).await
    }
}
