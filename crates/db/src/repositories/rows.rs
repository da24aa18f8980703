//! Typed row helpers shared by the repositories.

use serde::de::DeserializeOwned;
use tutorhub_core::gateway::{Filter, GatewayError, PersistenceGateway, Query, Record, Table};
use tutorhub_core::types::DbId;

use crate::models::from_record;

pub(crate) async fn fetch_all<T: DeserializeOwned>(
    gw: &dyn PersistenceGateway,
    table: Table,
    query: &Query,
) -> Result<Vec<T>, GatewayError> {
    gw.select(table, query)
        .await?
        .into_iter()
        .map(from_record)
        .collect()
}

pub(crate) async fn find_by_id<T: DeserializeOwned>(
    gw: &dyn PersistenceGateway,
    table: Table,
    id: DbId,
) -> Result<Option<T>, GatewayError> {
    let query = Query::new().eq("id", id).limit(1);
    Ok(fetch_all(gw, table, &query).await?.into_iter().next())
}

pub(crate) async fn insert<T: DeserializeOwned>(
    gw: &dyn PersistenceGateway,
    table: Table,
    record: Record,
) -> Result<T, GatewayError> {
    from_record(gw.insert(table, record).await?)
}

/// Patch one row by id. An empty patch just re-reads the row.
pub(crate) async fn update_by_id<T: DeserializeOwned>(
    gw: &dyn PersistenceGateway,
    table: Table,
    id: DbId,
    patch: Record,
) -> Result<Option<T>, GatewayError> {
    if patch.is_empty() {
        return find_by_id(gw, table, id).await;
    }
    gw.update(table, patch, &[Filter::eq("id", id)])
        .await?
        .into_iter()
        .next()
        .map(from_record)
        .transpose()
}

pub(crate) async fn delete_by_id(
    gw: &dyn PersistenceGateway,
    table: Table,
    id: DbId,
) -> Result<bool, GatewayError> {
    Ok(gw.delete(table, &[Filter::eq("id", id)]).await? > 0)
}

/// Flip `is_active` on one row. Returns the row after the flip, or `None`
/// if it does not exist.
pub(crate) async fn toggle_active<T: DeserializeOwned>(
    gw: &dyn PersistenceGateway,
    table: Table,
    id: DbId,
) -> Result<Option<T>, GatewayError> {
    let query = Query::new().columns(&["is_active"]).eq("id", id).limit(1);
    let Some(row) = gw.select(table, &query).await?.into_iter().next() else {
        return Ok(None);
    };
    let active = row
        .get("is_active")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    let mut patch = Record::new();
    patch.insert("is_active".into(), (!active).into());
    let updated = gw
        .update(
            table,
            patch,
            &[Filter::eq("id", id), Filter::eq("is_active", active)],
        )
        .await?;
    match updated.into_iter().next() {
        Some(row) => from_record(row).map(Some),
        // Someone else flipped it first; report the current state.
        None => find_by_id(gw, table, id).await,
    }
}
