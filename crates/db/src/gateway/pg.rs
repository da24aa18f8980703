//! PostgreSQL-backed gateway.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use tutorhub_core::gateway::{Filter, GatewayError, PersistenceGateway, Query, Record, Table};

use crate::gateway::sql::{self, Statement};
use crate::DbPool;

/// Gateway over a sqlx connection pool.
#[derive(Clone)]
pub struct PgGateway {
    pool: DbPool,
}

impl PgGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn fetch_rows(&self, table: Table, stmt: Statement) -> Result<Vec<Record>, GatewayError> {
        let mut query = sqlx::query_scalar::<_, Value>(&stmt.sql);
        for bind in stmt.binds {
            query = query.bind(Json(bind));
        }
        let rows = query.fetch_all(&self.pool).await.map_err(|e| map_sqlx_error(table, e))?;
        rows.into_iter()
            .map(|row| match row {
                Value::Object(map) => Ok(map),
                other => Err(GatewayError::Decode(format!(
                    "Expected a JSON object row from {}, got {other}",
                    table.name()
                ))),
            })
            .collect()
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, GatewayError> {
        let stmt = sql::render_select(table, query)?;
        self.fetch_rows(table, stmt).await
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, GatewayError> {
        let stmt = sql::render_insert(table, &record)?;
        self.fetch_rows(table, stmt)
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::NotFound {
                table: table.name(),
            })
    }

    async fn update(
        &self,
        table: Table,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, GatewayError> {
        let stmt = sql::render_update(table, &patch, filters)?;
        self.fetch_rows(table, stmt).await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64, GatewayError> {
        let stmt = sql::render_delete(table, filters)?;
        let mut query = sqlx::query(&stmt.sql);
        for bind in stmt.binds {
            query = query.bind(Json(bind));
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(table, e))?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| GatewayError::Backend(e.to_string()))
    }
}

/// Translate a sqlx error into the gateway taxonomy.
fn map_sqlx_error(table: Table, err: sqlx::Error) -> GatewayError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => GatewayError::UniqueViolation {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        },
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => GatewayError::InvalidQuery(
            format!("Referenced row does not exist ({})", db.constraint().unwrap_or("unknown")),
        ),
        sqlx::Error::Database(db) if db.is_check_violation() => {
            GatewayError::InvalidQuery(format!("Check constraint failed: {}", db.message()))
        }
        sqlx::Error::RowNotFound => GatewayError::NotFound {
            table: table.name(),
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            GatewayError::Decode(err.to_string())
        }
        other => {
            tracing::error!(table = table.name(), error = %other, "Database error");
            GatewayError::Backend(other.to_string())
        }
    }
}
