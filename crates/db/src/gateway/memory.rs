//! In-memory gateway for tests and local development.
//!
//! Mirrors the behaviour the service relies on from PostgreSQL: generated
//! `id` and timestamp columns, column defaults, unique indexes and
//! `updated_at` bumps on update.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tutorhub_core::gateway::{
    compare_values, validate_identifier, Filter, GatewayError, PersistenceGateway, Query, Record,
    Table,
};
use tutorhub_core::types::DbId;

#[derive(Debug, Default)]
struct TableData {
    rows: BTreeMap<DbId, Record>,
    next_id: DbId,
}

impl TableData {
    fn allocate_id(&mut self) -> DbId {
        self.next_id = self.next_id.max(self.rows.keys().max().copied().unwrap_or(0)) + 1;
        self.next_id
    }
}

/// Thread-safe in-memory store keyed by table.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: RwLock<HashMap<Table, TableData>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored in `table`.
    pub async fn row_count(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map_or(0, |data| data.rows.len())
    }
}

/// Column defaults the schema would fill in on insert.
fn column_defaults(table: Table) -> Record {
    let now = now_value();
    let defaults = match table {
        Table::Users => json!({ "email_confirmed_at": null }),
        Table::Institutions => json!({
            "version": 1,
            "step3_data": {}, "step4_data": {}, "step5_data": {}, "step6_data": {}
        }),
        Table::Courses => json!({
            "description": "", "start_time": null, "duration_hours": 1,
            "max_students": 10, "price": 0.0, "is_active": true
        }),
        Table::InstitutionCourses => json!({
            "description": "", "duration": "", "fee": 0.0, "start_date": null, "is_active": true
        }),
        Table::Batches => json!({
            "course_id": null, "end_date": null, "schedule": "", "is_active": true
        }),
        Table::Enrollments => json!({ "status": "enrolled", "enrolled_at": now }),
        Table::PricingTiers => json!({
            "description": "", "features": [], "is_active": true, "sort_order": 0
        }),
        Table::Inquiries => json!({
            "course_id": null, "phone": "", "status": "new", "notes": "",
            "last_contacted_at": null
        }),
        Table::WizardDrafts => json!({}),
    };
    let mut record = defaults.as_object().cloned().unwrap_or_default();
    if table != Table::Users {
        record.insert("created_at".into(), now.clone());
        record.insert("updated_at".into(), now);
    }
    record
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

fn check_columns(record: &Record) -> Result<(), GatewayError> {
    record.keys().try_for_each(|k| validate_identifier(k))
}

/// Reject `candidate` if it collides with another row on a unique key.
fn check_unique(
    table: Table,
    data: &TableData,
    candidate_id: DbId,
    candidate: &Record,
) -> Result<(), GatewayError> {
    for (constraint, columns) in table.unique_keys() {
        let key: Option<Vec<&Value>> = columns
            .iter()
            .map(|c| candidate.get(*c).filter(|v| !v.is_null()))
            .collect();
        // NULLs never collide.
        let Some(key) = key else { continue };
        let clash = data.rows.iter().any(|(id, row)| {
            *id != candidate_id
                && columns.iter().zip(&key).all(|(c, v)| {
                    row.get(*c)
                        .is_some_and(|existing| compare_values(existing, v) == Some(Ordering::Equal))
                })
        });
        if clash {
            return Err(GatewayError::UniqueViolation {
                constraint: constraint.to_string(),
            });
        }
    }
    Ok(())
}

fn require_filters(filters: &[Filter], verb: &str) -> Result<(), GatewayError> {
    if filters.is_empty() {
        return Err(GatewayError::InvalidQuery(format!(
            "Refusing to {verb} without a filter"
        )));
    }
    filters.iter().try_for_each(|f| validate_identifier(f.column()))
}

fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
        // NULLS LAST, as PostgreSQL does for ascending order.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, GatewayError> {
        query.validate()?;
        let tables = self.tables.read().await;
        let Some(data) = tables.get(&table) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&Record> = data
            .rows
            .values()
            .filter(|row| query.filters.iter().all(|f| f.matches(row)))
            .collect();

        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|o| {
                    let ord = compare_for_sort(a.get(&o.column), b.get(&o.column));
                    if o.ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(0);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| match &query.columns {
                None => row.clone(),
                Some(columns) => columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                    .collect(),
            })
            .collect())
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, GatewayError> {
        check_columns(&record)?;
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();

        let id = match record.get("id").and_then(Value::as_i64) {
            Some(id) if data.rows.contains_key(&id) => {
                return Err(GatewayError::UniqueViolation {
                    constraint: format!("{}_pkey", table.name()),
                })
            }
            Some(id) => id,
            None => data.allocate_id(),
        };

        let mut row = column_defaults(table);
        row.extend(record);
        row.insert("id".into(), Value::from(id));

        check_unique(table, data, id, &row)?;
        data.next_id = data.next_id.max(id);
        data.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, GatewayError> {
        check_columns(&patch)?;
        if patch.is_empty() {
            return Err(GatewayError::InvalidQuery("Update patch is empty".into()));
        }
        require_filters(filters, "update")?;

        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(&table) else {
            return Ok(Vec::new());
        };

        let ids: Vec<DbId> = data
            .rows
            .iter()
            .filter(|(_, row)| filters.iter().all(|f| f.matches(row)))
            .map(|(id, _)| *id)
            .collect();

        // Build every updated row first so a unique violation leaves the
        // table untouched.
        let mut updated = Vec::with_capacity(ids.len());
        for id in &ids {
            let mut row = data.rows[id].clone();
            row.extend(patch.clone());
            row.insert("id".into(), Value::from(*id));
            if table != Table::Users && !patch.contains_key("updated_at") {
                row.insert("updated_at".into(), now_value());
            }
            check_unique(table, data, *id, &row)?;
            updated.push((*id, row));
        }

        Ok(updated
            .into_iter()
            .map(|(id, row)| {
                data.rows.insert(id, row.clone());
                row
            })
            .collect())
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64, GatewayError> {
        require_filters(filters, "delete")?;
        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(&table) else {
            return Ok(0);
        };
        let before = data.rows.len();
        data.rows.retain(|_, row| !filters.iter().all(|f| f.matches(row)));
        Ok((before - data.rows.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_defaults() {
        let gw = MemoryGateway::new();
        let a = gw
            .insert(Table::PricingTiers, record(json!({ "name": "Basic", "price": 0 })))
            .await
            .unwrap();
        let b = gw
            .insert(Table::PricingTiers, record(json!({ "name": "Pro", "price": 499 })))
            .await
            .unwrap();

        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
        assert_eq!(a["is_active"], true);
        assert_eq!(a["features"], json!([]));
        assert!(a["created_at"].is_string());
    }

    #[tokio::test]
    async fn explicit_id_is_kept_and_next_id_moves_past_it() {
        let gw = MemoryGateway::new();
        gw.insert(Table::Users, record(json!({ "id": 10, "email": "a@x.in" })))
            .await
            .unwrap();
        let next = gw
            .insert(Table::Users, record(json!({ "email": "b@x.in" })))
            .await
            .unwrap();
        assert_eq!(next["id"], 11);
    }

    #[tokio::test]
    async fn projection_returns_only_requested_columns() {
        let gw = MemoryGateway::new();
        gw.insert(Table::Users, record(json!({ "email": "a@x.in" })))
            .await
            .unwrap();
        let rows = gw
            .select(Table::Users, &Query::new().columns(&["email"]))
            .await
            .unwrap();
        assert_eq!(rows, vec![record(json!({ "email": "a@x.in" }))]);
    }

    #[tokio::test]
    async fn update_bumps_updated_at_and_returns_rows() {
        let gw = MemoryGateway::new();
        let row = gw
            .insert(Table::Courses, record(json!({ "title": "Physics", "tutor_id": 1 })))
            .await
            .unwrap();
        let patch = record(json!({ "is_active": false, "updated_at": "2000-01-01T00:00:00Z" }));
        let rows = gw
            .update(Table::Courses, patch, &[Filter::eq("id", row["id"].clone())])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["is_active"], false);
        assert_eq!(rows[0]["title"], "Physics");
        assert_eq!(rows[0]["updated_at"], "2000-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn update_without_match_is_empty() {
        let gw = MemoryGateway::new();
        let rows = gw
            .update(Table::Courses, record(json!({ "title": "x" })), &[Filter::eq("id", 99)])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn delete_counts_removed_rows() {
        let gw = MemoryGateway::new();
        for title in ["a", "b", "c"] {
            gw.insert(Table::Courses, record(json!({ "title": title, "tutor_id": 5 })))
                .await
                .unwrap();
        }
        let removed = gw
            .delete(Table::Courses, &[Filter::neq("title", "b")])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(gw.row_count(Table::Courses).await, 1);
    }

    #[tokio::test]
    async fn order_puts_nulls_last_and_respects_direction() {
        let gw = MemoryGateway::new();
        for (title, start) in [("late", json!("2031-01-01T00:00:00Z")), ("none", Value::Null), ("early", json!("2030-01-01T00:00:00Z"))] {
            gw.insert(
                Table::Courses,
                record(json!({ "title": title, "tutor_id": 1, "start_time": start })),
            )
            .await
            .unwrap();
        }
        let titles = |rows: Vec<Record>| -> Vec<String> {
            rows.iter().map(|r| r["title"].as_str().unwrap().to_string()).collect()
        };

        let asc = gw
            .select(Table::Courses, &Query::new().order_by("start_time", true))
            .await
            .unwrap();
        assert_eq!(titles(asc), vec!["early", "late", "none"]);

        let paged = gw
            .select(
                Table::Courses,
                &Query::new().order_by("start_time", true).offset(1).limit(1),
            )
            .await
            .unwrap();
        assert_eq!(titles(paged), vec!["late"]);
    }

    #[tokio::test]
    async fn unique_key_collision_is_reported() {
        let gw = MemoryGateway::new();
        let enrollment = record(json!({ "course_id": 1, "student_id": 2 }));
        gw.insert(Table::Enrollments, enrollment.clone()).await.unwrap();

        let err = gw.insert(Table::Enrollments, enrollment).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::UniqueViolation { ref constraint } if constraint == "uq_enrollments_course_student"
        ));
        assert_eq!(gw.row_count(Table::Enrollments).await, 1);
    }

    #[tokio::test]
    async fn update_into_unique_collision_changes_nothing() {
        let gw = MemoryGateway::new();
        gw.insert(Table::Users, record(json!({ "email": "a@x.in" }))).await.unwrap();
        gw.insert(Table::Users, record(json!({ "email": "b@x.in" }))).await.unwrap();

        let result = gw
            .update(
                Table::Users,
                record(json!({ "email": "a@x.in" })),
                &[Filter::eq("email", "b@x.in")],
            )
            .await;
        assert!(result.is_err());
        let still_b = gw
            .select(Table::Users, &Query::new().eq("email", "b@x.in"))
            .await
            .unwrap();
        assert_eq!(still_b.len(), 1);
    }

    #[tokio::test]
    async fn unfiltered_writes_and_bad_columns_are_rejected() {
        let gw = MemoryGateway::new();
        assert!(gw.delete(Table::Courses, &[]).await.is_err());
        assert!(gw
            .update(Table::Courses, record(json!({ "title": "x" })), &[])
            .await
            .is_err());
        assert!(gw
            .insert(Table::Courses, record(json!({ "Title; --": "x" })))
            .await
            .is_err());
    }
}
