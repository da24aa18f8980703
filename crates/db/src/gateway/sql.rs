//! SQL rendering for [`PgGateway`](super::PgGateway).
//!
//! Only table names from the closed [`Table`] enum and identifiers that pass
//! [`validate_identifier`] are interpolated. Every value is bound as a JSONB
//! parameter and converted to the column's own type through
//! `jsonb_populate_record`, so the renderer needs no per-column type
//! knowledge.

use serde_json::Value;
use tutorhub_core::gateway::{
    validate_identifier, Filter, GatewayError, Query, Record, Table,
};

/// Rendered SQL text plus its JSONB parameters, in `$n` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<Value>,
}

/// Alias used for the target table in every statement.
const ALIAS: &str = "t";

pub fn render_select(table: Table, query: &Query) -> Result<Statement, GatewayError> {
    query.validate()?;
    let mut binds = Vec::new();

    let projection = match &query.columns {
        None => format!("to_jsonb({ALIAS})"),
        Some(columns) if columns.is_empty() => {
            return Err(GatewayError::InvalidQuery("Empty column list".into()))
        }
        Some(columns) => {
            let pairs: Vec<String> = columns
                .iter()
                .map(|c| format!("'{c}', {ALIAS}.{c}"))
                .collect();
            format!("jsonb_build_object({})", pairs.join(", "))
        }
    };

    let mut sql = format!("SELECT {projection} AS row_data FROM {} AS {ALIAS}", table.name());
    push_where(&mut sql, &mut binds, table, &query.filters)?;

    if !query.order.is_empty() {
        let order: Vec<String> = query
            .order
            .iter()
            .map(|o| {
                let dir = if o.ascending { "ASC" } else { "DESC" };
                format!("{ALIAS}.{} {dir}", o.column)
            })
            .collect();
        sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit.max(0)));
    }
    if let Some(offset) = query.offset {
        sql.push_str(&format!(" OFFSET {}", offset.max(0)));
    }

    Ok(Statement { sql, binds })
}

pub fn render_insert(table: Table, record: &Record) -> Result<Statement, GatewayError> {
    let columns = checked_columns(record)?;
    let name = table.name();
    if columns.is_empty() {
        return Ok(Statement {
            sql: format!("INSERT INTO {name} AS {ALIAS} DEFAULT VALUES RETURNING to_jsonb({ALIAS}) AS row_data"),
            binds: Vec::new(),
        });
    }
    let list = columns.join(", ");
    Ok(Statement {
        sql: format!(
            "INSERT INTO {name} AS {ALIAS} ({list}) \
             SELECT {list} FROM jsonb_populate_record(NULL::{name}, $1::jsonb) \
             RETURNING to_jsonb({ALIAS}) AS row_data"
        ),
        binds: vec![Value::Object(record.clone())],
    })
}

pub fn render_update(
    table: Table,
    patch: &Record,
    filters: &[Filter],
) -> Result<Statement, GatewayError> {
    let columns = checked_columns(patch)?;
    if columns.is_empty() {
        return Err(GatewayError::InvalidQuery("Update patch is empty".into()));
    }
    require_filters(filters, "update")?;

    let name = table.name();
    let assignments: Vec<String> = columns.iter().map(|c| format!("{c} = p.{c}")).collect();
    let mut binds = vec![Value::Object(patch.clone())];
    let mut sql = format!(
        "UPDATE {name} AS {ALIAS} SET {} \
         FROM jsonb_populate_record(NULL::{name}, $1::jsonb) AS p",
        assignments.join(", ")
    );
    push_where(&mut sql, &mut binds, table, filters)?;
    sql.push_str(&format!(" RETURNING to_jsonb({ALIAS}) AS row_data"));
    Ok(Statement { sql, binds })
}

pub fn render_delete(table: Table, filters: &[Filter]) -> Result<Statement, GatewayError> {
    require_filters(filters, "delete")?;
    let mut binds = Vec::new();
    let mut sql = format!("DELETE FROM {} AS {ALIAS}", table.name());
    push_where(&mut sql, &mut binds, table, filters)?;
    Ok(Statement { sql, binds })
}

fn checked_columns(record: &Record) -> Result<Vec<&str>, GatewayError> {
    record
        .keys()
        .map(|k| validate_identifier(k).map(|()| k.as_str()))
        .collect()
}

fn require_filters(filters: &[Filter], verb: &str) -> Result<(), GatewayError> {
    if filters.is_empty() {
        return Err(GatewayError::InvalidQuery(format!(
            "Refusing to {verb} without a filter"
        )));
    }
    Ok(())
}

fn push_where(
    sql: &mut String,
    binds: &mut Vec<Value>,
    table: Table,
    filters: &[Filter],
) -> Result<(), GatewayError> {
    if filters.is_empty() {
        return Ok(());
    }
    let clauses = filters
        .iter()
        .map(|f| render_filter(f, table, binds))
        .collect::<Result<Vec<_>, _>>()?;
    sql.push_str(" WHERE ");
    sql.push_str(&clauses.join(" AND "));
    Ok(())
}

fn render_filter(
    filter: &Filter,
    table: Table,
    binds: &mut Vec<Value>,
) -> Result<String, GatewayError> {
    let column = filter.column();
    validate_identifier(column)?;

    let clause = match filter {
        Filter::Eq(_, v) => format!("{ALIAS}.{column} = {}", bind_typed(binds, table, column, v)),
        Filter::Neq(_, v) => format!("{ALIAS}.{column} <> {}", bind_typed(binds, table, column, v)),
        Filter::Gt(_, v) => format!("{ALIAS}.{column} > {}", bind_typed(binds, table, column, v)),
        Filter::Gte(_, v) => format!("{ALIAS}.{column} >= {}", bind_typed(binds, table, column, v)),
        Filter::Lt(_, v) => format!("{ALIAS}.{column} < {}", bind_typed(binds, table, column, v)),
        Filter::Lte(_, v) => format!("{ALIAS}.{column} <= {}", bind_typed(binds, table, column, v)),
        Filter::IsNull(_) => format!("{ALIAS}.{column} IS NULL"),
        Filter::In(_, values) if values.is_empty() => "FALSE".to_string(),
        Filter::In(_, values) => {
            let rows: Vec<Value> = values
                .iter()
                .map(|v| {
                    let mut object = Record::new();
                    object.insert(column.to_string(), v.clone());
                    Value::Object(object)
                })
                .collect();
            binds.push(Value::Array(rows));
            format!(
                "{ALIAS}.{column} IN (SELECT {column} FROM jsonb_populate_recordset(NULL::{}, ${}::jsonb))",
                table.name(),
                binds.len()
            )
        }
    };
    Ok(clause)
}

/// Bind `{column: value}` and return a scalar subquery that yields the
/// value converted to the column's type.
fn bind_typed(binds: &mut Vec<Value>, table: Table, column: &str, value: &Value) -> String {
    let mut object = Record::new();
    object.insert(column.to_string(), value.clone());
    binds.push(Value::Object(object));
    format!(
        "(SELECT {column} FROM jsonb_populate_record(NULL::{}, ${}::jsonb))",
        table.name(),
        binds.len()
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn select_all_columns_with_filters_order_and_paging() {
        let query = Query::new()
            .eq("course_id", 4)
            .filter(Filter::IsNull("end_date".into()))
            .order_by("start_date", false)
            .limit(20)
            .offset(40);
        let stmt = render_select(Table::Batches, &query).unwrap();

        assert_eq!(
            stmt.sql,
            "SELECT to_jsonb(t) AS row_data FROM batches AS t \
             WHERE t.course_id = (SELECT course_id FROM jsonb_populate_record(NULL::batches, $1::jsonb)) \
             AND t.end_date IS NULL \
             ORDER BY t.start_date DESC LIMIT 20 OFFSET 40"
        );
        assert_eq!(stmt.binds, vec![json!({ "course_id": 4 })]);
    }

    #[test]
    fn select_projection_builds_object() {
        let query = Query::new().columns(&["id", "email"]);
        let stmt = render_select(Table::Users, &query).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT jsonb_build_object('id', t.id, 'email', t.email) AS row_data FROM users AS t"
        );
        assert!(stmt.binds.is_empty());
    }

    #[test]
    fn select_rejects_bad_identifiers() {
        let query = Query::new().eq("id = 1 OR 1", 1);
        assert_matches!(
            render_select(Table::Courses, &query),
            Err(GatewayError::InvalidQuery(_))
        );
    }

    #[test]
    fn in_filter_uses_recordset() {
        let query = Query::new().filter(Filter::In(
            "status".into(),
            vec![json!("new"), json!("contacted")],
        ));
        let stmt = render_select(Table::Inquiries, &query).unwrap();
        assert!(stmt.sql.ends_with(
            "WHERE t.status IN (SELECT status FROM jsonb_populate_recordset(NULL::inquiries, $1::jsonb))"
        ));
        assert_eq!(stmt.binds, vec![json!([{ "status": "new" }, { "status": "contacted" }])]);

        let empty = Query::new().filter(Filter::In("status".into(), vec![]));
        let stmt = render_select(Table::Inquiries, &empty).unwrap();
        assert!(stmt.sql.ends_with("WHERE FALSE"));
    }

    #[test]
    fn insert_lists_only_given_columns() {
        let row = record(json!({ "title": "Math 101", "max_students": 10 }));
        let stmt = render_insert(Table::Courses, &row).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO courses AS t (max_students, title) \
             SELECT max_students, title FROM jsonb_populate_record(NULL::courses, $1::jsonb) \
             RETURNING to_jsonb(t) AS row_data"
        );
        assert_eq!(stmt.binds, vec![Value::Object(row)]);
    }

    #[test]
    fn update_binds_patch_before_filters() {
        let patch = record(json!({ "step6_data": {}, "version": 3 }));
        let filters = [Filter::eq("id", 1), Filter::eq("version", 2)];
        let stmt = render_update(Table::Institutions, &patch, &filters).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE institutions AS t SET step6_data = p.step6_data, version = p.version \
             FROM jsonb_populate_record(NULL::institutions, $1::jsonb) AS p \
             WHERE t.id = (SELECT id FROM jsonb_populate_record(NULL::institutions, $2::jsonb)) \
             AND t.version = (SELECT version FROM jsonb_populate_record(NULL::institutions, $3::jsonb)) \
             RETURNING to_jsonb(t) AS row_data"
        );
        assert_eq!(stmt.binds.len(), 3);
    }

    #[test]
    fn unfiltered_writes_are_refused() {
        let patch = record(json!({ "is_active": false }));
        assert!(render_update(Table::Courses, &patch, &[]).is_err());
        assert!(render_delete(Table::Courses, &[]).is_err());
        assert!(render_update(Table::Courses, &Record::new(), &[Filter::eq("id", 1)]).is_err());
    }

    #[test]
    fn delete_renders_filters() {
        let stmt = render_delete(Table::PricingTiers, &[Filter::eq("id", 9)]).unwrap();
        assert_eq!(
            stmt.sql,
            "DELETE FROM pricing_tiers AS t \
             WHERE t.id = (SELECT id FROM jsonb_populate_record(NULL::pricing_tiers, $1::jsonb))"
        );
    }
}
