//! Persistence gateway abstraction.
//!
//! Every read and write the service performs goes through a
//! [`PersistenceGateway`]: a small capability over a remote tabular store
//! with `select / insert / update / delete` filtered by predicate. Rows
//! travel as JSON objects ([`Record`]) so the same repositories work against
//! PostgreSQL and the in-memory store used in tests and local development.

use std::cmp::Ordering;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::search::Page;
use crate::types::{DbId, Timestamp};

/// A single row as a JSON object keyed by column name.
pub type Record = serde_json::Map<String, Value>;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// The closed set of tables the service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Users,
    Institutions,
    Courses,
    InstitutionCourses,
    Batches,
    Enrollments,
    PricingTiers,
    Inquiries,
    WizardDrafts,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Table::Users,
        Table::Institutions,
        Table::Courses,
        Table::InstitutionCourses,
        Table::Batches,
        Table::Enrollments,
        Table::PricingTiers,
        Table::Inquiries,
        Table::WizardDrafts,
    ];

    /// SQL table name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Institutions => "institutions",
            Self::Courses => "courses",
            Self::InstitutionCourses => "institution_courses",
            Self::Batches => "batches",
            Self::Enrollments => "enrollments",
            Self::PricingTiers => "pricing_tiers",
            Self::Inquiries => "inquiries",
            Self::WizardDrafts => "wizard_drafts",
        }
    }

    /// Column sets that the backend enforces as unique, with the name of the
    /// backing constraint. Used by the in-memory store to mirror the
    /// database's unique indexes.
    pub fn unique_keys(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            Self::Users => &[("uq_users_email", &["email"])],
            Self::Enrollments => &[("uq_enrollments_course_student", &["course_id", "student_id"])],
            Self::WizardDrafts => &[("uq_wizard_drafts_owner_step", &["owner_id", "step"])],
            _ => &[],
        }
    }
}

/// Validate that `name` is a plain lowercase SQL identifier.
///
/// Column names end up interpolated into SQL text, so anything else is
/// rejected before a query is built.
pub fn validate_identifier(name: &str) -> Result<(), GatewayError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(GatewayError::InvalidQuery(format!(
            "Invalid column identifier '{name}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Query building
// ---------------------------------------------------------------------------

/// A single row predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Neq(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Self::Neq(column.to_string(), value.into())
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self::Gte(column.to_string(), value.into())
    }

    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Self::Lte(column.to_string(), value.into())
    }

    /// The column this predicate applies to.
    pub fn column(&self) -> &str {
        match self {
            Self::Eq(c, _)
            | Self::Neq(c, _)
            | Self::Gt(c, _)
            | Self::Gte(c, _)
            | Self::Lt(c, _)
            | Self::Lte(c, _)
            | Self::In(c, _)
            | Self::IsNull(c) => c,
        }
    }

    /// Evaluate the predicate against a record.
    ///
    /// Missing columns behave like SQL `NULL`: only `IsNull` matches them.
    pub fn matches(&self, record: &Record) -> bool {
        let field = record.get(self.column()).filter(|v| !v.is_null());
        match (self, field) {
            (Self::IsNull(_), f) => f.is_none(),
            (_, None) => false,
            (Self::Eq(_, v), Some(f)) => compare_values(f, v) == Some(Ordering::Equal),
            (Self::Neq(_, v), Some(f)) => compare_values(f, v) != Some(Ordering::Equal),
            (Self::Gt(_, v), Some(f)) => compare_values(f, v) == Some(Ordering::Greater),
            (Self::Gte(_, v), Some(f)) => matches!(
                compare_values(f, v),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Self::Lt(_, v), Some(f)) => compare_values(f, v) == Some(Ordering::Less),
            (Self::Lte(_, v), Some(f)) => {
                matches!(compare_values(f, v), Some(Ordering::Less | Ordering::Equal))
            }
            (Self::In(_, values), Some(f)) => values
                .iter()
                .any(|v| compare_values(f, v) == Some(Ordering::Equal)),
        }
    }
}

/// Compare two scalar JSON values. Numbers compare numerically, strings
/// lexically, booleans as `false < true`. Mixed or composite types are
/// incomparable.
///
/// Lexical order matches time order only for RFC 3339 timestamps sharing one
/// offset and precision, as `MemoryGateway` writes them. Mixed offsets or
/// fractional-second widths do not sort correctly.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort direction for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A `select` request: projected columns, predicates, ordering and paging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// `None` selects every column.
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn page(self, page: Page) -> Self {
        self.limit(page.limit).offset(page.offset)
    }

    /// Check every identifier referenced by the query.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if let Some(columns) = &self.columns {
            columns.iter().try_for_each(|c| validate_identifier(c))?;
        }
        self.filters
            .iter()
            .try_for_each(|f| validate_identifier(f.column()))?;
        self.order
            .iter()
            .try_for_each(|o| validate_identifier(&o.column))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by a gateway implementation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No {table} row matched the request")]
    NotFound { table: &'static str },

    #[error("Duplicate value violates unique constraint: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<GatewayError> for CoreError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UniqueViolation { constraint } => CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            )),
            GatewayError::InvalidQuery(msg) => CoreError::Validation(msg),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Current user
// ---------------------------------------------------------------------------

/// The authenticated caller as known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: DbId,
    pub email: String,
    pub email_confirmed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// Capability over the remote tabular store.
///
/// Implementations must report unique-index violations as
/// [`GatewayError::UniqueViolation`] so callers can turn them into typed
/// conflicts.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Return rows matching `query`.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Record>, GatewayError>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: Table, record: Record) -> Result<Record, GatewayError>;

    /// Apply `patch` to every row matching `filters`; return the updated rows.
    async fn update(
        &self,
        table: Table,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, GatewayError>;

    /// Delete every row matching `filters`; return how many were removed.
    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<u64, GatewayError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), GatewayError>;

    /// Look up the authenticated user.
    async fn current_user(&self, user_id: DbId) -> Result<Option<CurrentUser>, GatewayError> {
        let query = Query::new()
            .columns(&["id", "email", "email_confirmed_at"])
            .eq("id", user_id)
            .limit(1);
        let rows = self.select(Table::Users, &query).await?;
        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(Value::Object(row)).map_err(GatewayError::from))
            .transpose()
    }
}
