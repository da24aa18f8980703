/// Row identifier. Every table keys on a `BIGSERIAL` id, and JWT subjects
/// carry the same value for users.
pub type DbId = i64;

/// Stored and exchanged in UTC; only `start_display` applies an offset.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
