//! Text matching and paging for list endpoints.
//!
//! Listing filters compare user-typed text against stored titles and
//! subjects, so matching trims and ignores case.

/// A validated `LIMIT`/`OFFSET` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Build a window from raw query values. The limit falls back to
    /// `default` and is kept within `1..=max`; a negative offset becomes 0.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>, default: i64, max: i64) -> Self {
        Self {
            limit: limit.unwrap_or(default).clamp(1, max.max(1)),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Case-insensitive substring match. A blank needle matches everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive equality after trimming.
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
