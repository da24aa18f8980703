//! Unified course listing.
//!
//! Tutor-authored and institution-authored courses live in different tables
//! with different shapes. The listing view maps both onto one
//! [`CourseListing`] so they can be filtered and rendered together.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::search::{contains_ci, eq_ci};
use crate::types::{DbId, Timestamp};

/// Seat count shown for institution courses, whose table has no capacity.
pub const INSTITUTION_DEFAULT_MAX_STUDENTS: i32 = 50;

pub const STATUS_ACTIVE_LABEL: &str = "Active";
pub const STATUS_INACTIVE_LABEL: &str = "Inactive";

/// Display pattern matching the `en-US` locale date-time string,
/// e.g. `1/15/2030, 10:00:00 AM`.
pub const START_DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseSource {
    Tutor,
    Institution,
}

/// One row of the unified listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseListing {
    pub id: DbId,
    pub source: CourseSource,
    /// `tutor_id` or `institution_id`, depending on `source`.
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub start_time: Option<Timestamp>,
    pub duration_hours: i32,
    pub max_students: i32,
    pub price: f64,
    pub is_active: bool,
    pub status_label: &'static str,
    pub start_display: Option<String>,
}

impl CourseListing {
    /// Fill in the derived display fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DbId,
        source: CourseSource,
        owner_id: DbId,
        title: String,
        description: String,
        subject: String,
        start_time: Option<Timestamp>,
        duration_hours: i32,
        max_students: i32,
        price: f64,
        is_active: bool,
        display_offset_minutes: i32,
    ) -> Self {
        Self {
            id,
            source,
            owner_id,
            title,
            description,
            subject,
            start_display: start_time.map(|ts| format_start_display(ts, display_offset_minutes)),
            start_time,
            duration_hours,
            max_students,
            price,
            is_active,
            status_label: status_label(is_active),
        }
    }
}

pub fn status_label(is_active: bool) -> &'static str {
    if is_active {
        STATUS_ACTIVE_LABEL
    } else {
        STATUS_INACTIVE_LABEL
    }
}

/// Hours value for an institution course's free-text duration.
///
/// Takes the leading integer of the label ("8 weeks" gives 8, "3 months"
/// gives 3). Labels that do not start with a number give 0; a number too
/// large for `i32` saturates.
pub fn duration_hours_from_label(label: &str) -> i32 {
    let label = label.trim_start();
    let (negative, rest) = match label.as_bytes().first() {
        Some(b'-') => (true, &label[1..]),
        Some(b'+') => (false, &label[1..]),
        _ => (false, label),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let value = if digits.is_empty() {
        0
    } else {
        digits.parse::<i32>().unwrap_or_else(|_| {
            tracing::warn!(label, "Duration label out of range, saturating");
            i32::MAX
        })
    };
    if negative {
        -value
    } else {
        value
    }
}

/// Format a stored UTC timestamp for display at a fixed UTC offset.
pub fn format_start_display(ts: Timestamp, offset_minutes: i32) -> String {
    let offset = offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            tracing::warn!(offset_minutes, "Display offset out of range, using UTC");
            Utc.fix()
        });
    ts.with_timezone(&offset).format(START_DISPLAY_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Listing filter: substring search over title and subject, plus exact
/// subject and active-state matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub subject: Option<String>,
    pub active: Option<bool>,
}

impl CourseFilter {
    pub fn matches(&self, course: &CourseListing) -> bool {
        let search_ok = self.search.as_deref().map_or(true, |needle| {
            contains_ci(&course.title, needle) || contains_ci(&course.subject, needle)
        });
        let subject_ok = self
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or(true, |subject| eq_ci(&course.subject, subject));
        let active_ok = self.active.map_or(true, |active| course.is_active == active);
        search_ok && subject_ok && active_ok
    }

    /// Keep matching courses, soonest start first. Courses without a start
    /// time go last; ties break on title.
    pub fn apply(&self, courses: Vec<CourseListing>) -> Vec<CourseListing> {
        let mut kept: Vec<CourseListing> = courses.into_iter().filter(|c| self.matches(c)).collect();
        kept.sort_by(|a, b| {
            let by_start = match (a.start_time, b.start_time) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_start.then_with(|| a.title.cmp(&b.title))
        });
        kept
    }
}
