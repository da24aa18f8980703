//! Typed step payloads for the institution signup wizard.
//!
//! Every step has its own record type. All records are default-constructible
//! and every field carries a typed default, so hydrating from a partial or
//! stale blob always produces a complete record. Keys a record does not know
//! about are kept in `extra` and written back unchanged.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::gateway::Record;
use crate::validation::FieldErrors;
use crate::wizard::hydrate::hydrate_lenient;
use crate::wizard::steps::StepId;

// ---------------------------------------------------------------------------
// Shared field types
// ---------------------------------------------------------------------------

/// A tri-state yes/no answer. Unanswered questions serialize as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
    #[default]
    #[serde(rename = "")]
    Unset,
}

/// Length of a course as picked from the duration dropdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseDuration {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "1_month")]
    OneMonth,
    #[serde(rename = "3_months")]
    ThreeMonths,
    #[serde(rename = "6_months")]
    SixMonths,
    #[serde(rename = "1_year")]
    OneYear,
    #[serde(rename = "2_years")]
    TwoYears,
    #[serde(rename = "custom")]
    Custom,
}

/// How batches are taught.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeachingMode {
    #[default]
    #[serde(rename = "")]
    Unset,
    Online,
    Offline,
    Hybrid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassLevels {
    pub beginner: bool,
    pub intermediate: bool,
    pub advanced: bool,
}

impl ClassLevels {
    /// Set one level by name. Returns `false` for an unknown level.
    pub fn set(&mut self, level: &str, on: bool) -> bool {
        match level {
            "beginner" => self.beginner = on,
            "intermediate" => self.intermediate = on,
            "advanced" => self.advanced = on,
            _ => return false,
        }
        true
    }
}

/// Per-category course details captured in the courses step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CourseDetail {
    pub subjects_offered: BTreeSet<String>,
    pub class_levels: ClassLevels,
    pub batch_sizes: String,
    pub course_duration: CourseDuration,
    pub certification_provided: YesNo,
    pub course_fee_structure: String,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchInfo {
    pub name: String,
    pub course_category: String,
    pub timing: String,
    pub days: Vec<String>,
    pub capacity: String,
    pub start_date: String,
    #[serde(flatten)]
    pub extra: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeeSchedule {
    pub course_category: String,
    pub amount: String,
    pub frequency: String,
    #[serde(flatten)]
    pub extra: Record,
}

// ---------------------------------------------------------------------------
// Step records
// ---------------------------------------------------------------------------

/// Step 1: institution identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicInfoStep {
    pub institution_name: String,
    pub institution_type: String,
    pub established_year: String,
    pub registration_number: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Record,
}

/// Step 2: contact details and location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactStep {
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(flatten)]
    pub extra: Record,
}

/// Step 3: course categories and their details.
///
/// A category marked selected always has a [`CourseDetail`]. De-selecting a
/// category keeps its detail so re-selecting it restores what was entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoursesStep {
    pub course_categories: BTreeMap<String, bool>,
    pub course_details: BTreeMap<String, CourseDetail>,
    pub other_category: String,
    #[serde(flatten)]
    pub extra: Record,
}

impl CoursesStep {
    /// Mark a category selected or not. Selecting creates an empty detail
    /// record if none exists; de-selecting leaves the detail in place.
    pub fn set_category(&mut self, category: &str, selected: bool) {
        self.course_categories.insert(category.to_string(), selected);
        if selected {
            self.course_details.entry(category.to_string()).or_default();
        }
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.course_categories.get(category).copied().unwrap_or(false)
    }

    pub fn selected_categories(&self) -> impl Iterator<Item = &str> {
        self.course_categories
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(name, _)| name.as_str())
    }

    /// Detail record for a category, created on first access.
    pub fn detail_mut(&mut self, category: &str) -> &mut CourseDetail {
        self.course_details.entry(category.to_string()).or_default()
    }

    /// Add or remove a subject under a selected category.
    pub fn set_subject(&mut self, category: &str, subject: &str, on: bool) -> Result<(), CoreError> {
        if !self.is_selected(category) {
            return Err(CoreError::Validation(format!(
                "Category '{category}' is not selected"
            )));
        }
        let subjects = &mut self.detail_mut(category).subjects_offered;
        if on {
            subjects.insert(subject.to_string());
        } else {
            subjects.remove(subject);
        }
        Ok(())
    }

    /// Create missing details for selected categories. Returns how many were
    /// created.
    pub fn ensure_details(&mut self) -> usize {
        let missing: Vec<String> = self
            .selected_categories()
            .filter(|c| !self.course_details.contains_key(*c))
            .map(str::to_string)
            .collect();
        for category in &missing {
            self.course_details.insert(category.clone(), CourseDetail::default());
        }
        missing.len()
    }
}

/// Step 4: batches and faculty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchesStep {
    pub batches: Vec<BatchInfo>,
    pub faculty_count: String,
    pub teaching_mode: TeachingMode,
    #[serde(flatten)]
    pub extra: Record,
}

/// Step 5: facilities checklist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FacilitiesStep {
    pub facilities: BTreeMap<String, bool>,
    pub other_facilities: String,
    pub library_available: bool,
    #[serde(flatten)]
    pub extra: Record,
}

/// Step 6: fee schedules and policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeesStep {
    pub fee_schedules: Vec<FeeSchedule>,
    pub payment_modes: BTreeMap<String, bool>,
    pub refund_policy: String,
    pub discounts_offered: String,
    pub installments_available: YesNo,
    #[serde(flatten)]
    pub extra: Record,
}

// ---------------------------------------------------------------------------
// StepRecord
// ---------------------------------------------------------------------------

/// A typed record owned by exactly one wizard step.
pub trait StepRecord:
    std::fmt::Debug + Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + Sync + 'static
{
    const STEP: StepId;

    fn into_payload(self) -> StepPayload;

    fn from_payload(payload: &StepPayload) -> Option<&Self>;

    /// Derived effects that bring the record back to a consistent state,
    /// run after hydration.
    fn settle(&mut self) {}

    /// Required-field checks run before the wizard may leave this step.
    fn check_required(&self, _errors: &mut FieldErrors) {}
}

macro_rules! impl_step_record {
    (@hooks BasicInfo) => {
        fn check_required(&self, errors: &mut FieldErrors) {
            errors.require("institutionName", &self.institution_name);
            errors.require("institutionType", &self.institution_type);
        }
    };
    (@hooks Contact) => {
        fn check_required(&self, errors: &mut FieldErrors) {
            errors.require("email", &self.email);
            errors.require("phone", &self.phone);
            errors.require("city", &self.city);
            if !self.email.trim().is_empty() && !self.email.contains('@') {
                errors.add("email", "email must be a valid address");
            }
        }
    };
    (@hooks Courses) => {
        fn settle(&mut self) {
            self.ensure_details();
        }

        fn check_required(&self, errors: &mut FieldErrors) {
            if self.selected_categories().next().is_none() {
                errors.add("courseCategories", "Select at least one course category");
            }
        }
    };
    (@hooks $other:ident) => {};
    ($ty:ty, $variant:ident) => {
        impl StepRecord for $ty {
            const STEP: StepId = StepId::$variant;

            fn into_payload(self) -> StepPayload {
                StepPayload::$variant(self)
            }

            fn from_payload(payload: &StepPayload) -> Option<&Self> {
                match payload {
                    StepPayload::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            impl_step_record!(@hooks $variant);
        }
    };
}

impl_step_record!(BasicInfoStep, BasicInfo);
impl_step_record!(ContactStep, Contact);
impl_step_record!(CoursesStep, Courses);
impl_step_record!(BatchesStep, Batches);
impl_step_record!(FacilitiesStep, Facilities);
impl_step_record!(FeesStep, Fees);

/// Field names a record declares, as they appear in JSON.
pub fn declared_fields<P: StepRecord>() -> Vec<String> {
    match serde_json::to_value(P::default()) {
        Ok(Value::Object(map)) => map.into_iter().map(|(k, _)| k).collect(),
        _ => Vec::new(),
    }
}

/// Overwrite one field of `record` with `value`.
///
/// Fails with a field-level validation error if the field is unknown or the
/// value does not fit the field's declared type.
pub fn with_field<P: StepRecord>(record: &P, field: &str, value: Value) -> Result<P, CoreError> {
    let field_error = |message: String| {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        CoreError::FieldValidation(errors)
    };

    if !declared_fields::<P>().iter().any(|f| f == field) {
        return Err(field_error(format!(
            "Unknown field '{field}' for step {}",
            P::STEP
        )));
    }

    let mut map = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(CoreError::Internal("Step record is not an object".into())),
        Err(e) => return Err(CoreError::Internal(e.to_string())),
    };
    map.insert(field.to_string(), value);
    serde_json::from_value(Value::Object(map)).map_err(|e| field_error(e.to_string()))
}

// ---------------------------------------------------------------------------
// StepPayload
// ---------------------------------------------------------------------------

/// The payload of one step, tagged by the step it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepPayload {
    BasicInfo(BasicInfoStep),
    Contact(ContactStep),
    Courses(CoursesStep),
    Batches(BatchesStep),
    Facilities(FacilitiesStep),
    Fees(FeesStep),
}

impl StepPayload {
    pub fn step(&self) -> StepId {
        match self {
            Self::BasicInfo(_) => StepId::BasicInfo,
            Self::Contact(_) => StepId::Contact,
            Self::Courses(_) => StepId::Courses,
            Self::Batches(_) => StepId::Batches,
            Self::Facilities(_) => StepId::Facilities,
            Self::Fees(_) => StepId::Fees,
        }
    }

    /// The default payload for a step.
    pub fn default_for(step: StepId) -> Self {
        match step {
            StepId::BasicInfo => Self::BasicInfo(BasicInfoStep::default()),
            StepId::Contact => Self::Contact(ContactStep::default()),
            StepId::Courses => Self::Courses(CoursesStep::default()),
            StepId::Batches => Self::Batches(BatchesStep::default()),
            StepId::Facilities => Self::Facilities(FacilitiesStep::default()),
            StepId::Fees => Self::Fees(FeesStep::default()),
        }
    }

    /// Strictly decode a client-supplied payload for `step`.
    pub fn parse(step: StepId, value: Value) -> Result<Self, CoreError> {
        fn decode<P: StepRecord>(value: Value) -> Result<StepPayload, CoreError> {
            if !value.is_object() {
                return Err(CoreError::Validation(format!(
                    "Payload for step {} must be a JSON object",
                    P::STEP
                )));
            }
            serde_json::from_value::<P>(value)
                .map(P::into_payload)
                .map_err(|e| {
                    CoreError::Validation(format!("Invalid payload for step {}: {e}", P::STEP))
                })
        }

        match step {
            StepId::BasicInfo => decode::<BasicInfoStep>(value),
            StepId::Contact => decode::<ContactStep>(value),
            StepId::Courses => decode::<CoursesStep>(value),
            StepId::Batches => decode::<BatchesStep>(value),
            StepId::Facilities => decode::<FacilitiesStep>(value),
            StepId::Fees => decode::<FeesStep>(value),
        }
    }

    /// Leniently decode a stored payload for `step`; never fails.
    pub fn hydrate(step: StepId, value: Option<&Value>) -> Self {
        match step {
            StepId::BasicInfo => Self::BasicInfo(hydrate_lenient(value)),
            StepId::Contact => Self::Contact(hydrate_lenient(value)),
            StepId::Courses => Self::Courses(hydrate_lenient(value)),
            StepId::Batches => Self::Batches(hydrate_lenient(value)),
            StepId::Facilities => Self::Facilities(hydrate_lenient(value)),
            StepId::Fees => Self::Fees(hydrate_lenient(value)),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Record::new()))
    }

    /// Required-field messages for this payload.
    pub fn check_required(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            Self::BasicInfo(p) => p.check_required(&mut errors),
            Self::Contact(p) => p.check_required(&mut errors),
            Self::Courses(p) => p.check_required(&mut errors),
            Self::Batches(p) => p.check_required(&mut errors),
            Self::Facilities(p) => p.check_required(&mut errors),
            Self::Fees(p) => p.check_required(&mut errors),
        }
        errors
    }
}
