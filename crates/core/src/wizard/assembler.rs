//! Composition of the persisted institution profile from wizard steps.
//!
//! The profile row is partly relational (identity and contact columns) and
//! partly raw JSON: each of steps 3 to 6 is stored whole in its own blob
//! column. Submission writes the full record; the profile edit dialog patches
//! a single step and leaves every other column alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::Record;
use crate::types::DbId;
use crate::wizard::context::{FormData, StepContext};
use crate::wizard::payload::StepPayload;
use crate::wizard::steps::StepId;

/// Profile columns flattened from the basic-info step, with the JSON key
/// each one comes from.
pub const BASIC_INFO_COLUMNS: &[(&str, &str)] = &[
    ("name", "institutionName"),
    ("institution_type", "institutionType"),
    ("established_year", "establishedYear"),
    ("registration_number", "registrationNumber"),
    ("description", "description"),
];

/// Profile columns flattened from the contact step.
pub const CONTACT_COLUMNS: &[(&str, &str)] = &[
    ("email", "email"),
    ("phone", "phone"),
    ("website", "website"),
    ("address", "address"),
    ("city", "city"),
    ("state", "state"),
    ("pincode", "pincode"),
];

/// An existing profile row and the version the caller last saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    pub id: DbId,
    pub version: i64,
}

impl ProfileRef {
    /// Read `id` and `version` from a stored row.
    pub fn from_row(row: &Record) -> Option<Self> {
        Some(Self {
            id: row.get("id")?.as_i64()?,
            version: row.get("version").and_then(Value::as_i64).unwrap_or(1),
        })
    }
}

/// The single write a submission turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileWrite {
    Insert(Record),
    /// Full-record overwrite, accepted only if the row is still at
    /// `expected_version`.
    Update {
        id: DbId,
        expected_version: i64,
        record: Record,
    },
}

pub struct ProfileAssembler;

impl ProfileAssembler {
    /// Build the full profile record from every step in `context`.
    ///
    /// Steps that were never written contribute their defaults, and every
    /// blob is re-serialized whether or not it changed.
    pub fn assemble(context: &StepContext, owner_id: DbId) -> Record {
        let mut record = Record::new();
        record.insert("owner_id".into(), Value::from(owner_id));
        for step in StepId::ALL {
            match context.step(step) {
                Some(payload) => write_step(&mut record, payload),
                None => write_step(&mut record, &StepPayload::default_for(step)),
            }
        }
        record
    }

    /// Decide between inserting a new profile and overwriting `target`.
    pub fn write_for(
        context: &StepContext,
        owner_id: DbId,
        target: Option<ProfileRef>,
    ) -> ProfileWrite {
        let record = Self::assemble(context, owner_id);
        match target {
            None => ProfileWrite::Insert(record),
            Some(target) => ProfileWrite::Update {
                id: target.id,
                expected_version: target.version,
                record,
            },
        }
    }

    /// The columns touched by saving one step on its own.
    pub fn patch_step(payload: &StepPayload) -> Record {
        let mut record = Record::new();
        write_step(&mut record, payload);
        record
    }

    /// Rebuild the wizard form from a stored profile row. Missing or
    /// malformed data falls back to typed defaults.
    pub fn disassemble(row: &Record) -> FormData {
        StepId::ALL
            .into_iter()
            .map(|step| {
                let payload = match step {
                    StepId::BasicInfo => {
                        StepPayload::hydrate(step, Some(&gather(row, BASIC_INFO_COLUMNS)))
                    }
                    StepId::Contact => {
                        StepPayload::hydrate(step, Some(&gather(row, CONTACT_COLUMNS)))
                    }
                    _ => StepPayload::hydrate(
                        step,
                        step.blob_column().and_then(|column| row.get(column)),
                    ),
                };
                (step, payload)
            })
            .collect()
    }
}

fn write_step(record: &mut Record, payload: &StepPayload) {
    let value = payload.to_value();
    let columns = match payload.step() {
        StepId::BasicInfo => BASIC_INFO_COLUMNS,
        StepId::Contact => CONTACT_COLUMNS,
        step => {
            if let Some(column) = step.blob_column() {
                record.insert(column.to_string(), value);
            }
            return;
        }
    };
    for (column, key) in columns {
        let field = value
            .get(*key)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        record.insert(column.to_string(), field);
    }
}

fn gather(row: &Record, columns: &[(&str, &str)]) -> Value {
    let object: Record = columns
        .iter()
        .filter_map(|(column, key)| {
            row.get(*column)
                .filter(|v| !v.is_null())
                .map(|v| (key.to_string(), v.clone()))
        })
        .collect();
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::wizard::payload::{
        BasicInfoStep, ContactStep, CoursesStep, FeesStep, StepRecord, YesNo,
    };

    fn filled_context() -> StepContext {
        let mut context = StepContext::new();
        context.update_step(
            BasicInfoStep {
                institution_name: "Bright Minds Academy".into(),
                institution_type: "coaching".into(),
                ..Default::default()
            }
            .into_payload(),
        );
        context.update_step(
            ContactStep {
                email: "hello@brightminds.in".into(),
                city: "Indore".into(),
                ..Default::default()
            }
            .into_payload(),
        );
        let mut courses = CoursesStep::default();
        courses.set_category("CBSE", true);
        context.update_step(courses.into_payload());
        context
    }

    #[test]
    fn assemble_flattens_columns_and_serializes_blobs() {
        let record = ProfileAssembler::assemble(&filled_context(), 9);

        assert_eq!(record["owner_id"], 9);
        assert_eq!(record["name"], "Bright Minds Academy");
        assert_eq!(record["email"], "hello@brightminds.in");
        assert_eq!(record["phone"], "");
        assert_eq!(record["step3_data"]["courseCategories"]["CBSE"], true);
        // Untouched steps still produce a full default blob.
        assert_eq!(record["step6_data"]["feeSchedules"], json!([]));
        assert_eq!(record["step5_data"]["libraryAvailable"], false);
    }

    #[test]
    fn assemble_is_deterministic() {
        let context = filled_context();
        assert_eq!(
            ProfileAssembler::assemble(&context, 1),
            ProfileAssembler::assemble(&context, 1)
        );
    }

    #[test]
    fn write_for_chooses_insert_or_versioned_update() {
        let context = filled_context();
        assert!(matches!(
            ProfileAssembler::write_for(&context, 1, None),
            ProfileWrite::Insert(_)
        ));
        let target = ProfileRef { id: 4, version: 3 };
        match ProfileAssembler::write_for(&context, 1, Some(target)) {
            ProfileWrite::Update {
                id,
                expected_version,
                ..
            } => {
                assert_eq!(id, 4);
                assert_eq!(expected_version, 3);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn patch_step_touches_only_its_blob() {
        let fees = FeesStep {
            refund_policy: "No refunds after 7 days".into(),
            installments_available: YesNo::Yes,
            ..Default::default()
        };
        let patch = ProfileAssembler::patch_step(&fees.into_payload());
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["step6_data"]["installmentsAvailable"], "yes");
    }

    #[test]
    fn patch_of_column_step_touches_its_columns() {
        let patch = ProfileAssembler::patch_step(&ContactStep::default().into_payload());
        assert_eq!(patch.len(), CONTACT_COLUMNS.len());
        assert!(patch.contains_key("pincode"));
    }

    #[test]
    fn disassemble_roundtrips_assembled_record() {
        let context = filled_context();
        let record = ProfileAssembler::assemble(&context, 1);
        let form = ProfileAssembler::disassemble(&record);

        for (step, payload) in context.form_data() {
            assert_eq!(&form[step], payload, "step {step} did not round-trip");
        }
        assert_eq!(form.len(), StepId::ALL.len());
    }

    #[test]
    fn disassemble_tolerates_missing_and_malformed_blobs() {
        let row = json!({
            "id": 3,
            "name": "X",
            "email": null,
            "step3_data": "corrupted",
            "step6_data": { "refundPolicy": 42, "discountsOffered": "10% siblings" }
        });
        let form = ProfileAssembler::disassemble(row.as_object().unwrap());

        assert_eq!(form[&StepId::Courses], StepPayload::default_for(StepId::Courses));
        let fees = FeesStep::from_payload(&form[&StepId::Fees]).unwrap();
        assert_eq!(fees.refund_policy, "");
        assert_eq!(fees.discounts_offered, "10% siblings");
        let basic = BasicInfoStep::from_payload(&form[&StepId::BasicInfo]).unwrap();
        assert_eq!(basic.institution_name, "X");
    }

    #[test]
    fn profile_ref_reads_id_and_version() {
        let row = json!({ "id": 12, "version": 5 });
        assert_eq!(
            ProfileRef::from_row(row.as_object().unwrap()),
            Some(ProfileRef { id: 12, version: 5 })
        );
        assert_eq!(ProfileRef::from_row(&Record::new()), None);
    }
}
