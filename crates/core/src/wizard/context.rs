//! Session-wide aggregate of every wizard step.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::gateway::Record;
use crate::wizard::payload::{StepPayload, StepRecord};
use crate::wizard::steps::StepId;

/// Step payloads keyed by step, in wizard order.
pub type FormData = BTreeMap<StepId, StepPayload>;

/// The aggregate form shared by all step stores of one wizard session.
///
/// Updates replace a step's payload wholesale; there is no field-level merge,
/// so callers always pass a complete payload.
#[derive(Debug, Clone, Default)]
pub struct StepContext {
    steps: FormData,
    revision: u64,
}

impl StepContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context pre-filled with `form` (e.g. from a stored profile).
    pub fn from_form_data(form: FormData) -> Self {
        Self {
            steps: form,
            revision: 0,
        }
    }

    /// Replace the payload for the payload's step.
    pub fn update_step(&mut self, payload: StepPayload) {
        self.steps.insert(payload.step(), payload);
        self.revision += 1;
    }

    pub fn step(&self, step: StepId) -> Option<&StepPayload> {
        self.steps.get(&step)
    }

    /// Typed view of one step, if it has been written.
    pub fn get<P: StepRecord>(&self) -> Option<&P> {
        self.steps.get(&P::STEP).and_then(P::from_payload)
    }

    /// Typed copy of one step, defaulted if it has never been written.
    pub fn get_or_default<P: StepRecord>(&self) -> P {
        self.get::<P>().cloned().unwrap_or_default()
    }

    pub fn form_data(&self) -> &FormData {
        &self.steps
    }

    /// The read model as JSON keyed by step name.
    pub fn form_data_json(&self) -> Value {
        let map: Record = self
            .steps
            .iter()
            .map(|(step, payload)| (step.as_str().to_string(), payload.to_value()))
            .collect();
        Value::Object(map)
    }

    /// Number of updates applied since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::payload::{ContactStep, CoursesStep, FeesStep};

    #[test]
    fn write_then_read_returns_same_payload() {
        let mut context = StepContext::new();
        let mut courses = CoursesStep::default();
        courses.set_category("CBSE", true);
        let payload = courses.into_payload();

        context.update_step(payload.clone());

        assert_eq!(context.step(StepId::Courses), Some(&payload));
        assert_eq!(context.revision(), 1);
    }

    #[test]
    fn update_replaces_instead_of_merging() {
        let mut context = StepContext::new();
        context.update_step(
            ContactStep {
                email: "a@b.in".into(),
                city: "Pune".into(),
                ..Default::default()
            }
            .into_payload(),
        );
        context.update_step(
            ContactStep {
                phone: "12345".into(),
                ..Default::default()
            }
            .into_payload(),
        );

        let contact: &ContactStep = context.get().unwrap();
        assert_eq!(contact.phone, "12345");
        assert_eq!(contact.email, "");
        assert_eq!(contact.city, "");
    }

    #[test]
    fn untouched_steps_default() {
        let context = StepContext::new();
        assert!(context.get::<FeesStep>().is_none());
        assert_eq!(context.get_or_default::<FeesStep>(), FeesStep::default());
    }

    #[test]
    fn form_data_json_is_keyed_by_step_name() {
        let mut context = StepContext::new();
        context.update_step(FeesStep::default().into_payload());
        let json = context.form_data_json();
        assert!(json.get("fees").is_some());
        assert!(json.get("courses").is_none());
    }
}
