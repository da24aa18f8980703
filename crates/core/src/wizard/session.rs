//! One live run of the institution signup wizard.
//!
//! A session owns the shared [`StepContext`] plus one [`FormFieldStore`] per
//! step. Entering a step hydrates its store from the context; every later
//! change writes through to the context. Nothing reaches persistence until
//! submission, except steps flagged durable which the caller mirrors into
//! the draft store.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::FieldErrors;
use crate::wizard::assembler::{ProfileAssembler, ProfileRef, ProfileWrite};
use crate::wizard::context::{FormData, StepContext};
use crate::wizard::form_store::{FormFieldStore, WriteThrough};
use crate::wizard::payload::{
    BasicInfoStep, BatchesStep, ContactStep, CoursesStep, FacilitiesStep, FeesStep, StepPayload,
    StepRecord,
};
use crate::wizard::steps::{validate_step_transition, StepId};

/// The per-step field stores of one session.
#[derive(Debug, Default)]
pub struct StepStores {
    basic_info: FormFieldStore<BasicInfoStep>,
    contact: FormFieldStore<ContactStep>,
    courses: FormFieldStore<CoursesStep>,
    batches: FormFieldStore<BatchesStep>,
    facilities: FormFieldStore<FacilitiesStep>,
    fees: FormFieldStore<FeesStep>,
}

/// Run `$body` with `$store` bound to the typed store for `$step`.
macro_rules! with_store {
    ($stores:expr, $step:expr, |$store:ident| $body:expr) => {
        match $step {
            StepId::BasicInfo => {
                let $store = &mut $stores.basic_info;
                $body
            }
            StepId::Contact => {
                let $store = &mut $stores.contact;
                $body
            }
            StepId::Courses => {
                let $store = &mut $stores.courses;
                $body
            }
            StepId::Batches => {
                let $store = &mut $stores.batches;
                $body
            }
            StepId::Facilities => {
                let $store = &mut $stores.facilities;
                $body
            }
            StepId::Fees => {
                let $store = &mut $stores.fees;
                $body
            }
        }
    };
}

fn hydrate_store<P: StepRecord>(
    store: &mut FormFieldStore<P>,
    context: &StepContext,
) -> Result<StepPayload, CoreError> {
    store.init_from_context(context)?;
    Ok(store.fields().clone().into_payload())
}

fn replace_fields<P: StepRecord>(
    store: &mut FormFieldStore<P>,
    payload: &StepPayload,
) -> Result<WriteThrough, CoreError> {
    let mut record = P::from_payload(payload).cloned().ok_or_else(|| {
        CoreError::Internal(format!("Payload for {} routed to {}", payload.step(), P::STEP))
    })?;
    record.settle();
    store.update(|fields| {
        *fields = record;
        Ok(())
    })
}

/// Result of a change to one step.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOutcome {
    pub step: StepId,
    /// Whether the change reached the shared context.
    pub propagated: bool,
    /// The payload to mirror into the draft store, for durable steps.
    pub durable: Option<StepPayload>,
}

#[derive(Debug)]
pub struct WizardSession {
    id: Uuid,
    owner_id: DbId,
    profile: Option<ProfileRef>,
    current_step: StepId,
    context: StepContext,
    stores: StepStores,
    /// Steps whose store has been hydrated at least once.
    opened: BTreeSet<StepId>,
    created_at: Timestamp,
    last_touched_at: Timestamp,
    /// Set once the profile write succeeded. A submitted session accepts
    /// no further requests, even from callers already waiting on its lock.
    submitted: bool,
}

impl WizardSession {
    /// Start a fresh signup for `owner_id`.
    pub fn new(owner_id: DbId) -> Self {
        Self::with_context(owner_id, None, StepContext::new())
    }

    /// Start a session that edits an existing profile, pre-filled from its
    /// stored row.
    pub fn editing(owner_id: DbId, profile: ProfileRef, form: FormData) -> Self {
        Self::with_context(owner_id, Some(profile), StepContext::from_form_data(form))
    }

    fn with_context(owner_id: DbId, profile: Option<ProfileRef>, context: StepContext) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            profile,
            current_step: StepId::BasicInfo,
            context,
            stores: StepStores::default(),
            opened: BTreeSet::new(),
            created_at: now,
            last_touched_at: now,
            submitted: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> DbId {
        self.owner_id
    }

    pub fn profile(&self) -> Option<ProfileRef> {
        self.profile
    }

    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    pub fn context(&self) -> &StepContext {
        &self.context
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_touched_at(&self) -> Timestamp {
        self.last_touched_at
    }

    /// Hydrate the store for `step` from the context and return its fields.
    pub fn open_step(&mut self, step: StepId) -> Result<StepPayload, CoreError> {
        let context = &self.context;
        let payload = with_store!(self.stores, step, |store| hydrate_store(store, context))?;
        self.opened.insert(step);
        Ok(payload)
    }

    /// Hydrate a store before its first local change, so the change is
    /// applied on top of what the context already holds.
    fn ensure_open(&mut self, step: StepId) -> Result<(), CoreError> {
        if !self.opened.contains(&step) {
            self.open_step(step)?;
        }
        Ok(())
    }

    /// Overwrite a single field of `step`.
    pub fn set_field(
        &mut self,
        step: StepId,
        field: &str,
        value: Value,
    ) -> Result<SetOutcome, CoreError> {
        self.ensure_open(step)?;
        let outcome = with_store!(self.stores, step, |store| store.set(field, value))?;
        Ok(self.apply(step, outcome))
    }

    /// Replace the whole payload of its step.
    pub fn replace_step(&mut self, payload: StepPayload) -> Result<SetOutcome, CoreError> {
        let step = payload.step();
        let outcome = with_store!(self.stores, step, |store| replace_fields(store, &payload))?;
        Ok(self.apply(step, outcome))
    }

    /// Select or de-select a course category.
    pub fn select_category(&mut self, category: &str, selected: bool) -> Result<SetOutcome, CoreError> {
        if category.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("courseCategories", "Category name must not be empty");
            return Err(CoreError::FieldValidation(errors));
        }
        self.ensure_open(StepId::Courses)?;
        let outcome = self.stores.courses.update(|courses| {
            courses.set_category(category, selected);
            Ok(())
        })?;
        Ok(self.apply(StepId::Courses, outcome))
    }

    /// Add or remove a subject under a selected category.
    pub fn set_subject(
        &mut self,
        category: &str,
        subject: &str,
        on: bool,
    ) -> Result<SetOutcome, CoreError> {
        self.ensure_open(StepId::Courses)?;
        let outcome = self
            .stores
            .courses
            .update(|courses| courses.set_subject(category, subject, on))?;
        Ok(self.apply(StepId::Courses, outcome))
    }

    /// Move to the next step once the current one passes its required-field
    /// checks. The next step's store is hydrated on entry.
    pub fn advance(&mut self) -> Result<StepId, CoreError> {
        self.required_errors(self.current_step).into_result()?;
        let next = self.current_step.next().ok_or_else(|| {
            CoreError::Validation("Already at the last step; submit the wizard instead".into())
        })?;
        self.move_to(next)
    }

    /// Move to the previous step. Back navigation never validates.
    pub fn go_back(&mut self) -> Result<StepId, CoreError> {
        let previous = self
            .current_step
            .previous()
            .ok_or_else(|| CoreError::Validation("Already at the first step".into()))?;
        self.move_to(previous)
    }

    fn move_to(&mut self, step: StepId) -> Result<StepId, CoreError> {
        validate_step_transition(self.current_step, step)?;
        self.open_step(step)?;
        self.current_step = step;
        Ok(step)
    }

    /// Load a mirrored draft into the context. Returns `false` if the step
    /// already holds data, which always wins over the draft.
    pub fn restore_draft(&mut self, payload: StepPayload) -> Result<bool, CoreError> {
        let step = payload.step();
        if self.context.step(step).is_some() {
            return Ok(false);
        }
        self.context.update_step(payload);
        self.open_step(step)?;
        Ok(true)
    }

    /// Required-field checks across every step, for submission.
    pub fn validate_all(&self) -> Result<(), CoreError> {
        let mut errors = FieldErrors::new();
        for step in StepId::ALL {
            errors.merge(self.required_errors(step));
        }
        errors.into_result()
    }

    /// The single profile write for this session.
    pub fn submission(&self) -> ProfileWrite {
        ProfileAssembler::write_for(&self.context, self.owner_id, self.profile)
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    pub fn touch(&mut self) {
        self.last_touched_at = Utc::now();
    }

    /// Whether the session has been idle for longer than `ttl`.
    pub fn is_expired(&self, now: Timestamp, ttl: chrono::Duration) -> bool {
        now - self.last_touched_at > ttl
    }

    fn required_errors(&self, step: StepId) -> FieldErrors {
        match self.context.step(step) {
            Some(payload) => payload.check_required(),
            None => StepPayload::default_for(step).check_required(),
        }
    }

    fn apply(&mut self, step: StepId, outcome: WriteThrough) -> SetOutcome {
        let propagated = outcome.apply(&mut self.context);
        let durable = if propagated && step.is_durable() {
            self.context.step(step).cloned()
        } else {
            None
        };
        if propagated {
            tracing::debug!(session_id = %self.id, step = %step, "Step updated");
        }
        SetOutcome {
            step,
            propagated,
            durable,
        }
    }
}
