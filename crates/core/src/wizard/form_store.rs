//! Per-step local field store.

use serde_json::Value;

use crate::error::CoreError;
use crate::wizard::context::StepContext;
use crate::wizard::guard::{HydrationToken, SyncGuard};
use crate::wizard::payload::{with_field, StepPayload, StepRecord};

/// Outcome of a local change.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteThrough {
    /// The change must be written to the shared context.
    Propagate(StepPayload),
    /// A hydration is in progress; the context must not be touched.
    Suppressed,
}

impl WriteThrough {
    /// Apply the outcome to `context`. Returns whether anything was written.
    pub fn apply(self, context: &mut StepContext) -> bool {
        match self {
            Self::Propagate(payload) => {
                context.update_step(payload);
                true
            }
            Self::Suppressed => false,
        }
    }

    pub fn is_propagated(&self) -> bool {
        matches!(self, Self::Propagate(_))
    }
}

/// Holds and mutates one step's typed fields, independent of persistence.
///
/// Every local change produces a [`WriteThrough`]: the full step payload to
/// write to the context, or `Suppressed` while the store is hydrating from
/// that same context.
#[derive(Debug, Default)]
pub struct FormFieldStore<P: StepRecord> {
    fields: P,
    guard: SyncGuard,
    suppressed_writes: u64,
}

impl<P: StepRecord> FormFieldStore<P> {
    pub fn new() -> Self {
        Self {
            fields: P::default(),
            guard: SyncGuard::new(),
            suppressed_writes: 0,
        }
    }

    pub fn fields(&self) -> &P {
        &self.fields
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    /// Number of context writes dropped because a hydration was running.
    pub fn suppressed_writes(&self) -> u64 {
        self.suppressed_writes
    }

    /// Overwrite one field.
    pub fn set(&mut self, field: &str, value: Value) -> Result<WriteThrough, CoreError> {
        self.fields = with_field(&self.fields, field, value)?;
        Ok(self.write_through())
    }

    /// Apply a typed mutation. If `f` fails the local fields are left as
    /// they were and nothing is written.
    pub fn update<F>(&mut self, f: F) -> Result<WriteThrough, CoreError>
    where
        F: FnOnce(&mut P) -> Result<(), CoreError>,
    {
        let mut next = self.fields.clone();
        f(&mut next)?;
        self.fields = next;
        Ok(self.write_through())
    }

    /// Hydrate from `context` and complete immediately.
    pub fn init_from_context(&mut self, context: &StepContext) -> Result<(), CoreError> {
        let token = self.begin_hydration(context)?;
        self.finish_hydration(token);
        Ok(())
    }

    /// Overwrite all local fields from the context (or defaults when the step
    /// was never written) and run the record's derived effects. Context
    /// writes stay suppressed until [`Self::finish_hydration`] is called with
    /// the returned token.
    pub fn begin_hydration(&mut self, context: &StepContext) -> Result<HydrationToken, CoreError> {
        let token = self.guard.begin()?;
        self.fields = context.get_or_default::<P>();

        let mut settled = self.fields.clone();
        settled.settle();
        if settled != self.fields {
            self.fields = settled;
            // Derived-effect writes are local only while hydrating.
            let outcome = self.write_through();
            debug_assert_eq!(outcome, WriteThrough::Suppressed);
        }
        Ok(token)
    }

    /// Signal that hydration and its derived effects have settled.
    pub fn finish_hydration(&mut self, token: HydrationToken) -> bool {
        self.guard.complete(token)
    }

    fn write_through(&mut self) -> WriteThrough {
        if self.guard.is_active() {
            self.suppressed_writes += 1;
            tracing::debug!(step = %P::STEP, "Context write suppressed during hydration");
            WriteThrough::Suppressed
        } else {
            WriteThrough::Propagate(self.fields.clone().into_payload())
        }
    }
}
