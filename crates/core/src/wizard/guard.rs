//! Hydration guard for step stores.
//!
//! Loading a step from the shared context must not write that same data
//! straight back into the context. The guard is an explicit state machine:
//! [`SyncGuard::begin`] moves it to `Hydrating` and hands out a token, and
//! only [`SyncGuard::complete`] with that token returns it to `Idle`. While
//! hydrating, every write-through is suppressed.

use crate::error::CoreError;

/// Current state of a [`SyncGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationState {
    Idle,
    Hydrating { epoch: u64 },
}

/// Completion signal for one hydration. Only the token returned by the
/// matching [`SyncGuard::begin`] call can end it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a hydration that is never completed leaves the guard active"]
pub struct HydrationToken {
    epoch: u64,
}

#[derive(Debug)]
pub struct SyncGuard {
    state: HydrationState,
    next_epoch: u64,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self {
            state: HydrationState::Idle,
            next_epoch: 1,
        }
    }

    pub fn state(&self) -> HydrationState {
        self.state
    }

    /// Whether context writes must currently be suppressed.
    pub fn is_active(&self) -> bool {
        matches!(self.state, HydrationState::Hydrating { .. })
    }

    /// Enter the hydrating state. Re-entrant hydration is rejected.
    pub fn begin(&mut self) -> Result<HydrationToken, CoreError> {
        if let HydrationState::Hydrating { epoch } = self.state {
            return Err(CoreError::Conflict(format!(
                "Hydration {epoch} is still in progress"
            )));
        }
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.state = HydrationState::Hydrating { epoch };
        Ok(HydrationToken { epoch })
    }

    /// Leave the hydrating state. Returns `false` (and changes nothing) if
    /// `token` belongs to an earlier hydration.
    pub fn complete(&mut self, token: HydrationToken) -> bool {
        match self.state {
            HydrationState::Hydrating { epoch } if epoch == token.epoch => {
                self.state = HydrationState::Idle;
                true
            }
            _ => false,
        }
    }
}

impl Default for SyncGuard {
    fn default() -> Self {
        Self::new()
    }
}
