//! Per-vendor toggle state machine.
//!
//! `Idle → Pending → Confirmed | Reverted`, and any phase may begin a new
//! toggle. Each toggle carries a sequence number; a completion whose
//! sequence is not the one currently pending is ignored, so the last
//! request sent decides what the view shows. A toggle begun over a pending
//! one inherits its `prior`, so a failure never restores an unconfirmed
//! guess.

/// Where a vendor's toggle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePhase {
    /// No toggle has run since the last reload.
    #[default]
    Idle,
    /// A request is in flight; the view shows `tentative`.
    Pending {
        /// The optimistic value shown while waiting.
        tentative: bool,
        /// The value to restore on failure.
        prior: bool,
        /// Sequence number of the in-flight request.
        seq: u64,
    },
    /// The server confirmed `value`.
    Confirmed { value: bool },
    /// The request failed and the view was restored to `value`.
    Reverted { value: bool },
}

/// Inputs to [`reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEvent {
    /// A toggle starts from the value currently shown.
    Begin { current_known: bool, seq: u64 },
    /// The server confirmed a value for request `seq`.
    Succeeded { confirmed: bool, seq: u64 },
    /// Request `seq` failed.
    Failed { seq: u64 },
}

impl TogglePhase {
    /// The value a view should display, if this phase determines one.
    pub fn displayed(&self) -> Option<bool> {
        match *self {
            Self::Idle => None,
            Self::Pending { tentative, .. } => Some(tentative),
            Self::Confirmed { value } | Self::Reverted { value } => Some(value),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Whether `event` applies to this phase. Completions for any
    /// sequence other than the pending one are stale.
    pub fn accepts(&self, event: &ToggleEvent) -> bool {
        match (self, event) {
            (_, ToggleEvent::Begin { .. }) => true,
            (Self::Pending { seq, .. }, ToggleEvent::Succeeded { seq: done, .. })
            | (Self::Pending { seq, .. }, ToggleEvent::Failed { seq: done }) => seq == done,
            _ => false,
        }
    }
}

/// Pure transition function. Stale events leave the phase unchanged.
pub fn reduce(phase: &TogglePhase, event: ToggleEvent) -> TogglePhase {
    if !phase.accepts(&event) {
        return *phase;
    }

    match (phase, event) {
        (TogglePhase::Pending { prior, .. }, ToggleEvent::Begin { current_known, seq }) => {
            TogglePhase::Pending {
                tentative: !current_known,
                prior: *prior,
                seq,
            }
        }
        (_, ToggleEvent::Begin { current_known, seq }) => TogglePhase::Pending {
            tentative: !current_known,
            prior: current_known,
            seq,
        },
        (_, ToggleEvent::Succeeded { confirmed, .. }) => TogglePhase::Confirmed { value: confirmed },
        (TogglePhase::Pending { prior, .. }, ToggleEvent::Failed { .. }) => {
            TogglePhase::Reverted { value: *prior }
        }
        _ => *phase,
    }
}
