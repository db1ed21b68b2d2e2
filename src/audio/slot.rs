//! Process-wide audio slot
//!
//! Every access takes the lock once, applies or reads the state, and
//! releases it. Synthesis itself runs outside the lock.

use super::state::{FailurePolicy, SynthesisState, TurnId};
use super::transition::{transition, SlotEvent, TransitionError};
use super::AudioError;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Default)]
struct SlotInner {
    state: SynthesisState,
    last_turn: TurnId,
}

/// Single-occupant store for the latest synthesized reply
#[derive(Debug, Default)]
pub struct AudioSlot {
    inner: Mutex<SlotInner>,
    policy: FailurePolicy,
}

/// Point-in-time view of the slot for pollers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub ready: bool,
    pub state: &'static str,
    pub turn: Option<TurnId>,
}

impl AudioSlot {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            inner: Mutex::new(SlotInner::default()),
            policy,
        }
    }

    /// Start a new attempt. Clears any previous payload and ready flag.
    pub fn begin_synthesis(&self) -> TurnId {
        let mut inner = self.inner.lock();
        let turn = inner.last_turn + 1;
        match transition(&inner.state, SlotEvent::Begin { turn }) {
            Ok(next) => inner.state = next,
            // last_turn only grows, so begin cannot be stale; keep the slot usable anyway
            Err(e) => {
                tracing::error!(turn, error = %e, "Audio slot rejected begin");
                inner.state = SynthesisState::Pending { turn };
            }
        }
        inner.last_turn = turn;
        tracing::debug!(turn, "Synthesis started");
        turn
    }

    /// Store the payload for `turn` and mark it ready.
    ///
    /// Returns false if `turn` has been superseded; the payload is dropped.
    pub fn complete_synthesis(&self, turn: TurnId, payload: Bytes) -> bool {
        let bytes = payload.len();
        let applied = self.apply(SlotEvent::Complete { turn, payload });
        if applied {
            tracing::debug!(turn, bytes, "Synthesis complete");
        }
        applied
    }

    /// Record that the attempt for `turn` produced no audio.
    pub fn fail_synthesis(&self, turn: TurnId, reason: impl Into<String>) -> bool {
        let applied = self.apply(SlotEvent::Fail {
            turn,
            reason: reason.into(),
        });
        if applied {
            tracing::debug!(turn, policy = %self.policy, "Synthesis marked failed");
        }
        applied
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().state.is_ready(self.policy)
    }

    /// Return the stored payload if the current attempt completed.
    pub fn fetch_payload(&self) -> Result<Bytes, AudioError> {
        self.inner
            .lock()
            .state
            .payload()
            .cloned()
            .ok_or(AudioError::NotFound)
    }

    pub fn status(&self) -> SlotStatus {
        let inner = self.inner.lock();
        SlotStatus {
            ready: inner.state.is_ready(self.policy),
            state: inner.state.name(),
            turn: inner.state.turn(),
        }
    }

    /// Status and payload read under one lock
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> (SlotStatus, Option<Bytes>) {
        let inner = self.inner.lock();
        let status = SlotStatus {
            ready: inner.state.is_ready(self.policy),
            state: inner.state.name(),
            turn: inner.state.turn(),
        };
        (status, inner.state.payload().cloned())
    }

    fn apply(&self, event: SlotEvent) -> bool {
        let mut inner = self.inner.lock();
        match transition(&inner.state, event) {
            Ok(next) => {
                inner.state = next;
                true
            }
            Err(TransitionError::Stale { current, got }) => {
                tracing::info!(
                    turn = got,
                    current = ?current,
                    "Discarding result from superseded synthesis"
                );
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Audio slot rejected event");
                false
            }
        }
    }
}
