//! Pure state transition function for the audio slot
//!
//! Begin moves any state to `Pending` for a newer turn. Complete and Fail
//! only land on the turn that is currently pending; anything addressed to
//! another turn is stale and leaves the state alone.

use super::state::{SynthesisState, TurnId};
use bytes::Bytes;
use thiserror::Error;

/// Inputs to the slot state machine
#[derive(Debug, Clone)]
pub enum SlotEvent {
    Begin { turn: TurnId },
    Complete { turn: TurnId, payload: Bytes },
    Fail { turn: TurnId, reason: String },
}

impl SlotEvent {
    pub fn turn(&self) -> TurnId {
        match self {
            SlotEvent::Begin { turn }
            | SlotEvent::Complete { turn, .. }
            | SlotEvent::Fail { turn, .. } => *turn,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SlotEvent::Begin { .. } => "begin",
            SlotEvent::Complete { .. } => "complete",
            SlotEvent::Fail { .. } => "fail",
        }
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Stale event for turn {got} (slot is on turn {current:?})")]
    Stale {
        current: Option<TurnId>,
        got: TurnId,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Compute the next slot state. No I/O.
pub fn transition(
    state: &SynthesisState,
    event: SlotEvent,
) -> Result<SynthesisState, TransitionError> {
    let current = state.turn();

    match (state, event) {
        (_, SlotEvent::Begin { turn }) => {
            if current.is_some_and(|c| turn <= c) {
                return Err(TransitionError::Stale { current, got: turn });
            }
            Ok(SynthesisState::Pending { turn })
        }

        (SynthesisState::Pending { turn: pending }, SlotEvent::Complete { turn, payload })
            if *pending == turn =>
        {
            Ok(SynthesisState::Ready { turn, payload })
        }

        (SynthesisState::Pending { turn: pending }, SlotEvent::Fail { turn, reason })
            if *pending == turn =>
        {
            Ok(SynthesisState::Failed { turn, reason })
        }

        (_, event) if current != Some(event.turn()) => Err(TransitionError::Stale {
            current,
            got: event.turn(),
        }),

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} + {} for turn {}",
            state.name(),
            event.name(),
            event.turn()
        ))),
    }
}
