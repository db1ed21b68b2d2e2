//! Audio readiness handshake
//!
//! A single-slot mailbox holding the most recent synthesized reply, plus the
//! state machine that tells pollers whether it is worth fetching yet.
//! Transitions are pure (see [`transition`]); [`AudioSlot`] applies them
//! under one short lock.

mod slot;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use slot::{AudioSlot, SlotStatus};
pub use state::{FailurePolicy, TurnId};

use thiserror::Error;

/// Errors surfaced to audio consumers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("No audio available")]
    NotFound,
}
