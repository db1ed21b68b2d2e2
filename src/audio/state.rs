//! Synthesis slot state types

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

/// Identifier of one synthesis attempt. Strictly increasing per slot.
pub type TurnId = u64;

/// State of the audio slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SynthesisState {
    /// Nothing has been synthesized yet
    #[default]
    Idle,

    /// A synthesis attempt for `turn` is running
    Pending { turn: TurnId },

    /// Audio for `turn` is stored and can be fetched
    Ready { turn: TurnId, payload: Bytes },

    /// The attempt for `turn` failed; there is no payload
    Failed { turn: TurnId, reason: String },
}

impl SynthesisState {
    /// Wire name used by the status endpoint
    pub fn name(&self) -> &'static str {
        match self {
            SynthesisState::Idle => "idle",
            SynthesisState::Pending { .. } => "pending",
            SynthesisState::Ready { .. } => "ready",
            SynthesisState::Failed { .. } => "failed",
        }
    }

    /// Turn this state belongs to, if any
    pub fn turn(&self) -> Option<TurnId> {
        match self {
            SynthesisState::Idle => None,
            SynthesisState::Pending { turn }
            | SynthesisState::Ready { turn, .. }
            | SynthesisState::Failed { turn, .. } => Some(*turn),
        }
    }

    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            SynthesisState::Ready { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Whether pollers should stop waiting, under the given policy
    pub fn is_ready(&self, policy: FailurePolicy) -> bool {
        match self {
            SynthesisState::Ready { .. } => true,
            SynthesisState::Failed { .. } => policy == FailurePolicy::Signal,
            SynthesisState::Idle | SynthesisState::Pending { .. } => false,
        }
    }
}

/// How a failed synthesis shows up to pollers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Ready stays false; pollers time out
    #[default]
    FailClosed,
    /// Ready turns true with no payload; fetch answers not-found
    Signal,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::FailClosed => "fail-closed",
            FailurePolicy::Signal => "signal",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-closed" | "fail_closed" | "closed" => Ok(FailurePolicy::FailClosed),
            "signal" | "fire-and-signal" => Ok(FailurePolicy::Signal),
            other => Err(format!(
                "unknown audio failure policy '{other}' (expected 'fail-closed' or 'signal')"
            )),
        }
    }
}
