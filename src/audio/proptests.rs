//! Property-based tests for the audio slot state machine
//!
//! Invariants checked over arbitrary event sequences:
//! - A ready payload always belongs to the turn the state reports
//! - Begin always leaves the slot not-ready
//! - Events the slot rejects leave it exactly as it was
//! - The reported turn never decreases

use super::state::{FailurePolicy, SynthesisState};
use super::transition::{transition, SlotEvent};
use super::{AudioError, AudioSlot};
use bytes::Bytes;
use proptest::prelude::*;

fn payload_for(turn: u64) -> Bytes {
    Bytes::from(turn.to_le_bytes().to_vec())
}

fn arb_event() -> impl Strategy<Value = SlotEvent> {
    prop_oneof![
        (1u64..12).prop_map(|turn| SlotEvent::Begin { turn }),
        (1u64..12).prop_map(|turn| SlotEvent::Complete {
            turn,
            payload: payload_for(turn),
        }),
        (1u64..12, "[a-z ]{0,12}").prop_map(|(turn, reason)| SlotEvent::Fail { turn, reason }),
    ]
}

#[derive(Debug, Clone)]
enum SlotOp {
    Begin,
    Complete(u64),
    Fail(u64),
}

fn arb_slot_op() -> impl Strategy<Value = SlotOp> {
    prop_oneof![
        Just(SlotOp::Begin),
        (1u64..12).prop_map(SlotOp::Complete),
        (1u64..12).prop_map(SlotOp::Fail),
    ]
}

proptest! {
    #[test]
    fn prop_ready_payload_matches_turn(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = SynthesisState::Idle;
        for event in events {
            if let Ok(next) = transition(&state, event) {
                state = next;
            }
            if let SynthesisState::Ready { turn, payload } = &state {
                prop_assert_eq!(payload, &payload_for(*turn));
            }
        }
    }

    #[test]
    fn prop_begin_never_ready(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = SynthesisState::Idle;
        for event in events {
            let is_begin = matches!(event, SlotEvent::Begin { .. });
            if let Ok(next) = transition(&state, event) {
                state = next;
                if is_begin {
                    prop_assert!(!state.is_ready(FailurePolicy::FailClosed));
                    prop_assert!(!state.is_ready(FailurePolicy::Signal));
                    prop_assert!(state.payload().is_none());
                }
            }
        }
    }

    #[test]
    fn prop_slot_rejections_change_nothing(
        ops in proptest::collection::vec(arb_slot_op(), 0..60),
        signal in any::<bool>(),
    ) {
        let policy = if signal { FailurePolicy::Signal } else { FailurePolicy::FailClosed };
        let slot = AudioSlot::new(policy);

        for op in ops {
            let before = slot.snapshot();
            match op {
                SlotOp::Begin => {
                    let turn = slot.begin_synthesis();
                    prop_assert!(before.0.turn.map_or(true, |prev| turn > prev));
                }
                SlotOp::Complete(turn) => {
                    if !slot.complete_synthesis(turn, payload_for(turn)) {
                        prop_assert_eq!(slot.snapshot(), before);
                    }
                }
                SlotOp::Fail(turn) => {
                    if !slot.fail_synthesis(turn, "tts down") {
                        prop_assert_eq!(slot.snapshot(), before);
                    }
                }
            }

            let (status, payload) = slot.snapshot();
            if status.state == "ready" {
                let turn = status.turn.unwrap_or_default();
                prop_assert_eq!(payload, Some(payload_for(turn)));
            } else {
                prop_assert!(payload.is_none());
                prop_assert_eq!(slot.fetch_payload(), Err(AudioError::NotFound));
            }
        }
    }

    #[test]
    fn prop_turn_monotonic(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = SynthesisState::Idle;
        let mut high_water = 0u64;
        for event in events {
            if let Ok(next) = transition(&state, event) {
                state = next;
            }
            let turn = state.turn().unwrap_or(0);
            prop_assert!(turn >= high_water);
            high_water = turn;
        }
    }
}
