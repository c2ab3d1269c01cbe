//! Property tests for the detection state machine and the NCI framing
//! layer.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets. On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;
use tagwatch::app::events::AppEvent;
use tagwatch::app::ports::{EventSink, TagsConsumer, TagsPort};
use tagwatch::app::{DetectState, TagDetector};
use tagwatch::nci::frame::{ControlFrame, MAX_PAYLOAD, RawFrame, gid, oid};
use tagwatch::tags::types::{Completion, OpId, Status};

// ── Test doubles ──────────────────────────────────────────────

struct CountingTags {
    issued: usize,
}

impl TagsPort for CountingTags {
    fn cmd_reset(&mut self) -> Status {
        self.issued += 1;
        Status::Ok
    }

    fn cmd_discover(&mut self) -> Status {
        self.issued += 1;
        Status::Ok
    }

    fn cmd_deactivate(&mut self) -> Status {
        self.issued += 1;
        Status::Ok
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

// ── Strategies ────────────────────────────────────────────────

fn arb_op() -> impl Strategy<Value = OpId> {
    prop_oneof![
        Just(OpId::Reset),
        Just(OpId::Discover),
        Just(OpId::DiscoverActivated),
        Just(OpId::Deactivate),
        Just(OpId::Dump),
    ]
}

fn arb_completion() -> impl Strategy<Value = Completion> {
    (arb_op(), any::<bool>()).prop_map(|(op, ok)| {
        if ok {
            Completion::ok(op)
        } else {
            Completion::failed(op)
        }
    })
}

/// One step of the control loop: either a tick or a completion delivery.
#[derive(Debug, Clone)]
enum Step {
    Tick,
    Complete(Completion),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Tick),
        arb_completion().prop_map(Step::Complete),
    ]
}

// ── Detector invariants ───────────────────────────────────────

proptest! {
    /// Arbitrary interleavings of ticks and completions never panic, and
    /// once the machine reaches `Error` it never leaves it.
    #[test]
    fn error_state_is_absorbing(steps in proptest::collection::vec(arb_step(), 1..64)) {
        let mut det = TagDetector::new();
        let mut tags = CountingTags { issued: 0 };
        let mut sink = NullSink;
        let mut seen_error = false;

        for step in steps {
            match step {
                Step::Tick => det.tick(&mut tags, &mut sink),
                Step::Complete(c) => det.on_completion(c, None, &mut sink),
            }
            if seen_error {
                prop_assert_eq!(det.state(), DetectState::Error);
            }
            seen_error |= det.state() == DetectState::Error;
        }
    }

    /// A failed completion for any operation but Dump always lands in
    /// `Error`, from every non-terminal state.
    #[test]
    fn failure_always_reaches_error(
        steps in proptest::collection::vec(arb_step(), 0..32),
        op in arb_op(),
    ) {
        prop_assume!(op != OpId::Dump);

        let mut det = TagDetector::new();
        let mut tags = CountingTags { issued: 0 };
        let mut sink = NullSink;
        for step in steps {
            match step {
                Step::Tick => det.tick(&mut tags, &mut sink),
                Step::Complete(c) => det.on_completion(c, None, &mut sink),
            }
        }
        prop_assume!(det.state() != DetectState::Terminated);

        det.on_completion(Completion::failed(op), None, &mut sink);
        prop_assert_eq!(det.state(), DetectState::Error);
    }

    /// Dump completions never move the machine.
    #[test]
    fn dump_never_changes_state(
        steps in proptest::collection::vec(arb_step(), 0..32),
        ok in any::<bool>(),
    ) {
        let mut det = TagDetector::new();
        let mut tags = CountingTags { issued: 0 };
        let mut sink = NullSink;
        for step in steps {
            match step {
                Step::Tick => det.tick(&mut tags, &mut sink),
                Step::Complete(c) => det.on_completion(c, None, &mut sink),
            }
        }

        let before = det.state();
        let completion = if ok {
            Completion::ok(OpId::Dump)
        } else {
            Completion::failed(OpId::Dump)
        };
        det.on_completion(completion, None, &mut sink);
        prop_assert_eq!(det.state(), before);
    }

    /// Ticks in await states, terminal states, and `WaitingForTag` issue
    /// no commands: at most one command can ever be outstanding.
    #[test]
    fn at_most_one_outstanding_command(steps in proptest::collection::vec(arb_step(), 1..64)) {
        let mut det = TagDetector::new();
        let mut tags = CountingTags { issued: 0 };
        let mut sink = NullSink;
        let mut outstanding = 0usize;

        for step in steps {
            let before = tags.issued;
            match step {
                Step::Tick => det.tick(&mut tags, &mut sink),
                Step::Complete(c) => {
                    det.on_completion(c, None, &mut sink);
                    outstanding = outstanding.saturating_sub(1);
                }
            }
            outstanding += tags.issued - before;
            prop_assert!(outstanding <= 1, "issued {} commands with one pending", outstanding);
        }
    }
}

// ── Frame codec robustness ────────────────────────────────────

proptest! {
    /// Arbitrary byte strings never panic the parser.
    #[test]
    fn parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = ControlFrame::parse(&bytes);
    }

    /// Every encodable command survives an encode/parse round trip.
    #[test]
    fn command_round_trip(
        g in 0u8..=0x0F,
        o in 0u8..=0x3F,
        payload in proptest::collection::vec(any::<u8>(), 0..MAX_PAYLOAD),
    ) {
        let cmd = ControlFrame::command(g, o, &payload).unwrap();
        let raw: RawFrame = cmd.encode();
        let parsed = ControlFrame::parse(&raw).unwrap();
        prop_assert_eq!(parsed.gid, g);
        prop_assert_eq!(parsed.oid, o);
        prop_assert_eq!(&parsed.payload[..], &payload[..]);
    }

    /// Declared length must match the actual byte count.
    #[test]
    fn truncated_frames_are_rejected(extra in 1u8..=10) {
        let cmd = ControlFrame::command(gid::CORE, oid::CORE_RESET, &[0x01]).unwrap();
        let mut raw = cmd.encode();
        raw[2] += extra;
        prop_assert!(ControlFrame::parse(&raw).is_err());
    }
}
