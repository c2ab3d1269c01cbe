//! Tag-operations engine.
//!
//! Drives the controller through reset, discovery, activation, and
//! deactivation, and reports each operation's outcome to the registered
//! [`TagsConsumer`]. Commands arrive through [`TagsPort`]; outcomes are
//! delivered from `tick()`, which pumps the controller link once per call.
//!
//! The reset command chains `CORE_RESET` and `CORE_INIT` internally and
//! reports a single completion for the pair.

pub mod types;

use log::{debug, info, warn};

use crate::app::ports::{EventSink, TagsConsumer, TagsPort};
use crate::drivers::ControllerLink;
use crate::error::Result;
use crate::nci::frame::{RESET_TYPE_RESET_CONFIG, deactivate_type, gid, oid, rf_tech, status};
use crate::nci::{NciEngine, NciEvent};
use types::{Completion, OpId, Status, TagIntf};

/// Where the engine is in the command/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    /// Controller not initialized (boot, or a failed reset).
    Idle,
    ResetAwaitRsp,
    InitAwaitRsp,
    /// Initialized, not polling.
    Ready,
    DiscoverAwaitRsp,
    /// Polling for tags.
    Discovering,
    /// A tag interface is activated.
    TagActive,
    DeactivateAwaitRsp,
}

impl EngineState {
    /// The operation whose outcome this state is waiting on, if any.
    fn awaiting(self) -> Option<OpId> {
        match self {
            Self::ResetAwaitRsp | Self::InitAwaitRsp => Some(OpId::Reset),
            Self::DiscoverAwaitRsp => Some(OpId::Discover),
            Self::DeactivateAwaitRsp => Some(OpId::Deactivate),
            _ => None,
        }
    }
}

pub struct TagsEngine<L: ControllerLink> {
    nci: NciEngine<L>,
    state: EngineState,
    active_tag: Option<TagIntf>,
}

impl<L: ControllerLink> TagsEngine<L> {
    pub fn new(nci: NciEngine<L>) -> Self {
        Self {
            nci,
            state: EngineState::Idle,
            active_tag: None,
        }
    }

    /// Pulse the controller's hardware reset line. Called once at boot,
    /// before the first `cmd_reset`.
    pub fn init(&mut self) -> Result<()> {
        self.nci.hardware_reset()
    }

    pub fn active_tag(&self) -> Option<&TagIntf> {
        self.active_tag.as_ref()
    }

    /// Direct access to the controller link, for test harnesses.
    pub fn link_mut(&mut self) -> &mut L {
        self.nci.link_mut()
    }

    /// Pump the controller link once and deliver any resulting completion
    /// to `consumer`. At most one completion per call.
    pub fn tick(&mut self, consumer: &mut dyn TagsConsumer, sink: &mut dyn EventSink) {
        let Some(event) = self.nci.pump() else {
            return;
        };
        self.handle_event(event, consumer, sink);
    }

    fn handle_event(
        &mut self,
        event: NciEvent,
        consumer: &mut dyn TagsConsumer,
        sink: &mut dyn EventSink,
    ) {
        match (self.state, event) {
            (EngineState::ResetAwaitRsp, NciEvent::CoreResetRsp { status: st }) => {
                if st != status::OK {
                    warn!("tags: CORE_RESET rejected (status={st:#x})");
                    self.state = EngineState::Idle;
                    consumer.on_completion(Completion::failed(OpId::Reset), None, sink);
                    return;
                }
                match self.nci.send_command(gid::CORE, oid::CORE_INIT, &[]) {
                    Ok(()) => self.state = EngineState::InitAwaitRsp,
                    Err(e) => {
                        warn!("tags: CORE_INIT send failed: {e}");
                        self.state = EngineState::Idle;
                        consumer.on_completion(Completion::failed(OpId::Reset), None, sink);
                    }
                }
            }
            (EngineState::InitAwaitRsp, NciEvent::CoreInitRsp { status: st }) => {
                if st == status::OK {
                    info!("tags: controller initialized");
                    self.state = EngineState::Ready;
                    consumer.on_completion(Completion::ok(OpId::Reset), None, sink);
                } else {
                    warn!("tags: CORE_INIT rejected (status={st:#x})");
                    self.state = EngineState::Idle;
                    consumer.on_completion(Completion::failed(OpId::Reset), None, sink);
                }
            }
            (EngineState::DiscoverAwaitRsp, NciEvent::DiscoverRsp { status: st }) => {
                if st == status::OK {
                    self.state = EngineState::Discovering;
                    consumer.on_completion(Completion::ok(OpId::Discover), None, sink);
                } else {
                    warn!("tags: RF_DISCOVER rejected (status={st:#x})");
                    self.state = EngineState::Ready;
                    consumer.on_completion(Completion::failed(OpId::Discover), None, sink);
                }
            }
            (EngineState::Discovering, NciEvent::IntfActivated { params }) => {
                self.state = EngineState::TagActive;
                self.active_tag = TagIntf::from_activation(&params);
                if self.active_tag.is_none() {
                    debug!("tags: activated interface uses an unsupported technology");
                }
                // Borrow scoped to the callback; the consumer copies what
                // it needs.
                let tag = self.active_tag.clone();
                consumer.on_completion(Completion::ok(OpId::DiscoverActivated), tag.as_ref(), sink);
            }
            (EngineState::DeactivateAwaitRsp, NciEvent::DeactivateRsp { status: st }) => {
                if st == status::OK {
                    // Deactivate-to-discovery: the controller resumes
                    // polling on its own.
                    self.state = EngineState::Discovering;
                    self.active_tag = None;
                    consumer.on_completion(Completion::ok(OpId::Deactivate), None, sink);
                } else {
                    warn!("tags: RF_DEACTIVATE rejected (status={st:#x})");
                    self.state = EngineState::TagActive;
                    consumer.on_completion(Completion::failed(OpId::Deactivate), None, sink);
                }
            }
            (_, NciEvent::DeactivateNtf { reason, .. }) => {
                // Link-loss and command-completion notifications carry no
                // new state for this firmware.
                debug!("tags: deactivate ntf (reason={reason:#x})");
            }
            (_, NciEvent::Other { gid, oid, .. }) => {
                debug!("tags: ignoring packet gid={gid:#x} oid={oid:#x}");
            }
            (st, event) => {
                // A malformed packet or a response that does not match the
                // outstanding command fails that command.
                warn!("tags: unexpected event {event:?} in {st:?}");
                if let Some(op) = st.awaiting() {
                    self.state = EngineState::Idle;
                    consumer.on_completion(Completion::failed(op), None, sink);
                }
            }
        }
    }

    fn send_or_fail(&mut self, gid: u8, oid: u8, payload: &[u8], next: EngineState) -> Status {
        match self.nci.send_command(gid, oid, payload) {
            Ok(()) => {
                self.state = next;
                Status::Ok
            }
            Err(e) => {
                warn!("tags: command send failed: {e}");
                Status::Failed
            }
        }
    }
}

impl<L: ControllerLink> TagsPort for TagsEngine<L> {
    fn cmd_reset(&mut self) -> Status {
        self.send_or_fail(
            gid::CORE,
            oid::CORE_RESET,
            &[RESET_TYPE_RESET_CONFIG],
            EngineState::ResetAwaitRsp,
        )
    }

    fn cmd_discover(&mut self) -> Status {
        // Poll NFC-A and NFC-F every discovery period.
        let map = [
            2,
            rf_tech::NFC_A_PASSIVE_POLL,
            1,
            rf_tech::NFC_F_PASSIVE_POLL,
            1,
        ];
        self.send_or_fail(gid::RF, oid::RF_DISCOVER, &map, EngineState::DiscoverAwaitRsp)
    }

    fn cmd_deactivate(&mut self) -> Status {
        self.send_or_fail(
            gid::RF,
            oid::RF_DEACTIVATE,
            &[deactivate_type::DISCOVERY],
            EngineState::DeactivateAwaitRsp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::AppEvent;
    use crate::drivers::mock::MockLink;
    use crate::nci::frame::{self, notification, response};

    struct RecordingConsumer {
        completions: Vec<(Completion, Option<TagIntf>)>,
    }

    impl TagsConsumer for RecordingConsumer {
        fn on_completion(
            &mut self,
            completion: Completion,
            tag: Option<&TagIntf>,
            _sink: &mut dyn EventSink,
        ) {
            self.completions.push((completion, tag.cloned()));
        }
    }

    struct NullSink;

    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    fn harness() -> (TagsEngine<MockLink>, RecordingConsumer, NullSink) {
        let engine = TagsEngine::new(NciEngine::new(MockLink::new(), 5));
        let consumer = RecordingConsumer {
            completions: Vec::new(),
        };
        (engine, consumer, NullSink)
    }

    const T2T_NTF: &[u8] = &[
        0x01, 0x02, 0x02, 0x00, 0xFB, 0x01, 0x07, 0x44, 0x00, 0x04, 0x04, 0x12, 0x34, 0x56,
    ];

    #[test]
    fn reset_chains_core_init_and_completes_once() {
        let (mut engine, mut consumer, mut sink) = harness();
        assert_eq!(engine.cmd_reset(), Status::Ok);
        engine
            .link_mut()
            .push_frame(response(frame::gid::CORE, frame::oid::CORE_RESET, &[0x00, 0x10, 0x01]));

        engine.tick(&mut consumer, &mut sink);
        // Reset response consumed, CORE_INIT sent, no completion yet.
        assert!(consumer.completions.is_empty());
        assert_eq!(engine.link_mut().sent().len(), 2);

        engine
            .link_mut()
            .push_frame(response(frame::gid::CORE, frame::oid::CORE_INIT, &[0x00]));
        engine.tick(&mut consumer, &mut sink);
        assert_eq!(
            consumer.completions,
            vec![(Completion::ok(OpId::Reset), None)]
        );
    }

    #[test]
    fn rejected_reset_fails_the_operation() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.cmd_reset();
        engine
            .link_mut()
            .push_frame(response(frame::gid::CORE, frame::oid::CORE_RESET, &[0x03]));
        engine.tick(&mut consumer, &mut sink);
        assert_eq!(
            consumer.completions,
            vec![(Completion::failed(OpId::Reset), None)]
        );
    }

    #[test]
    fn activation_delivers_parsed_tag() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.state = EngineState::Discovering;
        engine
            .link_mut()
            .push_frame(notification(frame::gid::RF, frame::oid::RF_INTF_ACTIVATED, T2T_NTF));
        engine.tick(&mut consumer, &mut sink);

        let (completion, tag) = &consumer.completions[0];
        assert_eq!(*completion, Completion::ok(OpId::DiscoverActivated));
        assert_eq!(tag.as_ref().unwrap().nfcid(), &[0x04, 0x12, 0x34, 0x56]);
        assert!(engine.active_tag().is_some());
    }

    #[test]
    fn unsupported_tag_activates_with_no_tag() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.state = EngineState::Discovering;
        let mut ntf = T2T_NTF.to_vec();
        ntf[2] = 0x04; // ISO-DEP
        engine
            .link_mut()
            .push_frame(notification(frame::gid::RF, frame::oid::RF_INTF_ACTIVATED, &ntf));
        engine.tick(&mut consumer, &mut sink);
        assert_eq!(
            consumer.completions,
            vec![(Completion::ok(OpId::DiscoverActivated), None)]
        );
        assert!(engine.active_tag().is_none());
    }

    #[test]
    fn deactivate_rearms_discovery_and_clears_tag() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.state = EngineState::TagActive;
        engine.active_tag = TagIntf::from_activation(T2T_NTF);

        assert_eq!(engine.cmd_deactivate(), Status::Ok);
        engine
            .link_mut()
            .push_frame(response(frame::gid::RF, frame::oid::RF_DEACTIVATE, &[0x00]));
        engine.tick(&mut consumer, &mut sink);

        assert_eq!(
            consumer.completions,
            vec![(Completion::ok(OpId::Deactivate), None)]
        );
        assert!(engine.active_tag().is_none());
        assert_eq!(engine.state, EngineState::Discovering);
    }

    #[test]
    fn send_failure_rejects_synchronously() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.link_mut().fail_next_writes(1);
        assert_eq!(engine.cmd_reset(), Status::Failed);
        // No completion follows a synchronous rejection.
        engine.tick(&mut consumer, &mut sink);
        assert!(consumer.completions.is_empty());
        assert_eq!(engine.state, EngineState::Idle);
    }

    #[test]
    fn mismatched_response_fails_outstanding_command() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.cmd_reset();
        engine
            .link_mut()
            .push_frame(response(frame::gid::RF, frame::oid::RF_DISCOVER, &[0x00]));
        engine.tick(&mut consumer, &mut sink);
        assert_eq!(
            consumer.completions,
            vec![(Completion::failed(OpId::Reset), None)]
        );
    }

    #[test]
    fn deactivate_ntf_is_informational() {
        let (mut engine, mut consumer, mut sink) = harness();
        engine.state = EngineState::Discovering;
        engine.link_mut().push_frame(notification(
            frame::gid::RF,
            frame::oid::RF_DEACTIVATE,
            &[frame::deactivate_type::DISCOVERY, 0x00],
        ));
        engine.tick(&mut consumer, &mut sink);
        assert!(consumer.completions.is_empty());
        assert_eq!(engine.state, EngineState::Discovering);
    }
}
