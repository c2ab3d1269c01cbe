//! Tag detection state machine.
//!
//! Cycles the tag stack through reset, discovery, wait-for-tag, report,
//! deactivate, and back to waiting. Commands are issued from `tick()`;
//! their outcomes come back through the [`TagsConsumer`] callback. Any
//! failed or unexpected completion drops the machine into the absorbing
//! `Error` state, where it stays until a reboot.
//!
//! The split between command states (`Resetting`, `Discovering`,
//! `Deactivating`) and await states keeps each tick cheap: a command state
//! issues exactly one command and advances, an await state does nothing
//! until its completion arrives.

use log::{debug, error, info};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, TagsConsumer, TagsPort};
use crate::tags::types::{Completion, OpId, Status, TagIntf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectState {
    /// Issue a reset command on the next tick.
    Resetting,
    AwaitingResetResult,
    /// Issue a discover command on the next tick.
    Discovering,
    AwaitingDiscoverResult,
    /// Polling is active; a tag activation may arrive at any time.
    WaitingForTag,
    /// Issue a deactivate command on the next tick.
    Deactivating,
    AwaitingDeactivateResult,
    /// Absorbing failure state.
    Error,
    /// Shut down by request. Absorbing.
    Terminated,
}

impl DetectState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Resetting => "resetting",
            Self::AwaitingResetResult => "awaiting_reset",
            Self::Discovering => "discovering",
            Self::AwaitingDiscoverResult => "awaiting_discover",
            Self::WaitingForTag => "waiting_for_tag",
            Self::Deactivating => "deactivating",
            Self::AwaitingDeactivateResult => "awaiting_deactivate",
            Self::Error => "error",
            Self::Terminated => "terminated",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Terminated)
    }

    /// The operation whose completion this state accepts.
    fn expected_op(self) -> Option<OpId> {
        match self {
            Self::AwaitingResetResult => Some(OpId::Reset),
            Self::AwaitingDiscoverResult => Some(OpId::Discover),
            Self::WaitingForTag => Some(OpId::DiscoverActivated),
            Self::AwaitingDeactivateResult => Some(OpId::Deactivate),
            _ => None,
        }
    }
}

pub struct TagDetector {
    state: DetectState,
}

impl Default for TagDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TagDetector {
    pub fn new() -> Self {
        Self {
            state: DetectState::Resetting,
        }
    }

    /// Announce the detection loop. Called once before the first tick.
    pub fn init(&mut self, sink: &mut dyn EventSink) {
        sink.emit(&AppEvent::Started);
    }

    pub fn state(&self) -> DetectState {
        self.state
    }

    /// Request shutdown. The machine stops issuing commands and ignores
    /// all further completions.
    pub fn stop(&mut self, sink: &mut dyn EventSink) {
        if !self.state.is_terminal() {
            self.set_state(DetectState::Terminated, sink);
        }
    }

    /// Advance the machine one step: issue the pending command if the
    /// current state has one, otherwise wait for a completion.
    pub fn tick(&mut self, tags: &mut dyn TagsPort, sink: &mut dyn EventSink) {
        debug!("detector: state={}", self.state.name());
        match self.state {
            DetectState::Resetting => {
                self.issue(tags.cmd_reset(), OpId::Reset, DetectState::AwaitingResetResult, sink);
            }
            DetectState::Discovering => {
                self.issue(
                    tags.cmd_discover(),
                    OpId::Discover,
                    DetectState::AwaitingDiscoverResult,
                    sink,
                );
            }
            DetectState::Deactivating => {
                self.issue(
                    tags.cmd_deactivate(),
                    OpId::Deactivate,
                    DetectState::AwaitingDeactivateResult,
                    sink,
                );
            }
            // Await states and terminal states idle until a completion
            // (or forever).
            _ => {}
        }
    }

    fn issue(&mut self, accepted: Status, op: OpId, next: DetectState, sink: &mut dyn EventSink) {
        match accepted {
            Status::Ok => self.set_state(next, sink),
            Status::Failed => self.fail(op, Status::Failed, sink),
        }
    }

    fn set_state(&mut self, next: DetectState, sink: &mut dyn EventSink) {
        if next == self.state {
            return;
        }
        let from = self.state;
        self.state = next;
        sink.emit(&AppEvent::StateChanged {
            from: from.name(),
            to: next.name(),
        });
    }

    fn fail(&mut self, op: OpId, status: Status, sink: &mut dyn EventSink) {
        error!(
            "detector: {} failed (status={status:?}) in state {}",
            op.name(),
            self.state.name()
        );
        sink.emit(&AppEvent::ProtocolError {
            op: op.name(),
            status,
            state: self.state.name(),
        });
        self.set_state(DetectState::Error, sink);
    }
}

impl TagsConsumer for TagDetector {
    fn on_completion(
        &mut self,
        completion: Completion,
        tag: Option<&TagIntf>,
        sink: &mut dyn EventSink,
    ) {
        // Terminal states ignore everything, including failures.
        if self.state.is_terminal() {
            return;
        }
        // Dump completions are informational at this layer.
        if completion.op == OpId::Dump {
            return;
        }
        if completion.status != Status::Ok || self.state.expected_op() != Some(completion.op) {
            self.fail(completion.op, completion.status, sink);
            return;
        }
        match completion.op {
            OpId::Reset => {
                info!("detector: stack and controller reset");
                self.set_state(DetectState::Discovering, sink);
            }
            OpId::Discover => {
                info!("detector: discovering tags");
                self.set_state(DetectState::WaitingForTag, sink);
            }
            OpId::DiscoverActivated => {
                match tag {
                    Some(tag) => {
                        let mut nfcid = heapless::Vec::new();
                        // Bounded by MAX_NFCID_LEN on both sides.
                        let _ = nfcid.extend_from_slice(tag.nfcid());
                        sink.emit(&AppEvent::TagDetected {
                            tag_type: tag.tag_type().code(),
                            nfcid,
                        });
                    }
                    None => sink.emit(&AppEvent::UnknownTag),
                }
                self.set_state(DetectState::Deactivating, sink);
            }
            OpId::Deactivate => {
                // The deactivate re-armed discovery, so polling resumes
                // without a fresh discover command.
                self.set_state(DetectState::WaitingForTag, sink);
            }
            OpId::Dump => unreachable!("handled above"),
        }
    }
}
