//! Controller-interface (NCI) engine.
//!
//! Sits between the tags engine and the [`ControllerLink`] transport.
//! Responsibilities:
//!
//! - encode and send NCI command packets,
//! - pump the link once per tick with a bounded poll, classifying any
//!   received packet into an [`NciEvent`] for the layer above.
//!
//! The engine keeps no request bookkeeping of its own; matching events
//! to outstanding commands is the tags engine's job. This keeps the wire
//! layer stateless and trivially testable.

pub mod frame;

use heapless::Vec;
use log::{debug, warn};

use crate::drivers::ControllerLink;
use crate::error::Result;
use frame::{ControlFrame, MsgType, gid, oid};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One classified packet from the controller.
///
/// `Malformed` is produced for packets that fail framing checks, so the
/// layer above can escalate instead of silently losing a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NciEvent {
    CoreResetRsp { status: u8 },
    CoreInitRsp { status: u8 },
    DiscoverRsp { status: u8 },
    /// `RF_INTF_ACTIVATED_NTF`: a tag completed activation. Carries the
    /// raw notification payload; the tags engine parses it.
    IntfActivated { params: Vec<u8, { frame::MAX_PAYLOAD }> },
    DeactivateRsp { status: u8 },
    DeactivateNtf { deactivate_type: u8, reason: u8 },
    /// Packet parsed but not one this firmware acts on.
    Other { mt: MsgType, gid: u8, oid: u8 },
    /// Packet failed framing checks or is missing mandatory payload.
    Malformed,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The controller-interface engine. Owns the link.
pub struct NciEngine<L: ControllerLink> {
    link: L,
    poll_timeout_ms: u32,
}

impl<L: ControllerLink> NciEngine<L> {
    pub fn new(link: L, poll_timeout_ms: u32) -> Self {
        Self {
            link,
            poll_timeout_ms,
        }
    }

    /// Direct access to the underlying link. Used by test harnesses to
    /// script a mock link after the stack is assembled.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Pulse the VEN line for a full hardware reset of the controller.
    pub fn hardware_reset(&mut self) -> Result<()> {
        self.link.hardware_reset()
    }

    /// Encode and send one command packet.
    pub fn send_command(&mut self, gid: u8, oid: u8, payload: &[u8]) -> Result<()> {
        let cmd = ControlFrame::command(gid, oid, payload)?;
        let raw = cmd.encode();
        debug!("nci: tx gid={gid:#x} oid={oid:#x} len={}", payload.len());
        self.link.write(&raw)
    }

    /// Poll the link once, with the configured bound, and classify any
    /// received packet. Yields at most one event per call; returns `None`
    /// when nothing arrived in time.
    pub fn pump(&mut self) -> Option<NciEvent> {
        let raw = match self.link.poll(self.poll_timeout_ms) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("nci: link poll failed: {e}");
                return Some(NciEvent::Malformed);
            }
        };
        match ControlFrame::parse(&raw) {
            Ok(f) => {
                debug!(
                    "nci: rx mt={:?} gid={:#x} oid={:#x} len={}",
                    f.mt,
                    f.gid,
                    f.oid,
                    f.payload.len()
                );
                Some(classify(&f))
            }
            Err(e) => {
                warn!("nci: dropping malformed packet: {e}");
                Some(NciEvent::Malformed)
            }
        }
    }
}

/// Map a parsed control packet to the event the tags engine consumes.
fn classify(f: &ControlFrame) -> NciEvent {
    match (f.mt, f.gid, f.oid) {
        (MsgType::Response, gid::CORE, oid::CORE_RESET) => match f.payload.first() {
            Some(&status) => NciEvent::CoreResetRsp { status },
            None => NciEvent::Malformed,
        },
        (MsgType::Response, gid::CORE, oid::CORE_INIT) => match f.payload.first() {
            Some(&status) => NciEvent::CoreInitRsp { status },
            None => NciEvent::Malformed,
        },
        (MsgType::Response, gid::RF, oid::RF_DISCOVER) => match f.payload.first() {
            Some(&status) => NciEvent::DiscoverRsp { status },
            None => NciEvent::Malformed,
        },
        (MsgType::Response, gid::RF, oid::RF_DEACTIVATE) => match f.payload.first() {
            Some(&status) => NciEvent::DeactivateRsp { status },
            None => NciEvent::Malformed,
        },
        (MsgType::Notification, gid::RF, oid::RF_INTF_ACTIVATED) => NciEvent::IntfActivated {
            params: f.payload.clone(),
        },
        (MsgType::Notification, gid::RF, oid::RF_DEACTIVATE) => {
            match (f.payload.first(), f.payload.get(1)) {
                (Some(&deactivate_type), Some(&reason)) => NciEvent::DeactivateNtf {
                    deactivate_type,
                    reason,
                },
                _ => NciEvent::Malformed,
            }
        }
        (mt, gid, oid) => NciEvent::Other { mt, gid, oid },
    }
}
