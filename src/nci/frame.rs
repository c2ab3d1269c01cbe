//! NCI control-packet framing.
//!
//! Encode/parse for the 3-byte-header control packets of the NFC Forum
//! NCI specification (1.x):
//!
//! ```text
//! byte 0: MT(7:5) | PBF(4) | GID(3:0)
//! byte 1: OID(5:0)
//! byte 2: payload length (0..=255)
//! byte 3..: payload
//! ```
//!
//! Segmented messages (PBF = 1) are rejected; every exchange this
//! firmware performs fits in a single packet.

use heapless::Vec;

use crate::error::{FrameError, Result};

/// Control-packet header length.
pub const HEADER_LEN: usize = 3;
/// Maximum payload of a single control packet.
pub const MAX_PAYLOAD: usize = 255;
/// Largest raw packet the link ever produces or consumes.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD;

/// A raw packet as read from / written to the controller link.
pub type RawFrame = Vec<u8, MAX_FRAME_LEN>;

// ---------------------------------------------------------------------------
// Constants (groups, opcodes, statuses)
// ---------------------------------------------------------------------------

/// Group identifiers.
pub mod gid {
    pub const CORE: u8 = 0x0;
    pub const RF: u8 = 0x1;
}

/// Opcode identifiers within a group.
pub mod oid {
    // CORE group
    pub const CORE_RESET: u8 = 0x00;
    pub const CORE_INIT: u8 = 0x01;
    // RF group
    pub const RF_DISCOVER: u8 = 0x03;
    pub const RF_INTF_ACTIVATED: u8 = 0x05;
    pub const RF_DEACTIVATE: u8 = 0x06;
}

/// NCI status codes carried in response payloads.
pub mod status {
    pub const OK: u8 = 0x00;
    pub const REJECTED: u8 = 0x01;
    pub const FAILED: u8 = 0x03;
}

/// RF technology-and-mode values (poll side only).
pub mod rf_tech {
    pub const NFC_A_PASSIVE_POLL: u8 = 0x00;
    pub const NFC_F_PASSIVE_POLL: u8 = 0x02;
}

/// RF protocol values reported in `RF_INTF_ACTIVATED_NTF`.
pub mod rf_protocol {
    pub const T1T: u8 = 0x01;
    pub const T2T: u8 = 0x02;
    pub const T3T: u8 = 0x03;
    pub const ISO_DEP: u8 = 0x04;
}

/// Deactivation types for `RF_DEACTIVATE_CMD`.
pub mod deactivate_type {
    pub const IDLE: u8 = 0x00;
    /// Return to the discovery phase without reconfiguring it.
    pub const DISCOVERY: u8 = 0x03;
}

/// `CORE_RESET_CMD` payload: reset configuration too.
pub const RESET_TYPE_RESET_CONFIG: u8 = 0x01;

// ---------------------------------------------------------------------------
// Message type
// ---------------------------------------------------------------------------

/// The MT field of a packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    Data = 0b000,
    Command = 0b001,
    Response = 0b010,
    Notification = 0b011,
}

impl MsgType {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Self::Data),
            0b001 => Some(Self::Command),
            0b010 => Some(Self::Response),
            0b011 => Some(Self::Notification),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ControlFrame
// ---------------------------------------------------------------------------

/// A decoded NCI control packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    pub mt: MsgType,
    pub gid: u8,
    pub oid: u8,
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

impl ControlFrame {
    /// Build a command packet.
    pub fn command(gid: u8, oid: u8, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLong(payload.len()).into());
        }
        let mut p = Vec::new();
        // capacity checked above
        let _ = p.extend_from_slice(payload);
        Ok(Self {
            mt: MsgType::Command,
            gid: gid & 0x0F,
            oid: oid & 0x3F,
            payload: p,
        })
    }

    /// Serialise to wire bytes.
    pub fn encode(&self) -> RawFrame {
        let mut out = RawFrame::new();
        let _ = out.push(((self.mt as u8) << 5) | (self.gid & 0x0F));
        let _ = out.push(self.oid & 0x3F);
        let _ = out.push(self.payload.len() as u8);
        let _ = out.extend_from_slice(&self.payload);
        out
    }

    /// Parse wire bytes into a frame.
    ///
    /// Rejects truncated packets, length mismatches, segmented packets
    /// (PBF set), and reserved message types. Data packets parse fine;
    /// the engine above discards them.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < HEADER_LEN {
            return Err(FrameError::TooShort(raw.len()).into());
        }
        if raw[0] & 0x10 != 0 {
            return Err(FrameError::Segmented.into());
        }
        let mt_bits = raw[0] >> 5;
        let mt = MsgType::from_bits(mt_bits).ok_or(FrameError::InvalidType(mt_bits))?;
        let declared = raw[2] as usize;
        let actual = raw.len() - HEADER_LEN;
        if declared != actual {
            return Err(FrameError::LengthMismatch { declared, actual }.into());
        }
        let mut payload = Vec::new();
        let _ = payload.extend_from_slice(&raw[HEADER_LEN..]);
        Ok(Self {
            mt,
            gid: raw[0] & 0x0F,
            oid: raw[1] & 0x3F,
            payload,
        })
    }
}

// ---------------------------------------------------------------------------
// Test helpers for building wire frames
// ---------------------------------------------------------------------------

/// Build a raw response packet (used by the mock link and tests).
pub fn response(gid: u8, oid: u8, payload: &[u8]) -> RawFrame {
    raw_packet(MsgType::Response, gid, oid, payload)
}

/// Build a raw notification packet (used by the mock link and tests).
pub fn notification(gid: u8, oid: u8, payload: &[u8]) -> RawFrame {
    raw_packet(MsgType::Notification, gid, oid, payload)
}

fn raw_packet(mt: MsgType, gid: u8, oid: u8, payload: &[u8]) -> RawFrame {
    debug_assert!(payload.len() <= MAX_PAYLOAD);
    let mut out = RawFrame::new();
    let _ = out.push(((mt as u8) << 5) | (gid & 0x0F));
    let _ = out.push(oid & 0x3F);
    let _ = out.push(payload.len() as u8);
    let _ = out.extend_from_slice(payload);
    out
}
