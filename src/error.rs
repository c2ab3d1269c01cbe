//! Unified error types for the tagwatch firmware.
//!
//! A single `Error` enum that every layer can convert into, keeping the
//! top-level loop's error handling uniform. All variants are `Copy` and
//! cheap to pass between the NCI engine and the controller link.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The controller link (I2C bus, IRQ/VEN lines) failed.
    Link(LinkError),
    /// An NCI control packet could not be encoded or parsed.
    Frame(FrameError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Controller link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// I2C write to the controller failed (rc = driver return code).
    BusWriteFailed(i32),
    /// I2C read from the controller failed.
    BusReadFailed(i32),
    /// GPIO configuration for IRQ/VEN failed.
    GpioConfigFailed(i32),
    /// The VEN reset sequence did not complete.
    ResetFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusWriteFailed(rc) => write!(f, "I2C write failed (rc={rc})"),
            Self::BusReadFailed(rc) => write!(f, "I2C read failed (rc={rc})"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
            Self::ResetFailed => write!(f, "VEN reset sequence failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// NCI frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than an NCI control-packet header.
    TooShort(usize),
    /// The declared payload length disagrees with the bytes received.
    LengthMismatch { declared: usize, actual: usize },
    /// Payload exceeds the single-packet maximum (255 bytes).
    PayloadTooLong(usize),
    /// Segmented control messages (PBF set) are not supported.
    Segmented,
    /// Reserved message-type bits in the packet header.
    InvalidType(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(n) => write!(f, "frame too short ({n} bytes)"),
            Self::LengthMismatch { declared, actual } => {
                write!(f, "length mismatch: declared {declared}, got {actual}")
            }
            Self::PayloadTooLong(n) => write!(f, "payload too long ({n} bytes)"),
            Self::Segmented => write!(f, "segmented control packet"),
            Self::InvalidType(bits) => write!(f, "reserved message type {bits:#05b}"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
