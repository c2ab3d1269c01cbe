//! Controller-link drivers and the transport seam.
//!
//! The [`ControllerLink`] trait abstracts bus I/O and the IRQ/VEN lines
//! away from the NCI engine, so the protocol layers compile and test on
//! the host without real hardware.

pub mod mock;
pub mod pn7120;

use crate::error::Result;
use crate::nci::frame::RawFrame;

/// Transport seam between the NCI engine and the physical controller.
///
/// Implementations: [`pn7120::Pn7120Link`] (real hardware, dual-target)
/// and [`mock::MockLink`] (scripted frames for tests).
pub trait ControllerLink {
    /// Pulse the VEN line to hard-reset the controller. Blocks for the
    /// fixed settle time (`pins::VEN_LOW_MS` + `pins::VEN_SETTLE_MS`).
    fn hardware_reset(&mut self) -> Result<()>;

    /// Write one complete NCI packet to the controller.
    fn write(&mut self, frame: &[u8]) -> Result<()>;

    /// Poll for one pending frame, waiting on the IRQ line for at most
    /// `timeout_ms`. Returns `Ok(None)` when no frame arrived in time.
    /// This is the only call in the firmware permitted to block, and
    /// only up to the given bound.
    fn poll(&mut self, timeout_ms: u32) -> Result<Option<RawFrame>>;
}
