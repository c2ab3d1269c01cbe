//! Application core: the tag detection state machine and the ports that
//! connect it to the tag stack and to event consumers.

pub mod detector;
pub mod events;
pub mod ports;

pub use detector::{DetectState, TagDetector};
