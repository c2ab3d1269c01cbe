//! Application events emitted by the detector.

use heapless::Vec;

use crate::tags::types::{MAX_NFCID_LEN, Status};

/// Milestones the detector reports as it runs. The production sink logs
/// them to the console; tests record them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Detection loop started (first tick after init).
    Started,
    StateChanged {
        from: &'static str,
        to: &'static str,
    },
    /// A supported tag was activated.
    TagDetected {
        tag_type: u8,
        nfcid: Vec<u8, MAX_NFCID_LEN>,
    },
    /// A tag was activated but its technology is not supported.
    UnknownTag,
    /// An operation failed or an unexpected completion arrived. `status`
    /// is the reported outcome; a mismatched completion can carry `Ok`.
    ProtocolError {
        op: &'static str,
        status: Status,
        state: &'static str,
    },
}
