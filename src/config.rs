//! System configuration parameters.
//!
//! All tunable timing for the tagwatch loop. There is no user-facing
//! configuration surface (pins and addresses are fixed constants in
//! `pins.rs`); this struct exists so the loop and the NCI poll bound are
//! explicit and overridable in tests rather than hard-coded.

use serde::{Deserialize, Serialize};

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop interval (milliseconds). Each iteration runs the
    /// detector tick and the tags-engine tick, then sleeps this long.
    pub control_loop_interval_ms: u32,
    /// Upper bound on how long a single NCI pump may wait on the IRQ
    /// line for a pending frame (milliseconds).
    pub nci_poll_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            control_loop_interval_ms: 20,
            nci_poll_timeout_ms: 5,
        }
    }
}
