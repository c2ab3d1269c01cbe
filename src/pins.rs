//! GPIO / peripheral pin assignments for the tagwatch main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// PN7120 NFC controller (I2C + IRQ + VEN)
// ---------------------------------------------------------------------------

/// Digital input: controller asserts HIGH when a frame is ready to read.
pub const NFC_IRQ_GPIO: i32 = 2;
/// Digital output: VEN (enable/reset) line, active HIGH. Pulsing LOW
/// performs a full hardware reset of the controller.
pub const NFC_VEN_GPIO: i32 = 4;

/// 7-bit I2C slave address of the PN7120.
pub const NFC_I2C_ADDRESS: u8 = 0x28;

// ---------------------------------------------------------------------------
// I2C bus
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 6;
pub const I2C_SCL_GPIO: i32 = 7;
/// Fast-mode I2C, the maximum the PN7120 supports.
pub const I2C_FREQ_HZ: u32 = 400_000;
/// Per-transaction bus timeout.
pub const I2C_TIMEOUT_MS: u32 = 50;

// ---------------------------------------------------------------------------
// VEN reset timing
// ---------------------------------------------------------------------------

/// How long VEN is held LOW during a hardware reset.
pub const VEN_LOW_MS: u32 = 10;
/// Boot time the controller needs after VEN returns HIGH before it
/// accepts the first NCI command.
pub const VEN_SETTLE_MS: u32 = 20;
