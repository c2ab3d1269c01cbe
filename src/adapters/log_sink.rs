//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (which goes to UART / USB-CDC in production). A future display
//! or network adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | detection loop running");
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {from} -> {to}");
            }
            AppEvent::TagDetected { tag_type, nfcid } => {
                info!("TAG   | tag type {tag_type} detected, id=[{}]", nfcid_hex(nfcid));
            }
            AppEvent::UnknownTag => {
                info!("TAG   | unsupported technology, skipping");
            }
            AppEvent::ProtocolError { op, status, state } => {
                warn!("ERROR | op={op} status={status:?} in state={state}");
            }
        }
    }
}

/// Render an NFCID as space-separated hex bytes, e.g. `04 12 34 56`.
pub fn nfcid_hex(id: &[u8]) -> heapless::String<32> {
    use core::fmt::Write;
    let mut out = heapless::String::new();
    for (i, b) in id.iter().enumerate() {
        if i > 0 {
            let _ = out.push(' ');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nfcid_as_spaced_hex() {
        assert_eq!(nfcid_hex(&[0x04, 0x12, 0x34, 0x56]).as_str(), "04 12 34 56");
        assert_eq!(nfcid_hex(&[0x0A]).as_str(), "0A");
        assert_eq!(nfcid_hex(&[]).as_str(), "");
    }

    #[test]
    fn ten_byte_id_fits_the_buffer() {
        let id = [0xFF; 10];
        let rendered = nfcid_hex(&id);
        assert_eq!(rendered.len(), 29);
        assert!(rendered.as_str().starts_with("FF FF"));
    }
}
