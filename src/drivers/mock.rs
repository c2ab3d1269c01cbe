//! In-memory controller link for host-side tests.

use std::collections::VecDeque;

use crate::drivers::ControllerLink;
use crate::error::{LinkError, Result};
use crate::nci::frame::RawFrame;

/// Scripted link double. Records every frame written to it and replays
/// pre-queued frames through `poll`, one per call, in FIFO order.
#[derive(Default)]
pub struct MockLink {
    sent: Vec<Vec<u8>>,
    responses: VecDeque<RawFrame>,
    resets: usize,
    /// When nonzero, the next `fail_writes` calls to `write` fail.
    fail_writes: usize,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one frame for a later `poll` to return.
    pub fn push_frame(&mut self, frame: RawFrame) {
        self.responses.push_back(frame);
    }

    /// Make the next `n` writes fail with a bus error.
    pub fn fail_next_writes(&mut self, n: usize) {
        self.fail_writes = n;
    }

    /// Every frame written so far, oldest first.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Number of hardware resets requested.
    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn pending(&self) -> usize {
        self.responses.len()
    }
}

impl ControllerLink for MockLink {
    fn hardware_reset(&mut self) -> Result<()> {
        self.resets += 1;
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<()> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(LinkError::BusWriteFailed(-1).into());
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn poll(&mut self, _timeout_ms: u32) -> Result<Option<RawFrame>> {
        Ok(self.responses.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bytes: &[u8]) -> RawFrame {
        let mut f = RawFrame::new();
        f.extend_from_slice(bytes).unwrap();
        f
    }

    #[test]
    fn replays_frames_in_order() {
        let mut link = MockLink::new();
        link.push_frame(frame(&[0x40, 0x00, 0x00]));
        link.push_frame(frame(&[0x40, 0x01, 0x00]));
        assert_eq!(link.poll(5).unwrap().unwrap()[1], 0x00);
        assert_eq!(link.poll(5).unwrap().unwrap()[1], 0x01);
        assert!(link.poll(5).unwrap().is_none());
    }

    #[test]
    fn records_writes_and_resets() {
        let mut link = MockLink::new();
        link.hardware_reset().unwrap();
        link.write(&[0x20, 0x00, 0x00]).unwrap();
        assert_eq!(link.resets(), 1);
        assert_eq!(link.sent(), &[vec![0x20, 0x00, 0x00]]);
    }

    #[test]
    fn write_failure_injection() {
        let mut link = MockLink::new();
        link.fail_next_writes(1);
        assert!(link.write(&[0x20, 0x00, 0x00]).is_err());
        assert!(link.write(&[0x20, 0x00, 0x00]).is_ok());
        assert_eq!(link.sent().len(), 1);
    }
}
