/** Reassembles the controller's byte stream into DLE-delimited frames */
use bytes::{BufMut, BytesMut};

use super::{Frame, DLE, ETX, STX};

/// Byte-at-a-time frame assembler.
///
/// `DLE STX` starts a frame (restarting any capture in progress, which is
/// how parsing resyncs after a corrupted frame); `DLE ETX` completes it.
/// A literal `DLE` inside payload data is not escaped by the protocol, so a
/// payload byte pair that happens to spell a marker will cut a frame short.
/// That limitation is inherent to the wire format and preserved here.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: BytesMut,
    last: u8,
    capturing: bool,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte, returning a completed frame when the end marker lands.
    /// Bytes outside a frame are discarded.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        if self.last == DLE && byte == STX {
            self.buf.clear();
            self.buf.put_u8(DLE);
            self.buf.put_u8(STX);
            self.capturing = true;
            self.last = byte;
            return None;
        }

        if self.capturing && self.last == DLE && byte == ETX {
            self.buf.put_u8(byte);
            self.capturing = false;
            self.last = byte;
            return Some(Frame::from_bytes(self.buf.split().freeze()));
        }

        if self.capturing {
            self.buf.put_u8(byte);
        }
        self.last = byte;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(assembler: &mut FrameAssembler, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| assembler.push(b)).collect()
    }

    #[test]
    fn test_emits_delimited_frame() {
        let mut assembler = FrameAssembler::new();
        let frames = feed(
            &mut assembler,
            &[0x10, 0x02, 0x01, 0x01, 0x00, 0x14, 0x10, 0x03],
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_slice(),
            &[0x10, 0x02, 0x01, 0x01, 0x00, 0x14, 0x10, 0x03]
        );
    }

    #[test]
    fn test_discards_bytes_before_start_marker() {
        let mut assembler = FrameAssembler::new();
        let frames = feed(
            &mut assembler,
            &[0xAA, 0xBB, 0x03, 0x10, 0x02, 0x00, 0x03, 0x10, 0x03],
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_slice(), &[0x10, 0x02, 0x00, 0x03, 0x10, 0x03]);
    }

    #[test]
    fn test_no_terminator_no_frame() {
        let mut assembler = FrameAssembler::new();
        let frames = feed(&mut assembler, &[0x10, 0x02, 0x01, 0x02, 0xFF, 0xFF]);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_start_marker_mid_frame_resyncs() {
        let mut assembler = FrameAssembler::new();
        let frames = feed(
            &mut assembler,
            // first frame is cut off by a fresh start marker
            &[0x10, 0x02, 0x01, 0x02, 0x10, 0x02, 0x00, 0x03, 0x10, 0x03],
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_slice(), &[0x10, 0x02, 0x00, 0x03, 0x10, 0x03]);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut assembler = FrameAssembler::new();
        let frames = feed(
            &mut assembler,
            &[
                0x10, 0x02, 0x01, 0x01, 0x10, 0x03, // first
                0x10, 0x02, 0x00, 0x03, 0x10, 0x03, // second
            ],
        );
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_slice(), &[0x10, 0x02, 0x01, 0x01, 0x10, 0x03]);
        assert_eq!(frames[1].as_slice(), &[0x10, 0x02, 0x00, 0x03, 0x10, 0x03]);
    }

    #[test]
    fn test_payload_dle_is_kept() {
        let mut assembler = FrameAssembler::new();
        // 0x10 followed by a non-marker byte is ordinary payload
        let frames = feed(
            &mut assembler,
            &[0x10, 0x02, 0x01, 0x02, 0x10, 0x55, 0x10, 0x03],
        );
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_slice(),
            &[0x10, 0x02, 0x01, 0x02, 0x10, 0x55, 0x10, 0x03]
        );
    }
}
