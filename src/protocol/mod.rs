use bytes::Bytes;

pub mod display;
pub mod framer;
pub mod led;
pub mod message;

pub use framer::FrameAssembler;
pub use message::Message;

pub const DLE: u8 = 0x10;
pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;

// 2 start marker + 2 type + 2 checksum + 2 end marker bytes
pub const MIN_FRAME_LEN: usize = 8;

/// One delimited protocol message, `DLE STX .. DLE ETX` inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The two checksum bytes preceding the trailing `DLE ETX`.
    ///
    /// The controller's checksum algorithm is undocumented, so these are
    /// carried for diagnostics but never verified.
    pub fn checksum(&self) -> Option<[u8; 2]> {
        let n = self.0.len();
        if n < MIN_FRAME_LEN {
            return None;
        }
        Some([self.0[n - 4], self.0[n - 3]])
    }
}
