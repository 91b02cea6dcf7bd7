use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::{DLE, ETX, STX};

/// Keypad keys the bridge knows how to press.
///
/// Key codes and their checksums come from captured traffic; the checksum
/// algorithm itself is undocumented, so new keys need a capture too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
pub enum Key {
    Lights,
    Filter,
}

impl Key {
    fn code(self) -> [u8; 2] {
        match self {
            Key::Lights => [0, 1],
            Key::Filter => [128, 0],
        }
    }

    fn checksum(self) -> [u8; 2] {
        match self {
            Key::Lights => [0, 23],
            Key::Filter => [1, 15],
        }
    }
}

/// One outbound simulated key press, written to the bus during a client
/// query window and consumed exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCommand {
    key: Key,
}

impl KeyCommand {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// The 12-byte wire form: the key pair is sent twice, matching what a
    /// physical keypad puts on the bus.
    pub fn encode(&self) -> Bytes {
        let [k0, k1] = self.key.code();
        let [c0, c1] = self.key.checksum();
        let mut b = BytesMut::with_capacity(12);
        b.put_slice(&[DLE, STX, 0x00, 0x03]);
        b.put_slice(&[k0, k1, k0, k1]);
        b.put_slice(&[c0, c1]);
        b.put_slice(&[DLE, ETX]);
        b.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::str::FromStr;

    #[test]
    fn test_lights_encoding() {
        assert_eq!(
            KeyCommand::new(Key::Lights).encode().as_ref(),
            hex!("100200030001000100171003")
        );
    }

    #[test]
    fn test_filter_encoding() {
        assert_eq!(
            KeyCommand::new(Key::Filter).encode().as_ref(),
            hex!("1002000380008000010f1003")
        );
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_str("Lights").unwrap(), Key::Lights);
        assert_eq!(Key::from_str("Filter").unwrap(), Key::Filter);
        assert!(Key::from_str("Spa").is_err());
    }
}
