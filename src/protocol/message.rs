use super::display;
use super::led::LedStatus;
use super::{Frame, MIN_FRAME_LEN};

/// A classified frame. The kind is derived solely from bytes 2..4.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Echo of a keypad press on the bus; carries no state.
    KeyPressRelease,
    /// The controller's poll for remote keypads.
    ClientQuery,
    UpdateLed(LedStatus),
    UpdateDisplay(String),
    /// Frame too short to classify or to carry its payload. Dropped, not an
    /// error; parsing resumes at the next start marker.
    Incomplete,
    Unknown,
}

impl Message {
    pub fn decode(frame: &Frame) -> Message {
        let bytes = frame.as_slice();
        if bytes.len() < MIN_FRAME_LEN {
            return Message::Incomplete;
        }

        match (bytes[2], bytes[3]) {
            (0x00, 0x03) => Message::KeyPressRelease,
            (0x01, 0x01) => Message::ClientQuery,
            (0x01, 0x02) => match LedStatus::decode(bytes) {
                Some(led) => Message::UpdateLed(led),
                None => Message::Incomplete,
            },
            (0x01, 0x03) => match display::decode_text(bytes) {
                Some(text) => Message::UpdateDisplay(text),
                None => Message::Incomplete,
            },
            _ => Message::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn decode(bytes: &[u8]) -> Message {
        Message::decode(&Frame::from_bytes(bytes.to_vec()))
    }

    #[test]
    fn test_classification_ignores_payload() {
        // key press/release regardless of what follows the type bytes
        assert_eq!(
            decode(&hex!("10020003dead beef 00001003")),
            Message::KeyPressRelease
        );
        assert_eq!(decode(&hex!("10020101 00141003")), Message::ClientQuery);
    }

    #[test]
    fn test_short_frame_is_incomplete() {
        assert_eq!(decode(&hex!("100200031003")), Message::Incomplete);
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(decode(&hex!("100204c9 00001003")), Message::Unknown);
    }

    #[test]
    fn test_update_led() {
        let msg = decode(&hex!("10020102 09000000 00001003"));
        match msg {
            Message::UpdateLed(led) => {
                assert!(led.heater1);
                assert!(led.pool);
                assert!(!led.spa);
            }
            other => panic!("expected UpdateLed, got {:?}", other),
        }
    }

    #[test]
    fn test_update_led_missing_status_bytes() {
        assert_eq!(decode(&hex!("10020102 00001003")), Message::Incomplete);
    }

    #[test]
    fn test_update_display() {
        let mut frame = hex!("10020103").to_vec();
        frame.extend_from_slice(b"Salt Level  3200PPM");
        frame.extend_from_slice(&hex!("00001003"));
        assert_eq!(
            decode(&frame),
            Message::UpdateDisplay("Salt Level  3200PPM".into())
        );
    }
}
