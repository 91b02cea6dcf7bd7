/** Decodes and classifies the controller's on-screen display text */
use std::time::Duration;

/// Scrolling banners stay visible this long unless re-broadcast.
pub const DEFAULT_TTL: Duration = Duration::from_secs(40);

/// Date/time banners refresh every few seconds; a shorter TTL keeps a stale
/// clock from lingering next to the fresh one.
pub const DATETIME_TTL: Duration = Duration::from_secs(25);

// The display encodes the degree sign as 0xDF; 0xB0 is its Latin-1 slot.
const DEGREE_PLACEHOLDER: u8 = 0xDF;
const DEGREE_SIGN: u8 = 0xB0;

/// Extracts the text payload of an UpdateDisplay frame: strip the 4 header
/// and 4 trailer bytes, drop nulls, map the degree placeholder, and decode
/// the rest as Latin-1. Returns None for frames too short to carry text.
pub fn decode_text(frame: &[u8]) -> Option<String> {
    if frame.len() < 9 {
        return None;
    }
    let payload = &frame[4..frame.len() - 4];
    let text: String = payload
        .iter()
        .filter(|&&b| b != 0x00)
        .map(|&b| if b == DEGREE_PLACEHOLDER { DEGREE_SIGN } else { b })
        .map(char::from)
        .collect();
    Some(text.trim().to_owned())
}

/// A classified display reading, ready to fold into the status cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayUpdate {
    AirTemp { value: i32, unit: char },
    PoolTemp { value: i32, unit: char },
    SaltLevel(String),
    Chlorinator(String),
    Banner { text: String, ttl: Duration },
}

impl DisplayUpdate {
    pub fn classify(text: &str) -> DisplayUpdate {
        if let Some(rest) = text.strip_prefix("Air Temp") {
            if let Some((value, unit)) = parse_temperature(rest) {
                return DisplayUpdate::AirTemp { value, unit };
            }
        }
        if let Some(rest) = text.strip_prefix("Pool Temp") {
            if let Some((value, unit)) = parse_temperature(rest) {
                return DisplayUpdate::PoolTemp { value, unit };
            }
        }
        if let Some(rest) = text.strip_prefix("Salt Level") {
            return DisplayUpdate::SaltLevel(rest.trim().to_owned());
        }
        if let Some(rest) = text.strip_prefix("Pool Chlorinator") {
            return DisplayUpdate::Chlorinator(rest.trim().to_owned());
        }
        if let Some(banner) = normalize_datetime(text) {
            return DisplayUpdate::Banner {
                text: banner,
                ttl: DATETIME_TTL,
            };
        }
        DisplayUpdate::Banner {
            text: text.to_owned(),
            ttl: DEFAULT_TTL,
        }
    }
}

/// Parses `072°F` (or `072° F`): the last character is the unit, the degree
/// separator before it is dropped, and the leading digits are the value.
fn parse_temperature(rest: &str) -> Option<(i32, char)> {
    let mut chars: Vec<char> = rest.trim().chars().collect();
    let unit = chars.pop()?;
    if unit.is_ascii_digit() {
        return None;
    }
    while matches!(chars.last(), Some(c) if !c.is_ascii_digit()) {
        chars.pop();
    }
    let value = chars.into_iter().collect::<String>().parse().ok()?;
    Some((value, unit))
}

/// The clock banner blinks its colon on and off between broadcasts.
/// Reinserting it 3 characters from the end makes both blink states hash to
/// one message entry instead of two.
fn normalize_datetime(text: &str) -> Option<String> {
    if !is_weekday_banner(text) {
        return None;
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 4 {
        return None;
    }
    let mut out: String = chars[..chars.len() - 4].iter().collect();
    out.push(':');
    out.extend(&chars[chars.len() - 3..]);
    Some(out)
}

// ^[A-Za-z]{3,6}day, e.g. "Sunday" or "Saturday"
fn is_weekday_banner(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    (3..=6).any(|n| {
        chars.len() >= n + 3
            && chars[..n].iter().all(|c| c.is_ascii_alphabetic())
            && chars[n..n + 3] == ['d', 'a', 'y']
    })
}
