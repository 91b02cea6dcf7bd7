use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::protocol::led::LedStatus;

/// A temperature reading scraped from the display.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TempReading {
    pub value: i32,
    pub unit: char,
    pub last_updated: DateTime<Local>,
}

impl TempReading {
    pub fn now(value: i32, unit: char) -> Self {
        Self {
            value,
            unit,
            last_updated: Local::now(),
        }
    }
}

/// A free-form reading stored verbatim, e.g. `3200PPM` or `45%`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextReading {
    pub value: String,
    pub last_updated: DateTime<Local>,
}

impl TextReading {
    pub fn now(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            last_updated: Local::now(),
        }
    }
}

/// Point-in-time copy of everything the bridge has learned from the bus.
///
/// Fields are independently optional: the controller only broadcasts each
/// reading when its display cycles past it, so a fresh bridge fills in over
/// a minute or two.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StatusSnapshot {
    pub led: Option<LedStatus>,
    pub air_temp: Option<TempReading>,
    pub pool_temp: Option<TempReading>,
    pub salt_level: Option<TextReading>,
    pub pool_chlorinator: Option<TextReading>,
    pub messages: Vec<String>,
}

/// The live aggregate behind the bridge's status lock. Only the reader
/// thread mutates it; callers get a [`StatusSnapshot`] copy.
#[derive(Debug, Default)]
pub(crate) struct StatusState {
    pub(crate) led: Option<LedStatus>,
    pub(crate) air_temp: Option<TempReading>,
    pub(crate) pool_temp: Option<TempReading>,
    pub(crate) salt_level: Option<TextReading>,
    pub(crate) pool_chlorinator: Option<TextReading>,
    pub(crate) board: MessageBoard,
}

impl StatusState {
    pub(crate) fn snapshot(&mut self) -> StatusSnapshot {
        StatusSnapshot {
            led: self.led,
            air_temp: self.air_temp,
            pool_temp: self.pool_temp,
            salt_level: self.salt_level.clone(),
            pool_chlorinator: self.pool_chlorinator.clone(),
            messages: self.board.messages(),
        }
    }
}

#[derive(Debug)]
struct BoardEntry {
    text: String,
    expires_at: Instant,
}

/// Ordered set of scrolling banner messages with per-entry expiry.
///
/// Re-posting an existing text extends its expiry instead of duplicating
/// it. Every post sweeps ALL expired entries, not just the oldest: TTLs are
/// not monotone with insertion order (a 25 s clock banner can expire before
/// an older 40 s message).
#[derive(Debug, Default)]
pub struct MessageBoard {
    entries: Vec<BoardEntry>,
}

impl MessageBoard {
    pub fn post(&mut self, text: &str, ttl: Duration) {
        self.post_at(text, ttl, Instant::now());
    }

    /// Sweeps, then returns the surviving texts in posting order.
    pub fn messages(&mut self) -> Vec<String> {
        self.messages_at(Instant::now())
    }

    fn post_at(&mut self, text: &str, ttl: Duration, now: Instant) {
        match self.entries.iter_mut().find(|e| e.text == text) {
            Some(entry) => entry.expires_at = now + ttl,
            None => self.entries.push(BoardEntry {
                text: text.to_owned(),
                expires_at: now + ttl,
            }),
        }
        self.sweep(now);
    }

    fn messages_at(&mut self, now: Instant) -> Vec<String> {
        self.sweep(now);
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    fn sweep(&mut self, now: Instant) {
        self.entries.retain(|e| e.expires_at > now);
    }
}
