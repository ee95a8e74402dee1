use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::candles::TimestampMS;

/// Identity of one scanned stream: a symbol on one timeframe
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackingKey {
    pub symbol: String,
    pub timeframe_label: String,
}

impl TrackingKey {
    pub fn new(symbol: impl Into<String>, timeframe_label: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe_label: timeframe_label.into(),
        }
    }
}

impl fmt::Display for TrackingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.symbol, self.timeframe_label)
    }
}

/// Open time of the newest bar already evaluated for each key.
///
/// Entries are only ever inserted or overwritten, never removed; the key
/// space is bounded by the tracked universe. Not persisted across restarts.
#[derive(Debug, Default)]
pub struct LastSeenRegistry {
    entries: FxHashMap<TrackingKey, TimestampMS>,
}

impl LastSeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `open_time` as the latest bar for `key`.
    ///
    /// Returns `false` without touching the entry when `open_time` is the value
    /// already stored, `true` after storing a new or different value.
    pub fn observe(&mut self, key: &TrackingKey, open_time: TimestampMS) -> bool {
        match self.entries.get_mut(key) {
            Some(seen) if *seen == open_time => false,
            Some(seen) => {
                *seen = open_time;
                true
            }
            None => {
                self.entries.insert(key.clone(), open_time);
                true
            }
        }
    }

    pub fn get(&self, key: &TrackingKey) -> Option<TimestampMS> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
