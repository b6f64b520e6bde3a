//! Shared latest-value registry for decoded channels.
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::format::ChannelValue;
use crate::types::ChannelId;

/// A channel's latest reading, coerced into one of three shapes: a number, suitable for
/// arithmetic and NMEA formatting; a string, for channels like LatLon and status text; or a
/// structured rendering, for values with no single-scalar representation (paired readings,
/// durations, raw bytes). Structured values are never read by a builder, but every successfully
/// decoded channel still gets exactly one `LiveRecord` — including those — so the live-data dump
/// and the "one record per known channel" invariant hold regardless of a value's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Number(f64),
    Text(String),
    Structured(String),
}

impl StoredValue {
    fn from_channel_value(value: &ChannelValue) -> StoredValue {
        match value {
            ChannelValue::Number(n) => StoredValue::Number(*n),
            ChannelValue::SegmentedNumber { value, .. } => StoredValue::Number(*value),
            ChannelValue::Text(s) => StoredValue::Text(s.clone()),
            ChannelValue::Ascii(s) => StoredValue::Text(s.clone()),
            ChannelValue::Pair { first, second } => {
                StoredValue::Structured(format!("first={}, second={}", first, second))
            }
            ChannelValue::Duration(d) => {
                StoredValue::Structured(format!("{:02}:{:02}:{:02}", d.hours, d.minutes, d.seconds))
            }
            ChannelValue::Raw(bytes) => StoredValue::Structured(format!("{:02x?}", bytes)),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            StoredValue::Number(n) => Some(*n),
            StoredValue::Text(_) | StoredValue::Structured(_) => None,
        }
    }

    fn as_string(&self) -> String {
        match self {
            StoredValue::Number(n) => n.to_string(),
            StoredValue::Text(s) => s.clone(),
            StoredValue::Structured(s) => s.clone(),
        }
    }
}

/// One channel's latest observed reading.
#[derive(Debug, Clone)]
pub struct LiveRecord {
    pub channel_id: ChannelId,
    pub value: StoredValue,
    pub timestamp: DateTime<Utc>,
}

/// Concurrency-safe mapping from channel name to its latest reading.
///
/// Every mutation replaces one map entry under a single lock acquisition, so readers never
/// observe a half-updated record.
pub struct LiveStore {
    records: Mutex<HashMap<&'static str, LiveRecord>>,
}

impl Default for LiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveStore {
    pub fn new() -> Self {
        LiveStore { records: Mutex::new(HashMap::new()) }
    }

    /// Store the latest reading for a channel, stamped with the current time.
    pub fn put(&self, channel_name: &'static str, channel_id: ChannelId, value: &ChannelValue) {
        self.put_at(channel_name, channel_id, value, Utc::now())
    }

    /// As `put`, but with an explicit timestamp — used by tests that need determinism.
    pub fn put_at(
        &self,
        channel_name: &'static str,
        channel_id: ChannelId,
        value: &ChannelValue,
        timestamp: DateTime<Utc>,
    ) {
        let stored = StoredValue::from_channel_value(value);
        let mut records = self.records.lock().unwrap();
        records.insert(channel_name, LiveRecord { channel_id, value: stored, timestamp });
    }

    /// Fetch a channel's latest value as a number, or `None` if absent or non-numeric.
    pub fn get_number(&self, channel_name: &str) -> Option<f64> {
        let records = self.records.lock().unwrap();
        records.get(channel_name).and_then(|r| r.value.as_f64())
    }

    /// Fetch a channel's latest value rendered as text, regardless of its underlying type.
    pub fn get_string(&self, channel_name: &str) -> Option<String> {
        let records = self.records.lock().unwrap();
        records.get(channel_name).map(|r| r.value.as_string())
    }

    /// A consistent point-in-time copy of every channel's latest record, sorted by name.
    pub fn snapshot(&self) -> Vec<(&'static str, LiveRecord)> {
        let records = self.records.lock().unwrap();
        let mut entries: Vec<_> = records.iter().map(|(&name, r)| (name, r.clone())).collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::RawDuration;
    use chrono::TimeZone;

    #[test]
    fn put_then_get_number_roundtrips() {
        let store = LiveStore::new();
        store.put("Boatspeed (Knots)", 0x41, &ChannelValue::Number(9.1));
        assert_eq!(store.get_number("Boatspeed (Knots)"), Some(9.1));
    }

    #[test]
    fn text_channel_is_not_numeric() {
        let store = LiveStore::new();
        store.put("LatLon", 0x47, &ChannelValue::Text("4916.45N12311.12W".to_string()));
        assert_eq!(store.get_number("LatLon"), None);
        assert_eq!(store.get_string("LatLon"), Some("4916.45N12311.12W".to_string()));
    }

    #[test]
    fn missing_channel_is_none() {
        let store = LiveStore::new();
        assert_eq!(store.get_number("Depth (Meters)"), None);
    }

    #[test]
    fn timestamps_are_monotonic_per_channel() {
        let store = LiveStore::new();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 1).unwrap();
        store.put_at("Heading", 0x49, &ChannelValue::Number(100.0), t1);
        store.put_at("Heading", 0x49, &ChannelValue::Number(101.0), t2);
        let snapshot = store.snapshot();
        let (_, record) = snapshot.iter().find(|(n, _)| *n == "Heading").unwrap();
        assert_eq!(record.timestamp, t2);
    }

    #[test]
    fn pair_values_are_still_recorded_as_structured() {
        let store = LiveStore::new();
        store.put("Some Pair Channel", 0x00, &ChannelValue::Pair { first: 1.0, second: 2.0 });
        assert_eq!(store.get_number("Some Pair Channel"), None);
        let snapshot = store.snapshot();
        let (_, record) = snapshot.iter().find(|(n, _)| *n == "Some Pair Channel").unwrap();
        assert_eq!(record.value, StoredValue::Structured("first=1, second=2".to_string()));
    }

    #[test]
    fn duration_and_raw_values_are_recorded_too() {
        let store = LiveStore::new();
        store.put(
            "Some Duration Channel",
            0x00,
            &ChannelValue::Duration(RawDuration { hours: 30, minutes: 15, seconds: 42 }),
        );
        store.put("Some Raw Channel", 0x00, &ChannelValue::Raw(vec![0xDE, 0xAD]));
        assert_eq!(store.snapshot().len(), 2);
    }
}
