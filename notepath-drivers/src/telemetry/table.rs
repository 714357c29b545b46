//! Key/value telemetry table
//!
//! Keeps the latest value of every read-out, the way a dashboard network
//! table does. A transport (radio link, log file) reads it out.

use heapless::{LinearMap, String};

use notepath_core::traits::TelemetrySink;

/// Maximum number of read-outs
pub const MAX_ENTRIES: usize = 16;

/// Maximum key length
const MAX_KEY_LEN: usize = 32;

/// One published value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryValue {
    Bool(bool),
    Number(f64),
}

/// Latest value of every read-out
#[derive(Debug, Default)]
pub struct TelemetryTable {
    entries: LinearMap<String<MAX_KEY_LEN>, TelemetryValue, MAX_ENTRIES>,
    /// Publishes dropped (key too long or table full)
    dropped: u32,
}

impl TelemetryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the latest value of a read-out
    pub fn get(&self, key: &str) -> Option<TelemetryValue> {
        let key: String<MAX_KEY_LEN> = String::try_from(key).ok()?;
        self.entries.get(&key).copied()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            TelemetryValue::Bool(value) => Some(value),
            TelemetryValue::Number(_) => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            TelemetryValue::Number(value) => Some(value),
            TelemetryValue::Bool(_) => None,
        }
    }

    /// Iterate over every read-out
    pub fn iter(&self) -> impl Iterator<Item = (&str, TelemetryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of publishes that did not fit
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn put(&mut self, key: &str, value: TelemetryValue) {
        let Ok(owned) = String::try_from(key) else {
            self.drop_value(key);
            return;
        };
        if self.entries.insert(owned, value).is_err() {
            self.drop_value(key);
        }
    }

    fn drop_value(&mut self, key: &str) {
        // Log the first drop only
        if self.dropped == 0 {
            warn!("Telemetry entry {} dropped", key);
        }
        self.dropped = self.dropped.saturating_add(1);
    }
}

impl TelemetrySink for TelemetryTable {
    fn put_bool(&mut self, key: &str, value: bool) {
        self.put(key, TelemetryValue::Bool(value));
    }

    fn put_number(&mut self, key: &str, value: f64) {
        self.put(key, TelemetryValue::Number(value));
    }
}
