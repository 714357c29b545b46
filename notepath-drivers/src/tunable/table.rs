//! In-memory tunable table
//!
//! Backs the operator dashboard's editable values. Overrides of entries
//! registered as persistent can be serialized with postcard and restored
//! on the next start, after the subsystems have registered their keys.

use core::cell::RefCell;

use heapless::{LinearMap, String, Vec};
use serde::{Deserialize, Serialize};

use notepath_core::traits::{TunableRange, TunableStore};

/// Maximum number of tunable entries
pub const MAX_TUNABLES: usize = 16;

/// Maximum key length
pub const MAX_KEY_LEN: usize = 32;

/// Persisted format version
const FORMAT_VERSION: u8 = 1;

/// Errors that can occur when editing or persisting the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TunableError {
    /// Key was never registered
    UnknownKey,
    /// Key longer than [`MAX_KEY_LEN`]
    KeyTooLong,
    /// More than [`MAX_TUNABLES`] entries
    TableFull,
    /// Value is NaN or infinite
    NotFinite,
    /// Value outside the registered range
    OutOfRange,
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Persisted data written by another format version
    VersionMismatch,
}

/// One registered entry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TunableEntry {
    /// Value shown when no override is set
    pub default: f64,
    /// Operator override
    pub value: Option<f64>,
    /// Bounds enforced on overrides
    pub range: Option<TunableRange>,
    /// Override survives restarts
    pub persistent: bool,
}

#[derive(Serialize, Deserialize)]
struct PersistedEntry {
    key: String<MAX_KEY_LEN>,
    value: f64,
}

#[derive(Serialize, Deserialize)]
struct PersistedTunables {
    version: u8,
    entries: Vec<PersistedEntry, MAX_TUNABLES>,
}

/// Fixed-capacity tunable table
#[derive(Debug, Default)]
pub struct TunableTable {
    entries: RefCell<LinearMap<String<MAX_KEY_LEN>, TunableEntry, MAX_TUNABLES>>,
}

impl TunableTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an operator override
    pub fn set(&self, key: &str, value: f64) -> Result<(), TunableError> {
        if !value.is_finite() {
            return Err(TunableError::NotFinite);
        }
        let key = make_key(key)?;
        let mut entries = self.entries.borrow_mut();
        let entry = entries.get_mut(&key).ok_or(TunableError::UnknownKey)?;
        if !entry.accepts(value) {
            return Err(TunableError::OutOfRange);
        }
        entry.value = Some(value);
        Ok(())
    }

    /// Remove an operator override
    pub fn clear(&self, key: &str) -> Result<(), TunableError> {
        let key = make_key(key)?;
        let mut entries = self.entries.borrow_mut();
        let entry = entries.get_mut(&key).ok_or(TunableError::UnknownKey)?;
        entry.value = None;
        Ok(())
    }

    /// Get a registered entry
    pub fn entry(&self, key: &str) -> Option<TunableEntry> {
        let key = make_key(key).ok()?;
        self.entries.borrow().get(&key).copied()
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if no entry is registered
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Serialize the overrides of persistent entries into `buffer`
    pub fn save<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], TunableError> {
        let mut persisted = PersistedTunables {
            version: FORMAT_VERSION,
            entries: Vec::new(),
        };
        for (key, entry) in self.entries.borrow().iter() {
            if let (true, Some(value)) = (entry.persistent, entry.value) {
                persisted
                    .entries
                    .push(PersistedEntry {
                        key: key.clone(),
                        value,
                    })
                    .map_err(|_| TunableError::TableFull)?;
            }
        }

        let bytes =
            postcard::to_slice(&persisted, buffer).map_err(|_| TunableError::Serialize)?;
        debug!(
            "Saved {} tunable overrides ({} bytes)",
            persisted.entries.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Restore persisted overrides
    ///
    /// Only entries already registered as persistent are restored; others
    /// are skipped. Returns the number of restored overrides.
    pub fn restore(&self, bytes: &[u8]) -> Result<usize, TunableError> {
        let persisted: PersistedTunables =
            postcard::from_bytes(bytes).map_err(|_| TunableError::Deserialize)?;
        if persisted.version != FORMAT_VERSION {
            warn!(
                "Tunable format mismatch: found {}, expected {}",
                persisted.version, FORMAT_VERSION
            );
            return Err(TunableError::VersionMismatch);
        }

        let mut entries = self.entries.borrow_mut();
        let mut restored = 0;
        for saved in persisted.entries.iter() {
            match entries.get_mut(&saved.key) {
                Some(entry) if entry.persistent && entry.accepts(saved.value) => {
                    entry.value = Some(saved.value);
                    restored += 1;
                }
                _ => debug!("Skipping persisted tunable {}", saved.key.as_str()),
            }
        }

        info!("Restored {} tunable overrides", restored);
        Ok(restored)
    }
}

impl TunableEntry {
    fn accepts(&self, value: f64) -> bool {
        value.is_finite() && self.range.map_or(true, |r| r.contains(value))
    }
}

impl TunableStore for TunableTable {
    fn register(&self, key: &str, default: f64, range: Option<TunableRange>, persistent: bool) {
        let Ok(owned) = make_key(key) else {
            error!("Tunable key too long: {}", key);
            return;
        };

        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.get_mut(&owned) {
            entry.default = default;
            entry.range = range;
            entry.persistent = persistent;
            if let Some(value) = entry.value.filter(|v| !entry.accepts(*v)) {
                warn!("Dropping out-of-range override {} for {}", value, key);
                entry.value = None;
            }
            return;
        }

        let entry = TunableEntry {
            default,
            value: None,
            range,
            persistent,
        };
        if entries.insert(owned, entry).is_err() {
            error!("Tunable table full, {} not registered", key);
        }
    }

    fn get_or_default(&self, key: &str, default: f64) -> f64 {
        make_key(key)
            .ok()
            .and_then(|key| self.entries.borrow().get(&key).and_then(|e| e.value))
            .unwrap_or(default)
    }
}

fn make_key(key: &str) -> Result<String<MAX_KEY_LEN>, TunableError> {
    String::try_from(key).map_err(|_| TunableError::KeyTooLong)
}
