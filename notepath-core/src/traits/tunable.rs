//! Live-tunable value store

/// Inclusive bounds of an editable value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TunableRange {
    pub min: f64,
    pub max: f64,
}

impl TunableRange {
    /// Full normalized actuator output, `[-1, 1]`
    pub const NORMALIZED: Self = Self::new(-1.0, 1.0);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check if `value` lies within the bounds (NaN never does)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Operator-editable key/value store
///
/// The core only reads from the store. Writes come from the operator's
/// dashboard, so implementations use interior mutability and values may
/// change between two reads.
pub trait TunableStore {
    /// Make a value visible and editable
    ///
    /// Called once per key at startup. Overrides outside `range` are
    /// rejected. `persistent` entries keep their override across restarts
    /// when the store supports it.
    fn register(&self, key: &str, default: f64, range: Option<TunableRange>, persistent: bool);

    /// Read the override for `key`, or `default` when none is set
    fn get_or_default(&self, key: &str, default: f64) -> f64;
}
