//! Presence sensors
//!
//! A presence sensor reports whether a note sits at a given pipeline
//! position. Reads go straight to the input; nothing is cached.

use alloc::boxed::Box;

use crate::traits::PresenceInput;

/// One binary presence sensor
pub struct PresenceSensor {
    name: &'static str,
    input: Box<dyn PresenceInput>,
}

impl PresenceSensor {
    /// Create a new sensor over an opened input
    pub fn new(name: &'static str, input: Box<dyn PresenceInput>) -> Self {
        Self { name, input }
    }

    /// Get the sensor name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check if a note is present
    ///
    /// A failed read counts as "not present" and never interrupts control
    /// flow; an absent note is the lower-risk interpretation.
    pub fn is_present(&mut self) -> bool {
        match self.input.read() {
            Ok(present) => present,
            Err(e) => {
                warn!("{}: read failed ({}), reporting absent", self.name, e);
                false
            }
        }
    }
}
