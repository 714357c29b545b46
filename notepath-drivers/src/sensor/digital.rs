//! Digital presence input
//!
//! Beam-break or proximity sensor wired to a GPIO/DIO pin. The pin can be
//! active-high (default, pin high = note present) or active-low.

use embedded_hal::digital::InputPin;
use notepath_core::traits::{PresenceInput, SensorError};

/// Presence input over an `embedded-hal` input pin
pub struct DigitalPresence<P> {
    pin: P,
    /// If true, note present = pin LOW
    active_low: bool,
}

impl<P: InputPin> DigitalPresence<P> {
    /// Create a new presence input
    ///
    /// # Arguments
    /// - `pin`: The input pin to read
    /// - `active_low`: If true, a note is present when the pin is LOW
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Create a new presence input with active-high sense
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a new presence input with active-low sense
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Release the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> PresenceInput for DigitalPresence<P> {
    fn read(&mut self) -> Result<bool, SensorError> {
        let high = self.pin.is_high().map_err(|_| SensorError::ReadFailed)?;
        Ok(high != self.active_low)
    }
}
