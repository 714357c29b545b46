//! Presence input trait

/// Errors that can occur when reading a digital input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The input is not wired or the channel is unavailable
    Disconnected,
    /// The read itself failed
    ReadFailed,
}

/// Trait for binary presence inputs (beam breaks, limit switches)
///
/// Implementations handle polarity; `Ok(true)` always means "a game piece
/// is present".
pub trait PresenceInput {
    /// Read the current state of the input
    ///
    /// Takes `&mut self` because pin reads typically require mutable access.
    fn read(&mut self) -> Result<bool, SensorError>;
}
