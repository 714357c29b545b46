//! Motor controller trait
//!
//! A motor controller accepts a normalized velocity command in `[-1, 1]`,
//! holds a small set of safety settings, and can mirror another
//! controller's output ("follower" mode).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bus identifier of a motor controller (CAN ID)
pub type DeviceId = u8;

/// Behavior of an un-driven motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IdleMode {
    /// Short the windings - the motor resists external motion
    #[default]
    Brake,
    /// Leave the windings open - the motor spins freely
    Coast,
}

/// Errors reported by a motor controller driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The device refused the request (parameter write rejected)
    Rejected,
    /// The device did not acknowledge within the driver's deadline
    Timeout,
    /// No device answers at this ID
    NotFound,
    /// The device dropped off the bus
    Disconnected,
}

/// Base trait for all motor controllers
///
/// Every call is an immediate command to the device; implementations do
/// not queue.
pub trait MotorController {
    /// Bus identifier of this controller
    fn id(&self) -> DeviceId;

    /// Apply the safety configuration
    ///
    /// Implementations restore factory defaults first, then apply the idle
    /// mode and current limit. When `persist` is set the settings are written
    /// to the device's non-volatile memory so they survive a controller
    /// power cycle.
    fn configure(
        &mut self,
        idle_mode: IdleMode,
        current_limit_amps: u8,
        persist: bool,
    ) -> Result<(), DriverError>;

    /// Command a normalized output in `[-1, 1]`
    ///
    /// Values outside the range are passed through unmodified; clamping is
    /// the device's business.
    fn set_normalized_speed(&mut self, value: f64);

    /// Mirror the output of the controller at `leader`
    ///
    /// After this call the controller ignores its own speed commands.
    fn follow(&mut self, leader: DeviceId) -> Result<(), DriverError>;
}
