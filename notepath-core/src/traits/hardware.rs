//! Device handle factory

use alloc::boxed::Box;

use super::motor::{DeviceId, DriverError, MotorController};
use super::sensor::PresenceInput;

/// Opens device handles by bus address
///
/// Implemented once per platform (real robot, simulation, bench harness).
/// Subsystems receive it at construction and keep only the handles.
pub trait HardwareProvider {
    /// Open the motor controller at CAN ID `id`
    fn motor_controller(&mut self, id: DeviceId) -> Result<Box<dyn MotorController>, DriverError>;

    /// Open the digital input on DIO `channel`
    fn presence_input(&mut self, channel: u8) -> Result<Box<dyn PresenceInput>, DriverError>;
}
