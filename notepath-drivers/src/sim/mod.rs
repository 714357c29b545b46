//! Simulated hardware
//!
//! Software stand-ins for the robot's devices, used for bench runs
//! without a robot and for host tests of the application crate. All
//! handles opened from one [`SimHardware`] share state, so a test can
//! inspect what the subsystems wrote and inject sensor readings or
//! driver faults.

pub mod launcher;
pub mod motor;

pub use launcher::{LauncherEvent, SimLauncher};
pub use motor::{MotorSettings, SimDevice, SimMotor, SimMotorBus};

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use core::cell::RefCell;

use notepath_core::traits::{
    DeviceId, DriverError, HardwareProvider, MotorController, PresenceInput, SensorError,
};

/// Simulated digital inputs
#[derive(Clone, Default)]
pub struct SimInputs {
    levels: Rc<RefCell<BTreeMap<u8, Result<bool, SensorError>>>>,
}

impl SimInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set what a channel reads (unset channels read `Ok(false)`)
    pub fn set(&self, channel: u8, value: Result<bool, SensorError>) {
        self.levels.borrow_mut().insert(channel, value);
    }

    /// Set a channel to a plain level
    pub fn set_present(&self, channel: u8, present: bool) {
        self.set(channel, Ok(present));
    }

    /// Open a handle on a channel
    pub fn input(&self, channel: u8) -> SimInput {
        SimInput {
            channel,
            levels: self.levels.clone(),
        }
    }
}

/// Handle on one simulated input channel
pub struct SimInput {
    channel: u8,
    levels: Rc<RefCell<BTreeMap<u8, Result<bool, SensorError>>>>,
}

impl PresenceInput for SimInput {
    fn read(&mut self) -> Result<bool, SensorError> {
        self.levels
            .borrow()
            .get(&self.channel)
            .copied()
            .unwrap_or(Ok(false))
    }
}

/// Simulated robot hardware
///
/// Opens motor controllers on a shared [`SimMotorBus`] and inputs on a
/// shared [`SimInputs`]. Addresses marked absent answer `NotFound`.
#[derive(Clone, Default)]
pub struct SimHardware {
    motors: SimMotorBus,
    inputs: SimInputs,
    absent_motors: Rc<RefCell<BTreeSet<DeviceId>>>,
    absent_inputs: Rc<RefCell<BTreeSet<u8>>>,
}

impl SimHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the shared motor bus
    pub fn motors(&self) -> &SimMotorBus {
        &self.motors
    }

    /// Get the shared inputs
    pub fn inputs(&self) -> &SimInputs {
        &self.inputs
    }

    /// Make a motor controller ID unanswered
    pub fn remove_motor(&self, id: DeviceId) {
        self.absent_motors.borrow_mut().insert(id);
    }

    /// Make an input channel unavailable
    pub fn remove_input(&self, channel: u8) {
        self.absent_inputs.borrow_mut().insert(channel);
    }
}

impl HardwareProvider for SimHardware {
    fn motor_controller(&mut self, id: DeviceId) -> Result<Box<dyn MotorController>, DriverError> {
        if self.absent_motors.borrow().contains(&id) {
            warn!("sim: no motor controller at {}", id);
            return Err(DriverError::NotFound);
        }
        Ok(Box::new(self.motors.open(id)))
    }

    fn presence_input(&mut self, channel: u8) -> Result<Box<dyn PresenceInput>, DriverError> {
        if self.absent_inputs.borrow().contains(&channel) {
            warn!("sim: no input on channel {}", channel);
            return Err(DriverError::NotFound);
        }
        Ok(Box::new(self.inputs.input(channel)))
    }
}
