//! Simulated motor controller bus
//!
//! Models the parts of a smart motor controller the pipeline relies on:
//! persisted safety settings, a normalized output, and follower mode where
//! the device mirrors its leader and ignores its own commands.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::RefCell;

use notepath_core::traits::{DeviceId, DriverError, IdleMode, MotorController};

/// Longest leader chain resolved before giving up
const MAX_FOLLOW_DEPTH: usize = 8;

/// Safety settings as stored in a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorSettings {
    pub idle_mode: IdleMode,
    pub current_limit_amps: u8,
}

/// State of one simulated device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimDevice {
    /// Settings currently applied (lost on power cycle unless persisted)
    pub active: Option<MotorSettings>,
    /// Settings in non-volatile memory
    pub persisted: Option<MotorSettings>,
    /// Number of successful configure calls
    pub configure_count: u32,
    /// Own commanded output (ignored while following)
    pub setpoint: f64,
    /// Number of direct speed commands received
    pub speed_commands: u32,
    /// Leader ID while in follower mode
    pub leader: Option<DeviceId>,
    /// Error returned by the next configure calls
    pub configure_fault: Option<DriverError>,
    /// Error returned by the next follow calls
    pub follow_fault: Option<DriverError>,
}

/// Shared bus of simulated motor controllers
#[derive(Clone, Default)]
pub struct SimMotorBus {
    devices: Rc<RefCell<BTreeMap<DeviceId, SimDevice>>>,
}

impl SimMotorBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a handle on a device, creating it on first use
    pub fn open(&self, id: DeviceId) -> SimMotor {
        self.devices.borrow_mut().entry(id).or_default();
        SimMotor {
            id,
            devices: self.devices.clone(),
        }
    }

    /// Get a copy of a device's state
    pub fn device(&self, id: DeviceId) -> Option<SimDevice> {
        self.devices.borrow().get(&id).cloned()
    }

    /// Actual output of a device, following its leader chain
    ///
    /// Unknown devices and chains that loop or run too deep output 0.
    pub fn output(&self, id: DeviceId) -> f64 {
        let devices = self.devices.borrow();
        let mut current = id;
        for _ in 0..MAX_FOLLOW_DEPTH {
            let Some(device) = devices.get(&current) else {
                return 0.0;
            };
            match device.leader {
                Some(leader) => current = leader,
                None => return device.setpoint,
            }
        }
        0.0
    }

    /// Make configure calls on a device fail
    pub fn inject_configure_fault(&self, id: DeviceId, fault: DriverError) {
        self.devices.borrow_mut().entry(id).or_default().configure_fault = Some(fault);
    }

    /// Make follow calls on a device fail
    pub fn inject_follow_fault(&self, id: DeviceId, fault: DriverError) {
        self.devices.borrow_mut().entry(id).or_default().follow_fault = Some(fault);
    }

    /// Remove injected faults from a device
    pub fn clear_faults(&self, id: DeviceId) {
        if let Some(device) = self.devices.borrow_mut().get_mut(&id) {
            device.configure_fault = None;
            device.follow_fault = None;
        }
    }

    /// Simulate a power cycle of every device
    ///
    /// Non-persisted settings, outputs and follower bindings are lost.
    pub fn power_cycle(&self) {
        for device in self.devices.borrow_mut().values_mut() {
            device.active = device.persisted;
            device.setpoint = 0.0;
            device.leader = None;
        }
    }
}

/// Handle on one simulated motor controller
pub struct SimMotor {
    id: DeviceId,
    devices: Rc<RefCell<BTreeMap<DeviceId, SimDevice>>>,
}

impl SimMotor {
    fn with_device<T>(&self, f: impl FnOnce(&mut SimDevice) -> T) -> T {
        let mut devices = self.devices.borrow_mut();
        f(devices.entry(self.id).or_default())
    }
}

impl MotorController for SimMotor {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn configure(
        &mut self,
        idle_mode: IdleMode,
        current_limit_amps: u8,
        persist: bool,
    ) -> Result<(), DriverError> {
        self.with_device(|device| {
            if let Some(fault) = device.configure_fault {
                return Err(fault);
            }

            // Factory reset, then apply
            let settings = MotorSettings {
                idle_mode,
                current_limit_amps,
            };
            device.active = Some(settings);
            if persist {
                device.persisted = Some(settings);
            }
            device.configure_count += 1;
            Ok(())
        })
    }

    fn set_normalized_speed(&mut self, value: f64) {
        self.with_device(|device| {
            device.speed_commands += 1;
            device.setpoint = value;
        });
    }

    fn follow(&mut self, leader: DeviceId) -> Result<(), DriverError> {
        if leader == self.id {
            return Err(DriverError::Rejected);
        }
        self.with_device(|device| {
            if let Some(fault) = device.follow_fault {
                return Err(fault);
            }
            device.leader = Some(leader);
            Ok(())
        })
    }
}
