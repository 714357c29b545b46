//! Hardware configuration types
//!
//! These types define the bus addresses of the intake pipeline devices and
//! the safety settings applied to every motor controller.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::{DeviceId, IdleMode};

/// Default current limit for every pipeline motor, in amps
pub const DEFAULT_CURRENT_LIMIT_AMPS: u8 = 20;

/// Number of motor controllers in the intake pipeline
pub const INTAKE_MOTOR_COUNT: usize = 7;

/// Safety settings applied to every motor controller at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotorSafetyConfig {
    /// Idle behavior (brake holds the note against gravity and friction)
    pub idle_mode: IdleMode,
    /// Current ceiling, independent of the commanded speed
    pub current_limit_amps: u8,
    /// Write the settings to the controller's non-volatile memory
    pub persist: bool,
}

impl Default for MotorSafetyConfig {
    fn default() -> Self {
        Self {
            idle_mode: IdleMode::Brake,
            current_limit_amps: DEFAULT_CURRENT_LIMIT_AMPS,
            persist: true,
        }
    }
}

/// Device addresses of the intake pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntakeHardware {
    /// Front intake roller (primary of the intake group)
    pub intake_front: DeviceId,
    /// Back intake roller (follows front)
    pub intake_back: DeviceId,
    /// Left intake roller (follows front)
    pub intake_left: DeviceId,
    /// Right intake roller (follows front)
    pub intake_right: DeviceId,
    /// Upper index belt (primary of the index group)
    pub index_upper: DeviceId,
    /// Lower index belt (follows upper)
    pub index_lower: DeviceId,
    /// Feeder roller
    pub feeder: DeviceId,
    /// DIO channel of the index beam break
    pub index_sensor: u8,
    /// DIO channel of the feeder beam break
    pub feeder_sensor: u8,
}

impl Default for IntakeHardware {
    fn default() -> Self {
        Self {
            intake_front: 20,
            intake_back: 21,
            intake_left: 22,
            intake_right: 23,
            index_upper: 30,
            index_lower: 31,
            feeder: 40,
            index_sensor: 0,
            feeder_sensor: 1,
        }
    }
}

impl IntakeHardware {
    /// All motor controller IDs, primaries before their followers
    pub fn motor_ids(&self) -> [DeviceId; INTAKE_MOTOR_COUNT] {
        [
            self.intake_front,
            self.intake_back,
            self.intake_left,
            self.intake_right,
            self.index_upper,
            self.index_lower,
            self.feeder,
        ]
    }

    /// Find the first motor ID used twice, if any
    pub fn duplicate_motor_id(&self) -> Option<DeviceId> {
        let ids = self.motor_ids();
        ids.iter()
            .enumerate()
            .find(|(i, id)| ids[..*i].contains(id))
            .map(|(_, id)| *id)
    }

    /// Check that the two sensors use distinct channels
    pub fn sensors_distinct(&self) -> bool {
        self.index_sensor != self.feeder_sensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_safety() {
        let safety = MotorSafetyConfig::default();
        assert_eq!(safety.idle_mode, IdleMode::Brake);
        assert_eq!(safety.current_limit_amps, 20);
        assert!(safety.persist);
    }

    #[test]
    fn test_default_hardware_is_consistent() {
        let hw = IntakeHardware::default();
        assert_eq!(hw.duplicate_motor_id(), None);
        assert!(hw.sensors_distinct());
    }

    #[test]
    fn test_duplicate_motor_id() {
        let hw = IntakeHardware {
            feeder: 21,
            ..IntakeHardware::default()
        };
        assert_eq!(hw.duplicate_motor_id(), Some(21));
    }
}
