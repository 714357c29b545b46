//! Configuration type definitions
//!
//! Speed constants of the intake pipeline and launch preset definitions.
//! Speeds are fractions of maximum actuator output; negative is reverse
//! throughout.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::hardware::{IntakeHardware, MotorSafetyConfig};
use crate::subsystem::Stage;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Default intake in-speed
pub const INTAKE_IN_SPEED: f64 = 0.3;
/// Default intake reverse speed
pub const INTAKE_REVERSE_SPEED: f64 = -0.7;

/// Default index in-speed
pub const INDEX_IN_SPEED: f64 = 0.3;
/// Default index reverse speed
pub const INDEX_REVERSE_SPEED: f64 = -0.3;

/// Default feeder in-speed
pub const FEEDER_IN_SPEED: f64 = 0.3;
/// Default feeder reverse speed
pub const FEEDER_REVERSE_SPEED: f64 = -0.3;

/// Tunable key of the intake in-speed override
pub const INTAKE_IN_SPEED_KEY: &str = "Intake/Intake in speed";
/// Tunable key of the index in-speed override
pub const INDEX_IN_SPEED_KEY: &str = "Intake/Index in speed";
/// Tunable key of the feeder in-speed override
pub const FEEDER_IN_SPEED_KEY: &str = "Intake/Feeder in speed";

/// Speed constants of one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StageSpeeds {
    /// Default in-speed (overridable live)
    pub in_speed: f64,
    /// Reverse speed (never overridden)
    pub reverse_speed: f64,
}

impl StageSpeeds {
    /// Create a new pair of stage speeds
    pub const fn new(in_speed: f64, reverse_speed: f64) -> Self {
        Self {
            in_speed,
            reverse_speed,
        }
    }

    /// Check the sign convention and range
    ///
    /// In-speed must lie in `[0, 1]` and reverse speed in `[-1, 0]`.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.in_speed) && (-1.0..=0.0).contains(&self.reverse_speed)
    }
}

/// Speed constants of the whole intake pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntakeSpeeds {
    /// Intake rollers
    pub intake: StageSpeeds,
    /// Index belts
    pub index: StageSpeeds,
    /// Feeder roller
    pub feeder: StageSpeeds,
}

impl Default for IntakeSpeeds {
    fn default() -> Self {
        Self {
            intake: StageSpeeds::new(INTAKE_IN_SPEED, INTAKE_REVERSE_SPEED),
            index: StageSpeeds::new(INDEX_IN_SPEED, INDEX_REVERSE_SPEED),
            feeder: StageSpeeds::new(FEEDER_IN_SPEED, FEEDER_REVERSE_SPEED),
        }
    }
}

impl IntakeSpeeds {
    /// Get the speeds of one stage
    pub fn for_stage(&self, stage: Stage) -> &StageSpeeds {
        match stage {
            Stage::Intake => &self.intake,
            Stage::Index => &self.index,
            Stage::Feeder => &self.feeder,
        }
    }

    /// Find the first stage whose speeds break the sign convention
    pub fn invalid_stage(&self) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| !self.for_stage(*stage).is_valid())
    }
}

/// Everything the intake subsystem needs at construction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntakeConfig {
    /// Device addresses
    pub hardware: IntakeHardware,
    /// Safety settings for every motor controller
    pub safety: MotorSafetyConfig,
    /// Speed constants
    pub speeds: IntakeSpeeds,
}

/// Launch preset definition (a canned shot)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaunchPresetConfig {
    /// Preset name (e.g., "subwoofer", "podium")
    pub name: String<MAX_LABEL_LEN>,
    /// Launcher pivot angle in degrees
    pub angle_degrees: f64,
    /// Launcher wheel speed, normalized
    pub speed: f64,
}
