//! Launcher commands and launch presets
//!
//! A launch preset is a canned shot: pivot the launcher to an angle, wait
//! until it is there, then spin the wheels up and wait for speed. The
//! speed directive is never issued before the angle is confirmed.

use alloc::boxed::Box;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::sequence::Sequence;
use super::{Command, HasLauncher, Phase, Requirements, SubsystemId};
use crate::config::LaunchPresetConfig;

/// Errors that can occur when building a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresetError {
    /// Angle is NaN or infinite
    AngleNotFinite,
    /// Speed outside `[-1, 1]` or not finite
    SpeedOutOfRange,
}

/// Pivot the launcher to an angle and wait until it is there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetAngle {
    degrees: f64,
    phase: Phase,
}

impl SetAngle {
    /// Create a command pivoting to `degrees`
    pub const fn new(degrees: f64) -> Self {
        Self {
            degrees,
            phase: Phase::Idle,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R: HasLauncher + ?Sized> Command<R> for SetAngle {
    fn name(&self) -> &'static str {
        "set angle"
    }

    fn requirements(&self) -> Requirements {
        Requirements::of(SubsystemId::Launcher)
    }

    fn on_activate(&mut self, robot: &mut R) {
        robot.launcher().set_angle(self.degrees);
        self.phase = Phase::Active;
    }

    fn on_poll(&mut self, robot: &mut R) -> bool {
        if robot.launcher().is_at_angle() {
            self.phase = Phase::Finished;
            return true;
        }
        false
    }

    fn on_interrupt(&mut self, _robot: &mut R) {
        self.phase = Phase::Interrupted;
    }
}

/// Spin the launcher wheels and wait for speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetLaunchSpeed {
    speed: f64,
    phase: Phase,
}

impl SetLaunchSpeed {
    /// Create a command spinning the wheels to `speed`
    pub const fn new(speed: f64) -> Self {
        Self {
            speed,
            phase: Phase::Idle,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R: HasLauncher + ?Sized> Command<R> for SetLaunchSpeed {
    fn name(&self) -> &'static str {
        "set launch speed"
    }

    fn requirements(&self) -> Requirements {
        Requirements::of(SubsystemId::Launcher)
    }

    fn on_activate(&mut self, robot: &mut R) {
        robot.launcher().set_launch_speed(self.speed);
        self.phase = Phase::Active;
    }

    fn on_poll(&mut self, robot: &mut R) -> bool {
        if robot.launcher().is_at_speed() {
            self.phase = Phase::Finished;
            return true;
        }
        false
    }

    fn on_interrupt(&mut self, _robot: &mut R) {
        self.phase = Phase::Interrupted;
    }
}

/// Validated launcher constants for one canned shot
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LaunchPreset {
    angle_degrees: f64,
    speed: f64,
}

impl LaunchPreset {
    /// Create a preset, rejecting invalid constants
    pub fn new(angle_degrees: f64, speed: f64) -> Result<Self, PresetError> {
        if !angle_degrees.is_finite() {
            return Err(PresetError::AngleNotFinite);
        }
        // NaN fails the range check
        if !(-1.0..=1.0).contains(&speed) {
            return Err(PresetError::SpeedOutOfRange);
        }
        Ok(Self {
            angle_degrees,
            speed,
        })
    }

    /// Launcher pivot angle in degrees
    pub fn angle_degrees(&self) -> f64 {
        self.angle_degrees
    }

    /// Normalized launcher wheel speed
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Build a fresh two-step command: angle first, then speed
    pub fn command<R: HasLauncher + ?Sized + 'static>(&self) -> Sequence<R> {
        Sequence::new("launch preset")
            .then(Box::new(SetAngle::new(self.angle_degrees)))
            .then(Box::new(SetLaunchSpeed::new(self.speed)))
    }
}

impl TryFrom<&LaunchPresetConfig> for LaunchPreset {
    type Error = PresetError;

    fn try_from(config: &LaunchPresetConfig) -> Result<Self, Self::Error> {
        LaunchPreset::new(config.angle_degrees, config.speed)
    }
}
