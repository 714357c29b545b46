//! Robot configuration
//!
//! Parsed from TOML once at startup, validated, then passed by reference
//! to the code that builds the robot. Every section is optional and falls
//! back to the documented defaults.
//!
//! ```toml
//! [hardware]
//! intake_front = 20
//! feeder_sensor = 1
//!
//! [speeds.intake]
//! in_speed = 0.3
//! reverse_speed = -0.7
//!
//! [[presets]]
//! name = "subwoofer"
//! angle_degrees = 55.0
//! speed = 0.6
//!
//! [[bindings]]
//! button = 4
//! action = { preset = "subwoofer" }
//! ```

use heapless::Vec;
use serde::{Deserialize, Serialize};

use notepath_core::command::{LaunchPreset, PresetError};
use notepath_core::config::{
    IntakeConfig, IntakeHardware, IntakeSpeeds, LaunchPresetConfig, MotorSafetyConfig,
};
use notepath_core::subsystem::{IntakeError, Stage};
use notepath_core::traits::DeviceId;

use crate::bindings::{BindingConfig, MAX_BUTTON};

/// Maximum number of launch presets
pub const MAX_PRESETS: usize = 8;

/// Maximum number of button bindings
pub const MAX_BINDINGS: usize = 16;

/// Errors that can occur while loading the configuration or starting up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML syntax error, unknown field or table too long
    Parse,
    /// Two motor controllers share a CAN ID
    DuplicateMotorId(DeviceId),
    /// Both sensors on the same DIO channel
    SensorChannelConflict(u8),
    /// Speeds of a stage break the sign convention
    InvalidSpeeds(Stage),
    /// Motor current limit is zero
    InvalidCurrentLimit,
    /// Telemetry period is zero
    InvalidTelemetryPeriod,
    /// Preset constants rejected
    InvalidPreset {
        /// Preset index
        index: usize,
        cause: PresetError,
    },
    /// Two presets share a name
    DuplicatePreset(usize),
    /// Button index above [`MAX_BUTTON`]
    InvalidButton(u8),
    /// Two bindings on the same button
    DuplicateButton(u8),
    /// Binding names a preset that does not exist
    UnknownPreset {
        /// Binding index
        index: usize,
    },
    /// Intake startup failed
    Startup(IntakeError),
}

impl From<IntakeError> for ConfigError {
    fn from(e: IntakeError) -> Self {
        ConfigError::Startup(e)
    }
}

/// Telemetry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct TelemetryConfig {
    /// Publish the intake snapshot every N robot loop ticks
    pub publish_every_ticks: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            publish_every_ticks: 5,
        }
    }
}

/// Complete robot configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotConfig {
    /// Device addresses
    pub hardware: IntakeHardware,
    /// Safety settings applied to every motor controller
    pub safety: MotorSafetyConfig,
    /// Intake speed constants
    pub speeds: IntakeSpeeds,
    pub telemetry: TelemetryConfig,
    /// Launch presets
    pub presets: Vec<LaunchPresetConfig, MAX_PRESETS>,
    /// Operator bindings
    pub bindings: Vec<BindingConfig, MAX_BINDINGS>,
}

impl RobotConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        info!("Loading robot configuration");

        let config: RobotConfig = toml::from_str(input).map_err(|_e| {
            warn!("TOML parse error");
            ConfigError::Parse
        })?;
        config.validate()?;

        log_config_summary(&config);
        Ok(config)
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = self.hardware.duplicate_motor_id() {
            return Err(ConfigError::DuplicateMotorId(id));
        }
        if !self.hardware.sensors_distinct() {
            return Err(ConfigError::SensorChannelConflict(
                self.hardware.index_sensor,
            ));
        }
        if let Some(stage) = self.speeds.invalid_stage() {
            return Err(ConfigError::InvalidSpeeds(stage));
        }
        if self.safety.current_limit_amps == 0 {
            return Err(ConfigError::InvalidCurrentLimit);
        }
        if self.telemetry.publish_every_ticks == 0 {
            return Err(ConfigError::InvalidTelemetryPeriod);
        }

        for (index, preset) in self.presets.iter().enumerate() {
            LaunchPreset::try_from(preset)
                .map_err(|cause| ConfigError::InvalidPreset { index, cause })?;
            if self.presets[..index].iter().any(|p| p.name == preset.name) {
                return Err(ConfigError::DuplicatePreset(index));
            }
        }

        for (index, binding) in self.bindings.iter().enumerate() {
            if binding.button > MAX_BUTTON {
                return Err(ConfigError::InvalidButton(binding.button));
            }
            if self.bindings[..index]
                .iter()
                .any(|b| b.button == binding.button)
            {
                return Err(ConfigError::DuplicateButton(binding.button));
            }
            if let Some(name) = binding.action.preset_name() {
                if self.preset(name).is_none() {
                    return Err(ConfigError::UnknownPreset { index });
                }
            }
        }

        Ok(())
    }

    /// Get the intake part of the configuration
    pub fn intake_config(&self) -> IntakeConfig {
        IntakeConfig {
            hardware: self.hardware,
            safety: self.safety,
            speeds: self.speeds,
        }
    }

    /// Find a preset by name
    pub fn preset(&self, name: &str) -> Option<&LaunchPresetConfig> {
        self.presets.iter().find(|p| p.name.as_str() == name)
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &RobotConfig) {
    info!("Configuration loaded successfully");
    debug!("  {} launch presets", config.presets.len());
    debug!("  {} bindings", config.bindings.len());
    debug!(
        "  current limit {} A, persist {}",
        config.safety.current_limit_amps, config.safety.persist
    );
}
