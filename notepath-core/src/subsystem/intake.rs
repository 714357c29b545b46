//! Intake pipeline subsystem
//!
//! Three stages move a note from the floor to the launcher:
//!
//! ```text
//!  floor ──▶ intake ──▶ index ──[index sensor]──▶ feeder ──[feeder sensor]──▶ launcher
//! ```
//!
//! Each stage is backed by one actuator group:
//!
//! | Stage  | Primary      | Followers               |
//! |--------|--------------|-------------------------|
//! | intake | front roller | back, left, right       |
//! | index  | upper belt   | lower belt              |
//! | feeder | feeder       | -                       |
//!
//! "In" speeds come from the live tunable store when the operator has set
//! an override, otherwise from the configured defaults. "Reverse" speeds
//! are a manual recovery action and always use their fixed constant.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::actuator::{ActuatorError, ActuatorGroup};
use crate::config::{
    IntakeConfig, IntakeSpeeds, FEEDER_IN_SPEED_KEY, INDEX_IN_SPEED_KEY, INTAKE_IN_SPEED_KEY,
};
use crate::sensor::PresenceSensor;
use crate::traits::{
    DeviceId, DriverError, HardwareProvider, MotorController, TelemetrySink, TunableRange,
    TunableStore,
};

/// Telemetry key of the index sensor read-out
pub const INDEX_SENSOR_KEY: &str = "Intake/Index sensor";
/// Telemetry key of the feeder sensor read-out
pub const FEEDER_SENSOR_KEY: &str = "Intake/Feeder sensor";

/// One stage of the note pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stage {
    /// Floor pickup rollers
    Intake,
    /// Belts carrying the note to the feeder
    Index,
    /// Roller pushing the note into the launcher
    Feeder,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 3] = [Stage::Intake, Stage::Index, Stage::Feeder];

    /// Get the stage name
    pub const fn name(&self) -> &'static str {
        match self {
            Stage::Intake => "intake",
            Stage::Index => "index",
            Stage::Feeder => "feeder",
        }
    }

    /// Tunable key of this stage's in-speed override
    pub const fn in_speed_key(&self) -> &'static str {
        match self {
            Stage::Intake => INTAKE_IN_SPEED_KEY,
            Stage::Index => INDEX_IN_SPEED_KEY,
            Stage::Feeder => FEEDER_IN_SPEED_KEY,
        }
    }

    /// Telemetry key of this stage's resolved in-speed
    pub const fn telemetry_key(&self) -> &'static str {
        match self {
            Stage::Intake => "Intake/Intake resolved in speed",
            Stage::Index => "Intake/Index resolved in speed",
            Stage::Feeder => "Intake/Feeder resolved in speed",
        }
    }
}

/// Direction a stage is driven in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StageDirection {
    /// Toward the launcher
    In,
    /// Back toward the floor
    Reverse,
}

/// Pipeline position watched by a presence sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NotePosition {
    /// Between index and feeder
    Index,
    /// Between feeder and launcher
    Feeder,
}

/// Errors that can occur while bringing up the intake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntakeError {
    /// A device handle could not be opened
    Open {
        /// Address of the device (CAN ID or DIO channel)
        address: u8,
        /// Driver error
        cause: DriverError,
    },
    /// An actuator group failed to configure or bind
    Actuator(ActuatorError),
}

impl From<ActuatorError> for IntakeError {
    fn from(e: ActuatorError) -> Self {
        IntakeError::Actuator(e)
    }
}

/// Display-only snapshot of the intake
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntakeTelemetry {
    /// Note seen by the index sensor
    pub index_has_note: bool,
    /// Note seen by the feeder sensor
    pub feeder_has_note: bool,
    /// Resolved in-speed of each stage (intake, index, feeder)
    pub in_speeds: [f64; 3],
    /// Last commanded speed of each stage (intake, index, feeder)
    pub commanded: [f64; 3],
}

/// The intake pipeline: intake, index and feeder stages plus two sensors
pub struct IntakeSubsystem {
    intake: ActuatorGroup,
    index: ActuatorGroup,
    feeder: ActuatorGroup,
    index_sensor: PresenceSensor,
    feeder_sensor: PresenceSensor,
    speeds: IntakeSpeeds,
    tunables: Rc<dyn TunableStore>,
}

impl IntakeSubsystem {
    /// Bring up the intake
    ///
    /// Runs the full startup sequence, in order: open every device,
    /// configure every group, bind followers, register telemetry. Any
    /// failure aborts startup and no subsystem is returned, so an
    /// unconfigured mechanism can never receive a speed command.
    pub fn new(
        config: &IntakeConfig,
        hardware: &mut dyn HardwareProvider,
        tunables: Rc<dyn TunableStore>,
        telemetry: &mut dyn TelemetrySink,
    ) -> Result<Self, IntakeError> {
        let hw = &config.hardware;
        let speeds = config.speeds;

        let range = Some(TunableRange::NORMALIZED);
        tunables.register(INTAKE_IN_SPEED_KEY, speeds.intake.in_speed, range, true);
        tunables.register(INDEX_IN_SPEED_KEY, speeds.index.in_speed, range, false);
        tunables.register(FEEDER_IN_SPEED_KEY, speeds.feeder.in_speed, range, false);

        let mut intake = ActuatorGroup::new(
            "intake",
            open_motor(hardware, hw.intake_front)?,
            open_motors(hardware, &[hw.intake_back, hw.intake_left, hw.intake_right])?,
        )?;
        let mut index = ActuatorGroup::new(
            "index",
            open_motor(hardware, hw.index_upper)?,
            open_motors(hardware, &[hw.index_lower])?,
        )?;
        let mut feeder = ActuatorGroup::new("feeder", open_motor(hardware, hw.feeder)?, [])?;

        let index_sensor = PresenceSensor::new(
            "index sensor",
            hardware
                .presence_input(hw.index_sensor)
                .map_err(|cause| IntakeError::Open {
                    address: hw.index_sensor,
                    cause,
                })?,
        );
        let feeder_sensor = PresenceSensor::new(
            "feeder sensor",
            hardware
                .presence_input(hw.feeder_sensor)
                .map_err(|cause| IntakeError::Open {
                    address: hw.feeder_sensor,
                    cause,
                })?,
        );

        for group in [&mut intake, &mut index, &mut feeder] {
            group.configure(&config.safety)?;
        }
        for group in [&mut intake, &mut index, &mut feeder] {
            group.bind_followers()?;
        }

        let mut subsystem = Self {
            intake,
            index,
            feeder,
            index_sensor,
            feeder_sensor,
            speeds,
            tunables,
        };

        let index_present = subsystem.index_has_note();
        let feeder_present = subsystem.feeder_has_note();
        telemetry.put_bool(INDEX_SENSOR_KEY, index_present);
        telemetry.put_bool(FEEDER_SENSOR_KEY, feeder_present);

        info!("Intake subsystem ready");
        Ok(subsystem)
    }

    fn group_mut(&mut self, stage: Stage) -> &mut ActuatorGroup {
        match stage {
            Stage::Intake => &mut self.intake,
            Stage::Index => &mut self.index,
            Stage::Feeder => &mut self.feeder,
        }
    }

    /// Get the actuator group behind a stage
    pub fn group(&self, stage: Stage) -> &ActuatorGroup {
        match stage {
            Stage::Intake => &self.intake,
            Stage::Index => &self.index,
            Stage::Feeder => &self.feeder,
        }
    }

    /// Get the configured speed constants
    pub fn speeds(&self) -> &IntakeSpeeds {
        &self.speeds
    }

    /// Resolve a stage's in-speed: live override if set, else the default
    pub fn resolved_in_speed(&self, stage: Stage) -> f64 {
        let default = self.speeds.for_stage(stage).in_speed;
        self.tunables.get_or_default(stage.in_speed_key(), default)
    }

    /// Get a stage's reverse speed (never overridden)
    pub fn reverse_speed(&self, stage: Stage) -> f64 {
        self.speeds.for_stage(stage).reverse_speed
    }

    /// Get a stage's last commanded speed
    pub fn commanded_speed(&self, stage: Stage) -> f64 {
        self.group(stage).commanded_speed()
    }

    /// Drive a stage in or in reverse
    pub fn drive(&mut self, stage: Stage, direction: StageDirection) {
        let speed = match direction {
            StageDirection::In => self.resolved_in_speed(stage),
            StageDirection::Reverse => self.reverse_speed(stage),
        };
        trace!("{} {} at {}", stage, direction, speed);
        self.group_mut(stage).set_speed(speed);
    }

    /// Drive a stage toward the launcher
    pub fn stage_in(&mut self, stage: Stage) {
        self.drive(stage, StageDirection::In);
    }

    /// Drive a stage back toward the floor
    pub fn stage_reverse(&mut self, stage: Stage) {
        self.drive(stage, StageDirection::Reverse);
    }

    /// Stop a stage
    pub fn stage_stop(&mut self, stage: Stage) {
        self.group_mut(stage).stop();
    }

    /// Stop every stage
    pub fn stop_all(&mut self) {
        for stage in Stage::ALL {
            self.stage_stop(stage);
        }
    }

    /// Run the intake rollers in at the resolved in-speed
    pub fn intake_in(&mut self) {
        self.stage_in(Stage::Intake);
    }

    /// Run the intake rollers out
    pub fn intake_reverse(&mut self) {
        self.stage_reverse(Stage::Intake);
    }

    /// Stop the intake rollers
    pub fn intake_stop(&mut self) {
        self.stage_stop(Stage::Intake);
    }

    /// Run the index belts toward the feeder
    pub fn index_in(&mut self) {
        self.stage_in(Stage::Index);
    }

    /// Run the index belts back toward the intake
    pub fn index_reverse(&mut self) {
        self.stage_reverse(Stage::Index);
    }

    /// Stop the index belts
    pub fn index_stop(&mut self) {
        self.stage_stop(Stage::Index);
    }

    /// Run the feeder toward the launcher
    pub fn feeder_in(&mut self) {
        self.stage_in(Stage::Feeder);
    }

    /// Run the feeder back toward the index
    pub fn feeder_reverse(&mut self) {
        self.stage_reverse(Stage::Feeder);
    }

    /// Stop the feeder
    pub fn feeder_stop(&mut self) {
        self.stage_stop(Stage::Feeder);
    }

    /// Check if a note is at a pipeline position
    pub fn has_note(&mut self, position: NotePosition) -> bool {
        match position {
            NotePosition::Index => self.index_sensor.is_present(),
            NotePosition::Feeder => self.feeder_sensor.is_present(),
        }
    }

    /// Check if the index sensor sees a note
    pub fn index_has_note(&mut self) -> bool {
        self.has_note(NotePosition::Index)
    }

    /// Check if the feeder sensor sees a note
    pub fn feeder_has_note(&mut self) -> bool {
        self.has_note(NotePosition::Feeder)
    }

    /// Take a telemetry snapshot
    pub fn telemetry(&mut self) -> IntakeTelemetry {
        IntakeTelemetry {
            index_has_note: self.index_has_note(),
            feeder_has_note: self.feeder_has_note(),
            in_speeds: Stage::ALL.map(|stage| self.resolved_in_speed(stage)),
            commanded: Stage::ALL.map(|stage| self.commanded_speed(stage)),
        }
    }

    /// Publish the telemetry snapshot
    pub fn publish(&mut self, sink: &mut dyn TelemetrySink) {
        let snapshot = self.telemetry();
        sink.put_bool(INDEX_SENSOR_KEY, snapshot.index_has_note);
        sink.put_bool(FEEDER_SENSOR_KEY, snapshot.feeder_has_note);
        for (stage, speed) in Stage::ALL.iter().zip(snapshot.in_speeds) {
            sink.put_number(stage.telemetry_key(), speed);
        }
    }
}

fn open_motor(
    hardware: &mut dyn HardwareProvider,
    id: DeviceId,
) -> Result<Box<dyn MotorController>, IntakeError> {
    hardware.motor_controller(id).map_err(|cause| {
        error!("Cannot open motor controller {}: {}", id, cause);
        IntakeError::Open { address: id, cause }
    })
}

fn open_motors(
    hardware: &mut dyn HardwareProvider,
    ids: &[DeviceId],
) -> Result<Vec<Box<dyn MotorController>>, IntakeError> {
    ids.iter().map(|id| open_motor(hardware, *id)).collect()
}
