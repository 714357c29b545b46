//! Mechanism subsystems
//!
//! A subsystem owns every actuator group and sensor of one physical
//! mechanism and is the unit of exclusive ownership for the scheduler.

pub mod intake;

pub use intake::{
    IntakeError, IntakeSubsystem, IntakeTelemetry, NotePosition, Stage, StageDirection,
    FEEDER_SENSOR_KEY, INDEX_SENSOR_KEY,
};
