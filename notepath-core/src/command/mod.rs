//! Command framework
//!
//! A command is a unit of robot behavior driven by a cooperative scheduler:
//!
//! ```text
//! Idle ──on_activate()──▶ Active ──on_poll() == true──▶ Finished
//!                           │
//!                           └──on_interrupt()──▶ Interrupted
//! ```
//!
//! Commands never block. Each tick the scheduler calls `on_poll` once on
//! every active command; a command that returns `true` is finished and is
//! not polled again. Commands declare the subsystems they need exclusively
//! through [`Requirements`].
//!
//! Commands are generic over the robot context `R` they act on. The
//! context exposes subsystems through accessor traits ([`HasIntake`],
//! [`HasLauncher`]) so a command only names what it touches.

pub mod intake;
pub mod launcher;
pub mod scheduler;
pub mod sequence;

use alloc::boxed::Box;

use crate::subsystem::IntakeSubsystem;
use crate::traits::Launcher;

pub use intake::{RunStage, RunStageUntilNote, StopStage};
pub use launcher::{LaunchPreset, PresetError, SetAngle, SetLaunchSpeed};
pub use scheduler::{CommandHandle, CommandScheduler, ScheduleError, MAX_SCHEDULED};
pub use sequence::Sequence;

/// Subsystems a command can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubsystemId {
    /// Intake pipeline (intake, index, feeder)
    Intake,
    /// Launcher pivot and wheels
    Launcher,
}

impl SubsystemId {
    const fn bit(self) -> u8 {
        match self {
            SubsystemId::Intake => 1 << 0,
            SubsystemId::Launcher => 1 << 1,
        }
    }
}

/// Set of subsystems a command needs exclusively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Requirements(u8);

impl Requirements {
    /// No requirements
    pub const NONE: Self = Self(0);

    /// Requirements naming a single subsystem
    pub const fn of(id: SubsystemId) -> Self {
        Self(id.bit())
    }

    /// Add a subsystem
    pub const fn with(self, id: SubsystemId) -> Self {
        Self(self.0 | id.bit())
    }

    /// Union of two sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if both sets share a subsystem
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Check if a subsystem is required
    pub const fn contains(self, id: SubsystemId) -> bool {
        self.0 & id.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Command lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Built, not yet activated
    #[default]
    Idle,
    /// Activated and being polled
    Active,
    /// Reported completion
    Finished,
    /// Stopped by the scheduler before completion
    Interrupted,
}

/// A cooperatively scheduled unit of robot behavior
pub trait Command<R: ?Sized> {
    /// Get the command name (for logs)
    fn name(&self) -> &'static str;

    /// Get the subsystems this command needs exclusively
    fn requirements(&self) -> Requirements;

    /// Called once when the command is scheduled
    fn on_activate(&mut self, robot: &mut R);

    /// Called once per tick while active; returns `true` when finished
    fn on_poll(&mut self, robot: &mut R) -> bool;

    /// Called if the command is cancelled before finishing
    fn on_interrupt(&mut self, _robot: &mut R) {}
}

/// Heap-allocated command
pub type BoxedCommand<R> = Box<dyn Command<R>>;

/// Robot context giving access to the intake subsystem
pub trait HasIntake {
    fn intake(&mut self) -> &mut IntakeSubsystem;
}

impl HasIntake for IntakeSubsystem {
    fn intake(&mut self) -> &mut IntakeSubsystem {
        self
    }
}

/// Robot context giving access to the launcher
pub trait HasLauncher {
    fn launcher(&mut self) -> &mut dyn Launcher;
}
