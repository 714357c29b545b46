//! Intake commands

use super::{Command, HasIntake, Phase, Requirements, SubsystemId};
use crate::subsystem::{NotePosition, Stage, StageDirection};

/// Stop one stage and finish on the next poll
///
/// Issues exactly one stop on activation. Used as the feeder note
/// alignment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopStage {
    name: &'static str,
    stage: Stage,
    phase: Phase,
}

impl StopStage {
    /// Create a stop command for a stage
    pub const fn new(stage: Stage) -> Self {
        Self {
            name: "stop stage",
            stage,
            phase: Phase::Idle,
        }
    }

    /// Feeder note alignment: stop the feeder so the note rests against it
    pub const fn feeder_alignment() -> Self {
        Self {
            name: "feeder alignment",
            stage: Stage::Feeder,
            phase: Phase::Idle,
        }
    }

    /// Stage this command stops
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R: HasIntake + ?Sized> Command<R> for StopStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> Requirements {
        Requirements::of(SubsystemId::Intake)
    }

    fn on_activate(&mut self, robot: &mut R) {
        robot.intake().stage_stop(self.stage);
        self.phase = Phase::Active;
    }

    fn on_poll(&mut self, _robot: &mut R) -> bool {
        self.phase = Phase::Finished;
        true
    }

    fn on_interrupt(&mut self, _robot: &mut R) {
        self.phase = Phase::Interrupted;
    }
}

/// Drive one stage continuously until interrupted
///
/// The speed is re-applied on every poll so a changed in-speed override
/// takes effect on the next tick. The poll following activation sends
/// nothing: the stage receives at most one speed command per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStage {
    stage: Stage,
    direction: StageDirection,
    phase: Phase,
    /// Speed already sent by `on_activate`
    activated: bool,
}

impl RunStage {
    /// Create a command driving `stage` in `direction`
    pub const fn new(stage: Stage, direction: StageDirection) -> Self {
        Self {
            stage,
            direction,
            phase: Phase::Idle,
            activated: false,
        }
    }

    /// Run a stage toward the launcher
    pub const fn forward(stage: Stage) -> Self {
        Self::new(stage, StageDirection::In)
    }

    /// Run a stage back toward the floor
    pub const fn reverse(stage: Stage) -> Self {
        Self::new(stage, StageDirection::Reverse)
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R: HasIntake + ?Sized> Command<R> for RunStage {
    fn name(&self) -> &'static str {
        match self.direction {
            StageDirection::In => "run stage in",
            StageDirection::Reverse => "run stage reverse",
        }
    }

    fn requirements(&self) -> Requirements {
        Requirements::of(SubsystemId::Intake)
    }

    fn on_activate(&mut self, robot: &mut R) {
        robot.intake().drive(self.stage, self.direction);
        self.activated = true;
        self.phase = Phase::Active;
    }

    fn on_poll(&mut self, robot: &mut R) -> bool {
        if !core::mem::take(&mut self.activated) {
            robot.intake().drive(self.stage, self.direction);
        }
        false
    }

    fn on_interrupt(&mut self, robot: &mut R) {
        robot.intake().stage_stop(self.stage);
        self.phase = Phase::Interrupted;
    }
}

/// Drive a stage in until a sensor sees a note, then stop
///
/// A note already present on activation stops the stage instead of
/// driving it. Like [`RunStage`], the poll following activation sends
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStageUntilNote {
    stage: Stage,
    position: NotePosition,
    phase: Phase,
    activated: bool,
}

impl RunStageUntilNote {
    /// Create a command running `stage` in until `position` sees a note
    pub const fn new(stage: Stage, position: NotePosition) -> Self {
        Self {
            stage,
            position,
            phase: Phase::Idle,
            activated: false,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R: HasIntake + ?Sized> Command<R> for RunStageUntilNote {
    fn name(&self) -> &'static str {
        "run stage until note"
    }

    fn requirements(&self) -> Requirements {
        Requirements::of(SubsystemId::Intake)
    }

    fn on_activate(&mut self, robot: &mut R) {
        let intake = robot.intake();
        self.activated = true;
        if intake.has_note(self.position) {
            debug!("{}: note already at {}", self.stage, self.position);
            intake.stage_stop(self.stage);
            self.phase = Phase::Finished;
            return;
        }

        intake.stage_in(self.stage);
        self.phase = Phase::Active;
    }

    fn on_poll(&mut self, robot: &mut R) -> bool {
        if core::mem::take(&mut self.activated) {
            return self.phase == Phase::Finished;
        }

        let intake = robot.intake();
        if intake.has_note(self.position) {
            debug!("{}: note at {}", self.stage, self.position);
            intake.stage_stop(self.stage);
            self.phase = Phase::Finished;
            return true;
        }

        intake.stage_in(self.stage);
        false
    }

    fn on_interrupt(&mut self, robot: &mut R) {
        robot.intake().stage_stop(self.stage);
        self.phase = Phase::Interrupted;
    }
}
