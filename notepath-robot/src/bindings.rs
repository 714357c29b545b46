//! Operator bindings
//!
//! Maps controller buttons to commands. A binding names an [`Action`] and
//! a [`Trigger`]; the robot loop turns button edges into scheduler calls.

use alloc::boxed::Box;

use heapless::String;
use serde::{Deserialize, Serialize};

use notepath_core::command::{
    BoxedCommand, HasIntake, HasLauncher, LaunchPreset, RunStage, RunStageUntilNote, StopStage,
};
use notepath_core::config::MAX_LABEL_LEN;
use notepath_core::subsystem::{NotePosition, Stage};

/// Highest usable button index (buttons are bits of a `u32`)
pub const MAX_BUTTON: u8 = 31;

/// What a button does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    IntakeIn,
    IntakeReverse,
    IndexIn,
    IndexReverse,
    FeederIn,
    FeederReverse,
    /// Run the index until the index sensor sees a note
    IndexUntilNote,
    /// Run the feeder until the feeder sensor sees a note
    FeederUntilNote,
    /// Stop the feeder so the note rests against it
    FeederAlign,
    /// Run a named launch preset
    Preset(String<MAX_LABEL_LEN>),
}

impl Action {
    /// Name of the preset this action runs, if any
    pub fn preset_name(&self) -> Option<&str> {
        match self {
            Action::Preset(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Build a fresh command for this action
    ///
    /// `preset` must be the resolved preset for [`Action::Preset`]; other
    /// actions ignore it. Returns `None` for a preset action without one.
    pub fn command<R>(&self, preset: Option<&LaunchPreset>) -> Option<BoxedCommand<R>>
    where
        R: HasIntake + HasLauncher + 'static,
    {
        let command: BoxedCommand<R> = match self {
            Action::IntakeIn => Box::new(RunStage::forward(Stage::Intake)),
            Action::IntakeReverse => Box::new(RunStage::reverse(Stage::Intake)),
            Action::IndexIn => Box::new(RunStage::forward(Stage::Index)),
            Action::IndexReverse => Box::new(RunStage::reverse(Stage::Index)),
            Action::FeederIn => Box::new(RunStage::forward(Stage::Feeder)),
            Action::FeederReverse => Box::new(RunStage::reverse(Stage::Feeder)),
            Action::IndexUntilNote => {
                Box::new(RunStageUntilNote::new(Stage::Index, NotePosition::Index))
            }
            Action::FeederUntilNote => {
                Box::new(RunStageUntilNote::new(Stage::Feeder, NotePosition::Feeder))
            }
            Action::FeederAlign => Box::new(StopStage::feeder_alignment()),
            Action::Preset(_) => Box::new(preset?.command::<R>()),
        };
        Some(command)
    }
}

/// When a binding fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Schedule on press; runs until it finishes or is interrupted
    #[default]
    OnPress,
    /// Schedule on press; cancelled on release
    WhileHeld,
}

/// One button binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Button index, `0..=MAX_BUTTON`
    pub button: u8,
    pub action: Action,
    #[serde(default)]
    pub trigger: Trigger,
}
