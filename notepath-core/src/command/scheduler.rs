//! Cooperative command scheduler
//!
//! Owns the active commands and drives them once per tick. Requirements
//! are exclusive: scheduling a command interrupts every active command
//! that shares a subsystem with it.

use alloc::vec::Vec;

use super::{BoxedCommand, Requirements};

/// Maximum concurrently active commands
pub const MAX_SCHEDULED: usize = 8;

/// Errors that can occur when scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// Too many active commands
    Full,
}

/// Handle to a scheduled command
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandHandle(u32);

struct Scheduled<R: ?Sized> {
    handle: CommandHandle,
    requirements: Requirements,
    command: BoxedCommand<R>,
}

/// Scheduler of commands acting on a robot context `R`
pub struct CommandScheduler<R: ?Sized> {
    active: Vec<Scheduled<R>>,
    next_handle: u32,
}

impl<R: ?Sized> Default for CommandScheduler<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> CommandScheduler<R> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            active: Vec::with_capacity(MAX_SCHEDULED),
            next_handle: 0,
        }
    }

    /// Schedule and activate a command
    ///
    /// Active commands sharing a requirement with the new one are
    /// interrupted first. Nothing is interrupted if the new command cannot
    /// be accepted.
    pub fn schedule(
        &mut self,
        robot: &mut R,
        mut command: BoxedCommand<R>,
    ) -> Result<CommandHandle, ScheduleError> {
        let requirements = command.requirements();
        let conflicts = self
            .active
            .iter()
            .filter(|s| s.requirements.intersects(requirements))
            .count();
        if self.active.len() - conflicts >= MAX_SCHEDULED {
            warn!("Cannot schedule {}: scheduler full", command.name());
            return Err(ScheduleError::Full);
        }

        self.active.retain_mut(|s| {
            if !s.requirements.intersects(requirements) {
                return true;
            }
            debug!("{} interrupted by {}", s.command.name(), command.name());
            s.command.on_interrupt(robot);
            false
        });

        let handle = CommandHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        debug!("{} activated", command.name());
        command.on_activate(robot);
        self.active.push(Scheduled {
            handle,
            requirements,
            command,
        });
        Ok(handle)
    }

    /// Poll every active command once, dropping the finished ones
    pub fn tick(&mut self, robot: &mut R) {
        self.active.retain_mut(|s| {
            let finished = s.command.on_poll(robot);
            if finished {
                debug!("{} finished", s.command.name());
            }
            !finished
        });
    }

    /// Interrupt one command
    ///
    /// Returns `false` if the command already finished or was interrupted.
    pub fn cancel(&mut self, robot: &mut R, handle: CommandHandle) -> bool {
        let Some(pos) = self.active.iter().position(|s| s.handle == handle) else {
            return false;
        };
        let mut scheduled = self.active.remove(pos);
        debug!("{} cancelled", scheduled.command.name());
        scheduled.command.on_interrupt(robot);
        true
    }

    /// Interrupt every active command
    pub fn cancel_all(&mut self, robot: &mut R) {
        for mut scheduled in self.active.drain(..) {
            debug!("{} cancelled", scheduled.command.name());
            scheduled.command.on_interrupt(robot);
        }
    }

    /// Check if a command is still active
    pub fn is_scheduled(&self, handle: CommandHandle) -> bool {
        self.active.iter().any(|s| s.handle == handle)
    }

    /// Union of the requirements of all active commands
    pub fn requirements_in_use(&self) -> Requirements {
        self.active
            .iter()
            .fold(Requirements::NONE, |acc, s| acc.union(s.requirements))
    }

    /// Number of active commands
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Check if no command is active
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
