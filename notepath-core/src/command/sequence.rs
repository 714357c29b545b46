//! Sequential composite command
//!
//! Runs an ordered list of commands one after another. At most one step
//! is active at a time and the cursor only moves forward. When a step
//! finishes, the next one is activated in the same tick, so step N+1 can
//! never issue a directive before step N reported completion.

use alloc::vec::Vec;

use super::{BoxedCommand, Command, Phase, Requirements};

/// Ordered sequence of commands
pub struct Sequence<R: ?Sized> {
    name: &'static str,
    steps: Vec<BoxedCommand<R>>,
    cursor: usize,
    phase: Phase,
}

impl<R: ?Sized> Sequence<R> {
    /// Create an empty sequence
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
            cursor: 0,
            phase: Phase::Idle,
        }
    }

    /// Append a step
    pub fn then(mut self, step: BoxedCommand<R>) -> Self {
        self.steps.push(step);
        self
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the sequence has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the active step
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<R: ?Sized> Command<R> for Sequence<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> Requirements {
        self.steps
            .iter()
            .fold(Requirements::NONE, |acc, step| acc.union(step.requirements()))
    }

    fn on_activate(&mut self, robot: &mut R) {
        self.cursor = 0;
        self.phase = Phase::Active;
        if let Some(step) = self.steps.first_mut() {
            trace!("{}: step 0 ({})", self.name, step.name());
            step.on_activate(robot);
        }
    }

    fn on_poll(&mut self, robot: &mut R) -> bool {
        let Some(step) = self.steps.get_mut(self.cursor) else {
            self.phase = Phase::Finished;
            return true;
        };
        if !step.on_poll(robot) {
            return false;
        }

        self.cursor += 1;
        match self.steps.get_mut(self.cursor) {
            Some(next) => {
                trace!("{}: step {} ({})", self.name, self.cursor, next.name());
                next.on_activate(robot);
                false
            }
            None => {
                self.phase = Phase::Finished;
                true
            }
        }
    }

    fn on_interrupt(&mut self, robot: &mut R) {
        if let Some(step) = self.steps.get_mut(self.cursor) {
            step.on_interrupt(robot);
        }
        self.phase = Phase::Interrupted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SubsystemId;
    use alloc::boxed::Box;
    use alloc::vec;

    /// Robot context recording every lifecycle call
    #[derive(Default)]
    struct Log {
        events: Vec<(&'static str, &'static str)>,
    }

    struct Step {
        name: &'static str,
        polls_to_finish: usize,
        requirement: SubsystemId,
    }

    impl Command<Log> for Step {
        fn name(&self) -> &'static str {
            self.name
        }

        fn requirements(&self) -> Requirements {
            Requirements::of(self.requirement)
        }

        fn on_activate(&mut self, log: &mut Log) {
            log.events.push((self.name, "activate"));
        }

        fn on_poll(&mut self, log: &mut Log) -> bool {
            log.events.push((self.name, "poll"));
            if self.polls_to_finish <= 1 {
                return true;
            }
            self.polls_to_finish -= 1;
            false
        }

        fn on_interrupt(&mut self, log: &mut Log) {
            log.events.push((self.name, "interrupt"));
        }
    }

    fn step(name: &'static str, polls: usize, requirement: SubsystemId) -> BoxedCommand<Log> {
        Box::new(Step {
            name,
            polls_to_finish: polls,
            requirement,
        })
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut log = Log::default();
        let mut seq = Sequence::new("seq")
            .then(step("a", 2, SubsystemId::Launcher))
            .then(step("b", 1, SubsystemId::Launcher));

        seq.on_activate(&mut log);
        assert!(!seq.on_poll(&mut log));
        assert!(!seq.on_poll(&mut log));
        assert_eq!(seq.cursor(), 1);
        assert!(seq.on_poll(&mut log));
        assert_eq!(seq.phase(), Phase::Finished);

        assert_eq!(
            log.events,
            vec![
                ("a", "activate"),
                ("a", "poll"),
                ("a", "poll"),
                ("b", "activate"),
                ("b", "poll"),
            ]
        );
    }

    #[test]
    fn test_requirements_union() {
        let seq = Sequence::new("seq")
            .then(step("a", 1, SubsystemId::Intake))
            .then(step("b", 1, SubsystemId::Launcher));

        let reqs = seq.requirements();
        assert!(reqs.contains(SubsystemId::Intake));
        assert!(reqs.contains(SubsystemId::Launcher));
    }

    #[test]
    fn test_empty_sequence_finishes_on_first_poll() {
        let mut log = Log::default();
        let mut seq: Sequence<Log> = Sequence::new("empty");

        seq.on_activate(&mut log);
        assert!(seq.on_poll(&mut log));
        assert!(log.events.is_empty());
        assert!(seq.requirements().is_empty());
    }

    #[test]
    fn test_interrupt_reaches_active_step_only() {
        let mut log = Log::default();
        let mut seq = Sequence::new("seq")
            .then(step("a", 1, SubsystemId::Intake))
            .then(step("b", 3, SubsystemId::Intake))
            .then(step("c", 1, SubsystemId::Intake));

        seq.on_activate(&mut log);
        assert!(!seq.on_poll(&mut log));
        seq.on_interrupt(&mut log);

        assert_eq!(seq.phase(), Phase::Interrupted);
        assert_eq!(log.events.last(), Some(&("b", "interrupt")));
        assert!(!log.events.iter().any(|(name, _)| *name == "c"));
    }

    #[test]
    fn test_reactivation_restarts_from_first_step() {
        let mut log = Log::default();
        let mut seq = Sequence::new("seq")
            .then(step("a", 1, SubsystemId::Intake))
            .then(step("b", 5, SubsystemId::Intake));

        seq.on_activate(&mut log);
        assert!(!seq.on_poll(&mut log));
        assert_eq!(seq.cursor(), 1);

        seq.on_activate(&mut log);
        assert_eq!(seq.cursor(), 0);
        assert_eq!(log.events.last(), Some(&("a", "activate")));
    }
}
