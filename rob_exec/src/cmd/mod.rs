//! # Commands
//!
//! A command is a unit of scheduled behaviour. The scheduler drives every active command through
//! the same lifecycle:
//!
//! 1. `init` once, when the command is scheduled,
//! 2. `execute` then `is_finished` on every cycle while the command is active,
//! 3. `end` exactly once, with `interrupted = false` if the command finished on its own, or
//!    `interrupted = true` if it was cancelled or another command claimed one of its subsystems.
//!
//! Commands are built either from closures ([`FnCommand`]) or by composing other commands
//! ([`Sequence`], [`Timeout`], [`Finally`]). Compositions implement [`Command`] themselves by
//! delegating to their children.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod compose;
mod funcs;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;

pub use compose::*;
pub use funcs::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A unit of scheduled behaviour.
///
/// None of the hooks may block, anything that takes time must be spread over several cycles.
pub trait Command {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// The subsystems this command needs exclusive use of while it is active.
    fn requirements(&self) -> Requirements;

    /// Called once when the command is scheduled.
    fn init(&mut self) {}

    /// Called on every cycle while the command is active.
    fn execute(&mut self, _cycle: &Cycle) {}

    /// Polled after each `execute`, the command is ended once this returns true.
    fn is_finished(&mut self) -> bool {
        false
    }

    /// Called exactly once when the command stops being active.
    fn end(&mut self, _interrupted: bool) {}
}

/// Decorators available on every command.
pub trait CommandExt: Command + Sized + 'static {
    /// End this command (interrupted) once it has been executing for `duration`.
    fn with_timeout(self, duration: Duration) -> Timeout {
        Timeout::new(Box::new(self), duration)
    }

    /// Run `next` after this command finishes.
    fn and_then<C: Command + 'static>(self, next: C) -> Sequence {
        Sequence::pair(Box::new(self), Box::new(next))
    }

    /// Run `cleanup` after this command ends, however it ends.
    fn finally_do<F: FnMut(bool) + 'static>(self, cleanup: F) -> Finally {
        Finally::new(Box::new(self), cleanup)
    }

    fn boxed(self) -> Box<dyn Command> {
        Box::new(self)
    }
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Identifies a subsystem, used to express command requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubsystemId(pub &'static str);

/// Information about the cycle being executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// Number of cycles executed before this one.
    pub num: u64,

    /// Nominal period of every cycle, used to count elapsed time.
    pub period: Duration,
}

/// The set of subsystems a command requires.
pub type Requirements = BTreeSet<SubsystemId>;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors that can occur while building commands.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("A {0} composition must contain at least one command")]
    EmptyComposition(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<T: Command + Sized + 'static> CommandExt for T {}

impl<C: Command + ?Sized> Command for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn requirements(&self) -> Requirements {
        (**self).requirements()
    }

    fn init(&mut self) {
        (**self).init()
    }

    fn execute(&mut self, cycle: &Cycle) {
        (**self).execute(cycle)
    }

    fn is_finished(&mut self) -> bool {
        (**self).is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        (**self).end(interrupted)
    }
}

/// Build a requirement set from a list of subsystems.
pub fn requires(ids: &[SubsystemId]) -> Requirements {
    ids.iter().copied().collect()
}

// ---------------------------------------------------------------------------
// TEST SUPPORT
// ---------------------------------------------------------------------------

/// A command which records its lifecycle calls into a shared log, for scheduler tests.
#[cfg(test)]
pub(crate) mod probe {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub type EventLog = Rc<RefCell<Vec<String>>>;

    pub struct ProbeCommand {
        pub name: String,
        pub reqs: Requirements,
        pub log: EventLog,
        pub finish_after: Option<u32>,
        pub executed: u32,
    }

    impl ProbeCommand {
        pub fn new(name: &str, reqs: &[SubsystemId], log: &EventLog) -> Self {
            Self {
                name: name.to_string(),
                reqs: requires(reqs),
                log: log.clone(),
                finish_after: None,
                executed: 0,
            }
        }

        pub fn finishing_after(mut self, num_executes: u32) -> Self {
            self.finish_after = Some(num_executes);
            self
        }
    }

    impl Command for ProbeCommand {
        fn name(&self) -> &str {
            &self.name
        }

        fn requirements(&self) -> Requirements {
            self.reqs.clone()
        }

        fn init(&mut self) {
            self.executed = 0;
            self.log.borrow_mut().push(format!("{}.init", self.name));
        }

        fn execute(&mut self, _cycle: &Cycle) {
            self.executed += 1;
            self.log.borrow_mut().push(format!("{}.execute", self.name));
        }

        fn is_finished(&mut self) -> bool {
            match self.finish_after {
                Some(n) => self.executed >= n,
                None => false,
            }
        }

        fn end(&mut self, interrupted: bool) {
            self.log
                .borrow_mut()
                .push(format!("{}.end({})", self.name, interrupted));
        }
    }

    pub fn new_log() -> EventLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    pub fn cycle(num: u64) -> Cycle {
        Cycle {
            num,
            period: Duration::from_millis(20),
        }
    }
}
