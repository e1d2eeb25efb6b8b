//! # Command compositions
//!
//! Compositions own their children and forward the lifecycle to them, so a composition can be
//! scheduled, interrupted and composed further like any other command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use super::{Command, CommandError, Cycle, Requirements};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Runs its children strictly one after the other.
///
/// A child is initialised in the same cycle its predecessor finishes, and first executed on the
/// next cycle. Interrupting the sequence interrupts the child that is currently running, children
/// which have not started yet are never initialised or ended.
pub struct Sequence {
    name: String,
    cmds: Vec<Box<dyn Command>>,
    reqs: Requirements,
    current: usize,
}

/// Ends its child, interrupted, once the child has been executing for a fixed duration.
///
/// Elapsed time is counted in cycles, each `execute` adds one cycle period. The child is not
/// executed once the timeout has expired, so a zero timeout ends the child without executing it.
pub struct Timeout {
    name: String,
    inner: Box<dyn Command>,
    duration: Duration,
    elapsed: Duration,
    inner_finished: bool,
}

/// Runs a cleanup action after its child ends, on every path out of the child.
pub struct Finally {
    name: String,
    inner: Box<dyn Command>,
    cleanup: Box<dyn FnMut(bool)>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Sequence {
    /// Create a sequence from a list of commands.
    ///
    /// The sequence requires every subsystem any of its children requires.
    pub fn new(cmds: Vec<Box<dyn Command>>) -> Result<Self, CommandError> {
        if cmds.is_empty() {
            return Err(CommandError::EmptyComposition("sequence"));
        }

        let reqs = cmds
            .iter()
            .flat_map(|c| c.requirements().into_iter())
            .collect();

        let name = cmds
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(" -> ");

        Ok(Self {
            name,
            cmds,
            reqs,
            current: 0,
        })
    }

    pub(super) fn pair(first: Box<dyn Command>, second: Box<dyn Command>) -> Self {
        let mut reqs = first.requirements();
        reqs.extend(second.requirements());

        Self {
            name: format!("{} -> {}", first.name(), second.name()),
            cmds: vec![first, second],
            reqs,
            current: 0,
        }
    }

    /// Append another command to the end of the sequence.
    pub fn and_then<C: Command + 'static>(mut self, next: C) -> Self {
        self.name = format!("{} -> {}", self.name, next.name());
        self.reqs.extend(next.requirements());
        self.cmds.push(Box::new(next));
        self
    }
}

impl Command for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.reqs.clone()
    }

    fn init(&mut self) {
        self.current = 0;
        self.cmds[0].init();
    }

    fn execute(&mut self, cycle: &Cycle) {
        let cmd = match self.cmds.get_mut(self.current) {
            Some(c) => c,
            None => return,
        };

        cmd.execute(cycle);

        if cmd.is_finished() {
            cmd.end(false);
            self.current += 1;

            if let Some(next) = self.cmds.get_mut(self.current) {
                next.init();
            }
        }
    }

    fn is_finished(&mut self) -> bool {
        self.current >= self.cmds.len()
    }

    fn end(&mut self, interrupted: bool) {
        if interrupted {
            if let Some(cmd) = self.cmds.get_mut(self.current) {
                cmd.end(true);
            }
        }
        self.current = self.cmds.len();
    }
}

impl Timeout {
    pub fn new(inner: Box<dyn Command>, duration: Duration) -> Self {
        Self {
            name: format!("{} (timeout {:.2} s)", inner.name(), duration.as_secs_f64()),
            inner,
            duration,
            elapsed: Duration::default(),
            inner_finished: false,
        }
    }

    /// True once the child has been executing for at least the timeout duration.
    pub fn timed_out(&self) -> bool {
        self.elapsed >= self.duration
    }
}

impl Command for Timeout {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.inner.requirements()
    }

    fn init(&mut self) {
        self.elapsed = Duration::default();
        self.inner_finished = false;
        self.inner.init();
    }

    fn execute(&mut self, cycle: &Cycle) {
        if self.timed_out() {
            return;
        }

        self.inner.execute(cycle);
        self.elapsed += cycle.period;
    }

    fn is_finished(&mut self) -> bool {
        self.inner_finished = self.inner.is_finished();
        self.inner_finished || self.timed_out()
    }

    fn end(&mut self, interrupted: bool) {
        // A child which didn't finish on its own was cut short, either by the timeout or by
        // whatever interrupted us
        self.inner.end(interrupted || !self.inner_finished);
    }
}

impl Finally {
    pub fn new<F: FnMut(bool) + 'static>(inner: Box<dyn Command>, cleanup: F) -> Self {
        Self {
            name: inner.name().to_string(),
            inner,
            cleanup: Box::new(cleanup),
        }
    }
}

impl Command for Finally {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.inner.requirements()
    }

    fn init(&mut self) {
        self.inner.init();
    }

    fn execute(&mut self, cycle: &Cycle) {
        self.inner.execute(cycle);
    }

    fn is_finished(&mut self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, interrupted: bool) {
        self.inner.end(interrupted);
        (self.cleanup)(interrupted);
    }
}

#[cfg(test)]
mod test {
    use super::super::{probe::*, CommandExt, SubsystemId};
    use super::*;

    const A: SubsystemId = SubsystemId("a");
    const B: SubsystemId = SubsystemId("b");

    /// Drive a command the way the scheduler does, returning the cycle on which it finished.
    fn run_to_end(cmd: &mut dyn Command, max_cycles: u64) -> Option<u64> {
        cmd.init();
        for n in 0..max_cycles {
            cmd.execute(&cycle(n));
            if cmd.is_finished() {
                cmd.end(false);
                return Some(n);
            }
        }
        None
    }

    #[test]
    fn test_sequence_order() {
        let log = new_log();
        let mut seq = Sequence::new(vec![
            ProbeCommand::new("first", &[A], &log).finishing_after(2).boxed(),
            ProbeCommand::new("second", &[B], &log).finishing_after(1).boxed(),
        ])
        .unwrap();

        assert_eq!(seq.requirements(), super::super::requires(&[A, B]));
        assert_eq!(run_to_end(&mut seq, 10), Some(2));
        assert_eq!(
            *log.borrow(),
            vec![
                "first.init",
                "first.execute",
                "first.execute",
                "first.end(false)",
                "second.init",
                "second.execute",
                "second.end(false)",
            ]
        );
    }

    #[test]
    fn test_sequence_interrupt_ends_current_child_only() {
        let log = new_log();
        let mut seq = ProbeCommand::new("first", &[A], &log)
            .finishing_after(1)
            .and_then(ProbeCommand::new("second", &[A], &log))
            .and_then(ProbeCommand::new("third", &[A], &log));

        seq.init();
        seq.execute(&cycle(0));
        seq.execute(&cycle(1));
        assert_eq!(log.borrow().last().unwrap(), "second.execute");
        seq.end(true);

        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| e.as_str() == "second.end(true)").count(), 1);
        assert!(!log.iter().any(|e| e.starts_with("third")));
    }

    #[test]
    fn test_empty_sequence_rejected() {
        assert_eq!(
            Sequence::new(vec![]).err(),
            Some(CommandError::EmptyComposition("sequence"))
        );
    }

    #[test]
    fn test_timeout_interrupts_child() {
        let log = new_log();
        let mut cmd = ProbeCommand::new("spin", &[A], &log).with_timeout(Duration::from_secs(1));

        // 50 cycles of 20 ms make one second, the 50th cycle is number 49
        assert_eq!(run_to_end(&mut cmd, 100), Some(49));
        assert_eq!(log.borrow().iter().filter(|e| e.ends_with("execute")).count(), 50);
        assert_eq!(log.borrow().last().unwrap(), "spin.end(true)");
    }

    #[test]
    fn test_timeout_child_finishing_first() {
        let log = new_log();
        let mut cmd = ProbeCommand::new("quick", &[A], &log)
            .finishing_after(3)
            .with_timeout(Duration::from_secs(1));

        assert_eq!(run_to_end(&mut cmd, 100), Some(2));
        assert_eq!(log.borrow().last().unwrap(), "quick.end(false)");
    }

    #[test]
    fn test_zero_timeout_never_executes_child() {
        let log = new_log();
        let mut cmd = ProbeCommand::new("skipped", &[A], &log).with_timeout(Duration::default());

        assert_eq!(run_to_end(&mut cmd, 5), Some(0));
        assert_eq!(*log.borrow(), vec!["skipped.init", "skipped.end(true)"]);
    }

    #[test]
    fn test_finally_runs_on_every_path() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let cleanups = Rc::new(RefCell::new(Vec::new()));

        // Natural end
        let log = new_log();
        let c = cleanups.clone();
        let mut cmd = ProbeCommand::new("cmd", &[A], &log)
            .finishing_after(1)
            .finally_do(move |i| c.borrow_mut().push(i));
        run_to_end(&mut cmd, 5);

        // Interrupted
        let c = cleanups.clone();
        let mut cmd =
            ProbeCommand::new("cmd", &[A], &log).finally_do(move |i| c.borrow_mut().push(i));
        cmd.init();
        cmd.execute(&cycle(0));
        cmd.end(true);

        assert_eq!(*cleanups.borrow(), vec![false, true]);
        assert_eq!(log.borrow().last().unwrap(), "cmd.end(true)");
    }
}
