//! # Closure-built commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{requires, Command, Cycle, Requirements, SubsystemId};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A command whose hooks are closures.
///
/// Any hook left unset does nothing, and a command without an `until` condition never finishes on
/// its own.
pub struct FnCommand {
    name: String,
    reqs: Requirements,
    on_init: Option<Box<dyn FnMut()>>,
    on_execute: Option<Box<dyn FnMut()>>,
    on_end: Option<Box<dyn FnMut(bool)>>,
    until: Option<Box<dyn FnMut() -> bool>>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl FnCommand {
    pub fn new(name: &str, reqs: &[SubsystemId]) -> Self {
        Self {
            name: name.to_string(),
            reqs: requires(reqs),
            on_init: None,
            on_execute: None,
            on_end: None,
            until: None,
        }
    }

    /// Command which runs `action` every cycle and never finishes.
    pub fn run<F: FnMut() + 'static>(name: &str, reqs: &[SubsystemId], action: F) -> Self {
        Self::new(name, reqs).on_execute(action)
    }

    /// Command which runs `action` every cycle and `end` when it is interrupted.
    pub fn run_end<F, E>(name: &str, reqs: &[SubsystemId], action: F, mut end: E) -> Self
    where
        F: FnMut() + 'static,
        E: FnMut() + 'static,
    {
        Self::new(name, reqs)
            .on_execute(action)
            .on_end(move |_| end())
    }

    /// Command which runs `action` once and finishes on its first cycle.
    pub fn run_once<F: FnMut() + 'static>(name: &str, reqs: &[SubsystemId], action: F) -> Self {
        Self::new(name, reqs).on_init(action).until(|| true)
    }

    pub fn on_init<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_init = Some(Box::new(f));
        self
    }

    pub fn on_execute<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_execute = Some(Box::new(f));
        self
    }

    pub fn on_end<F: FnMut(bool) + 'static>(mut self, f: F) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Finish the command once `f` returns true.
    pub fn until<F: FnMut() -> bool + 'static>(mut self, f: F) -> Self {
        self.until = Some(Box::new(f));
        self
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> Requirements {
        self.reqs.clone()
    }

    fn init(&mut self) {
        if let Some(f) = self.on_init.as_mut() {
            f()
        }
    }

    fn execute(&mut self, _cycle: &Cycle) {
        if let Some(f) = self.on_execute.as_mut() {
            f()
        }
    }

    fn is_finished(&mut self) -> bool {
        match self.until.as_mut() {
            Some(f) => f(),
            None => false,
        }
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(f) = self.on_end.as_mut() {
            f(interrupted)
        }
    }
}
