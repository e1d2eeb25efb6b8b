//! # Triggers and bindings
//!
//! A [`Binding`] is one row of the scheduler's binding table: a [`Trigger`] to sample, a
//! [`BindMode`] saying what to do on its edges, and a factory building a fresh command whenever
//! one is needed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use comms_if::eqpt::input::{AxisId, ButtonId, InputSource};

use super::CommandHandle;
use crate::cmd::{Command, CommandError};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Builds a new instance of a bound command.
pub type CommandFactory = Box<dyn FnMut() -> Result<Box<dyn Command>, CommandError>>;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A boolean condition sampled once per cycle.
pub struct Trigger {
    name: String,
    condition: Box<dyn Fn() -> bool>,
    last: bool,
}

/// A trigger bound to a command factory.
pub struct Binding {
    pub(super) trigger: Trigger,
    pub(super) mode: BindMode,
    pub(super) factory: CommandFactory,

    /// The command most recently scheduled by this binding.
    pub(super) active: Option<CommandHandle>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// A change in a trigger's state between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// What a binding does on the edges of its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Schedule on the rising edge, cancel on the falling edge.
    WhileTrue,

    /// Schedule on the rising edge, the command then runs until it finishes or is interrupted.
    OnTrue,

    /// On each rising edge cancel the command if it's active, otherwise schedule it.
    ToggleOnTrue,
}

/// The scheduler action a binding asks for after being sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BindAction {
    None,
    Schedule,
    Cancel(CommandHandle),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Trigger {
    /// Create a new trigger.
    ///
    /// The condition is sampled immediately, so a condition which is already true when the
    /// trigger is created does not produce a rising edge until it has been false.
    pub fn new<F: Fn() -> bool + 'static>(name: &str, condition: F) -> Self {
        let last = condition();
        Self {
            name: name.to_string(),
            condition: Box::new(condition),
            last,
        }
    }

    /// Trigger which is true while a button is held.
    pub fn button(input: Rc<dyn InputSource>, id: ButtonId) -> Self {
        Self::new(&format!("{:?}", id), move || input.button(id))
    }

    /// Trigger which is true while an axis is above a threshold.
    pub fn axis_above(input: Rc<dyn InputSource>, id: AxisId, threshold: f64) -> Self {
        Self::new(&format!("{:?} > {}", id, threshold), move || {
            input.axis(id) > threshold
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample the condition, returning the edge since the last sample, if any.
    pub fn poll(&mut self) -> Option<Edge> {
        let now = (self.condition)();
        let edge = match (self.last, now) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.last = now;
        edge
    }
}

impl Binding {
    pub fn new<F>(trigger: Trigger, mode: BindMode, factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn Command>, CommandError> + 'static,
    {
        Self {
            trigger,
            mode,
            factory: Box::new(factory),
            active: None,
        }
    }

    pub fn while_true<F>(trigger: Trigger, factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn Command>, CommandError> + 'static,
    {
        Self::new(trigger, BindMode::WhileTrue, factory)
    }

    pub fn on_true<F>(trigger: Trigger, factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn Command>, CommandError> + 'static,
    {
        Self::new(trigger, BindMode::OnTrue, factory)
    }

    pub fn toggle_on_true<F>(trigger: Trigger, factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn Command>, CommandError> + 'static,
    {
        Self::new(trigger, BindMode::ToggleOnTrue, factory)
    }

    /// Sample the trigger and decide what the scheduler should do.
    ///
    /// `active` is the command this binding scheduled, if it is still active.
    pub(super) fn poll(&mut self, active: Option<CommandHandle>) -> BindAction {
        let edge = match self.trigger.poll() {
            Some(e) => e,
            None => return BindAction::None,
        };

        match (self.mode, edge, active) {
            (BindMode::WhileTrue, Edge::Rising, None)
            | (BindMode::OnTrue, Edge::Rising, None)
            | (BindMode::ToggleOnTrue, Edge::Rising, None) => BindAction::Schedule,
            (BindMode::WhileTrue, Edge::Falling, Some(h))
            | (BindMode::ToggleOnTrue, Edge::Rising, Some(h)) => BindAction::Cancel(h),
            _ => BindAction::None,
        }
    }
}
