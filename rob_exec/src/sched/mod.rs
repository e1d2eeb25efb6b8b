//! # Command scheduler
//!
//! The [`Scheduler`] owns every command and runs one cycle each time [`Scheduler::tick`] is
//! called. One cycle consists of:
//!
//! 1. Subsystem periodic processing, in registration order.
//! 2. Sampling the binding table, scheduling and cancelling the bound commands.
//! 3. Executing every active command in registration order, ending those which have finished.
//! 4. Scheduling the default command of every subsystem nobody is claiming.
//!
//! While the robot is disabled [`Scheduler::tick_disabled`] runs only the first two steps, and
//! bindings are sampled without scheduling anything.
//!
//! Each subsystem can be claimed by at most one active command. Scheduling a command interrupts
//! whichever commands currently hold its requirements before the new command is initialised.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod trigger;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Duration;

use comms_if::eqpt::motor::MotorError;

use crate::cmd::{Command, Cycle, Requirements, SubsystemId};
use trigger::BindAction;
pub use trigger::{BindMode, Binding, CommandFactory, Edge, Trigger};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A collection of actuators which commands claim as a unit.
pub trait Subsystem {
    fn id(&self) -> SubsystemId;

    /// Called on every cycle, whatever command holds the subsystem.
    fn periodic(&mut self) {}
}

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared handle to a subsystem.
///
/// Subsystems are shared between the scheduler, which runs their periodic processing, and the
/// commands which drive them. Everything runs on the control thread so a `RefCell` is enough.
pub type SubsystemRef<S> = Rc<RefCell<S>>;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Handle to a command registered with the scheduler.
///
/// Handles are allocated in increasing order, which is also the execution order of active
/// commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandHandle(pub(crate) u64);

/// The command scheduler.
pub struct Scheduler {
    period: Duration,
    num_cycles: u64,

    subsystems: Vec<(SubsystemId, Rc<RefCell<dyn Subsystem>>)>,
    defaults: BTreeMap<SubsystemId, CommandHandle>,

    commands: BTreeMap<CommandHandle, CommandSlot>,
    next_handle: u64,

    active: BTreeSet<CommandHandle>,
    claims: BTreeMap<SubsystemId, CommandHandle>,

    bindings: Vec<Binding>,
}

struct CommandSlot {
    cmd: Box<dyn Command>,
    reqs: Requirements,

    /// Persistent commands stay registered after they end so they can be scheduled again.
    persistent: bool,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors from misusing the scheduler.
///
/// A rejected request never changes which commands are active.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchedError {
    #[error("No command is registered with handle {0:?}")]
    UnknownCommand(CommandHandle),

    #[error("Command \"{0}\" requires {1:?}, which is not a registered subsystem")]
    UnknownSubsystem(String, SubsystemId),

    #[error("Subsystem {0:?} is already registered")]
    DuplicateSubsystem(SubsystemId),

    #[error("Default command \"{0}\" does not require its subsystem {1:?}")]
    DefaultNotRequiring(String, SubsystemId),
}

/// Errors raised while constructing a subsystem.
#[derive(Debug, thiserror::Error)]
pub enum SubsystemInitError {
    #[error("Could not configure the {0:?} subsystem: {1}")]
    MotorConfig(SubsystemId, MotorError),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Scheduler {
    /// Create a new scheduler which will be ticked every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            num_cycles: 0,
            subsystems: Vec::new(),
            defaults: BTreeMap::new(),
            commands: BTreeMap::new(),
            next_handle: 0,
            active: BTreeSet::new(),
            claims: BTreeMap::new(),
            bindings: Vec::new(),
        }
    }

    /// Number of cycles executed so far.
    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    /// Register a subsystem, so that commands may require it and its periodic processing runs.
    pub fn register_subsystem<S>(&mut self, subsystem: SubsystemRef<S>) -> Result<(), SchedError>
    where
        S: Subsystem + 'static,
    {
        let id = subsystem.borrow().id();
        if self.has_subsystem(id) {
            return Err(SchedError::DuplicateSubsystem(id));
        }

        let subsystem: Rc<RefCell<dyn Subsystem>> = subsystem;
        debug!("Subsystem {:?} registered", id);
        self.subsystems.push((id, subsystem));
        Ok(())
    }

    /// Register a command without scheduling it.
    ///
    /// Registered commands stay with the scheduler after they end and can be scheduled again with
    /// [`Scheduler::schedule_handle`].
    pub fn register(&mut self, cmd: Box<dyn Command>) -> CommandHandle {
        self.insert(cmd, true)
    }

    /// Set the command which runs on a subsystem whenever no other command claims it.
    ///
    /// Any previous default is cancelled and forgotten. If the subsystem is currently unclaimed
    /// the new default starts immediately.
    pub fn set_default_command(
        &mut self,
        id: SubsystemId,
        cmd: Box<dyn Command>,
    ) -> Result<CommandHandle, SchedError> {
        let reqs = cmd.requirements();
        if !reqs.contains(&id) {
            return Err(SchedError::DefaultNotRequiring(cmd.name().to_string(), id));
        }
        self.check_requirements(cmd.name(), &reqs)?;

        if let Some(old) = self.defaults.remove(&id) {
            self.cancel(old);
            self.commands.remove(&old);
        }

        let handle = self.insert(cmd, true);
        self.defaults.insert(id, handle);

        if !self.claims.contains_key(&id) {
            self.schedule_handle(handle)?;
        }

        Ok(handle)
    }

    /// Register a single-use command and schedule it.
    ///
    /// The command is forgotten once it ends.
    pub fn schedule(&mut self, cmd: Box<dyn Command>) -> Result<CommandHandle, SchedError> {
        self.check_requirements(cmd.name(), &cmd.requirements())?;

        let handle = self.insert(cmd, false);
        self.schedule_handle(handle)?;

        Ok(handle)
    }

    /// Schedule a registered command.
    ///
    /// Every active command holding one of its requirements is ended (interrupted) first. If the
    /// command is already active this does nothing.
    pub fn schedule_handle(&mut self, handle: CommandHandle) -> Result<(), SchedError> {
        let reqs = match self.commands.get(&handle) {
            Some(slot) => {
                self.check_requirements(slot.cmd.name(), &slot.reqs)?;
                slot.reqs.clone()
            }
            None => return Err(SchedError::UnknownCommand(handle)),
        };

        if self.active.contains(&handle) {
            return Ok(());
        }

        let holders: BTreeSet<CommandHandle> = reqs
            .iter()
            .filter_map(|r| self.claims.get(r).copied())
            .collect();

        for holder in holders {
            self.end_command(holder, true);
        }

        for r in reqs {
            self.claims.insert(r, handle);
        }
        self.active.insert(handle);

        if let Some(slot) = self.commands.get_mut(&handle) {
            debug!("Scheduling \"{}\"", slot.cmd.name());
            slot.cmd.init();
        }

        Ok(())
    }

    /// End an active command, interrupted. Returns false if the command wasn't active.
    pub fn cancel(&mut self, handle: CommandHandle) -> bool {
        if self.active.contains(&handle) {
            self.end_command(handle, true);
            true
        }
        else {
            false
        }
    }

    /// End every active command, interrupted.
    pub fn cancel_all(&mut self) {
        let active: Vec<CommandHandle> = self.active.iter().copied().collect();
        for handle in active {
            self.end_command(handle, true);
        }
    }

    pub fn is_scheduled(&self, handle: CommandHandle) -> bool {
        self.active.contains(&handle)
    }

    /// The command currently claiming a subsystem.
    pub fn holder_of(&self, id: SubsystemId) -> Option<CommandHandle> {
        self.claims.get(&id).copied()
    }

    pub fn default_of(&self, id: SubsystemId) -> Option<CommandHandle> {
        self.defaults.get(&id).copied()
    }

    /// Append a binding to the binding table. Bindings are sampled in the order they were added.
    pub fn add_binding(&mut self, binding: Binding) {
        debug!(
            "Binding {:?} on trigger \"{}\"",
            binding.mode,
            binding.trigger.name()
        );
        self.bindings.push(binding);
    }

    /// Run one cycle.
    pub fn tick(&mut self) {
        let cycle = Cycle {
            num: self.num_cycles,
            period: self.period,
        };

        self.run_periodic();
        self.poll_bindings(true);

        let active: Vec<CommandHandle> = self.active.iter().copied().collect();
        for handle in active {
            if !self.active.contains(&handle) {
                continue;
            }

            let finished = match self.commands.get_mut(&handle) {
                Some(slot) => {
                    slot.cmd.execute(&cycle);
                    slot.cmd.is_finished()
                }
                None => continue,
            };

            if finished {
                self.end_command(handle, false);
            }
        }

        self.schedule_defaults();

        self.num_cycles += 1;
    }

    /// Run one cycle with commands disabled.
    ///
    /// Periodic processing runs and the bindings are sampled, so triggers keep following their
    /// inputs, but no command is scheduled or executed.
    pub fn tick_disabled(&mut self) {
        self.run_periodic();
        self.poll_bindings(false);

        self.num_cycles += 1;
    }

    fn run_periodic(&mut self) {
        for (_, subsystem) in self.subsystems.iter() {
            subsystem.borrow_mut().periodic();
        }
    }

    fn insert(&mut self, cmd: Box<dyn Command>, persistent: bool) -> CommandHandle {
        let handle = CommandHandle(self.next_handle);
        self.next_handle += 1;

        let reqs = cmd.requirements();
        self.commands.insert(
            handle,
            CommandSlot {
                cmd,
                reqs,
                persistent,
            },
        );

        handle
    }

    fn has_subsystem(&self, id: SubsystemId) -> bool {
        self.subsystems.iter().any(|(s, _)| *s == id)
    }

    fn check_requirements(&self, name: &str, reqs: &Requirements) -> Result<(), SchedError> {
        match reqs.iter().find(|r| !self.has_subsystem(**r)) {
            Some(r) => {
                warn!("Rejected \"{}\", unknown subsystem {:?}", name, r);
                Err(SchedError::UnknownSubsystem(name.to_string(), *r))
            }
            None => Ok(()),
        }
    }

    fn end_command(&mut self, handle: CommandHandle, interrupted: bool) {
        if !self.active.remove(&handle) {
            return;
        }

        self.claims.retain(|_, h| *h != handle);

        let persistent = match self.commands.get_mut(&handle) {
            Some(slot) => {
                if interrupted {
                    debug!("Interrupting \"{}\"", slot.cmd.name());
                }
                else {
                    debug!("\"{}\" finished", slot.cmd.name());
                }
                slot.cmd.end(interrupted);
                slot.persistent
            }
            None => true,
        };

        if !persistent {
            self.commands.remove(&handle);
        }
    }

    fn poll_bindings(&mut self, enabled: bool) {
        for i in 0..self.bindings.len() {
            let active = self.bindings[i]
                .active
                .filter(|h| self.active.contains(h));

            match self.bindings[i].poll(active) {
                BindAction::None => (),
                BindAction::Cancel(handle) => {
                    self.cancel(handle);
                    self.bindings[i].active = None;
                }
                BindAction::Schedule if !enabled => debug!(
                    "Ignoring \"{}\" while disabled",
                    self.bindings[i].trigger.name()
                ),
                BindAction::Schedule => {
                    let result = (self.bindings[i].factory)()
                        .map_err(|e| e.to_string())
                        .and_then(|cmd| self.schedule(cmd).map_err(|e| e.to_string()));

                    match result {
                        Ok(handle) => self.bindings[i].active = Some(handle),
                        Err(e) => warn!(
                            "Could not schedule the command bound to \"{}\": {}",
                            self.bindings[i].trigger.name(),
                            e
                        ),
                    }
                }
            }
        }
    }

    fn schedule_defaults(&mut self) {
        let pending: Vec<CommandHandle> = self
            .subsystems
            .iter()
            .filter(|(id, _)| !self.claims.contains_key(id))
            .filter_map(|(id, _)| self.defaults.get(id).copied())
            .collect();

        for handle in pending {
            // A default needing several subsystems may have been started by an earlier one
            if let Err(e) = self.schedule_handle(handle) {
                warn!("Could not schedule default command: {}", e);
            }
        }
    }
}
