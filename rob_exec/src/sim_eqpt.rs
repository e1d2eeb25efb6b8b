//! # Simulated equipment
//!
//! Stand-ins for the robot's motor controllers, used by the desktop executable and by tests. A
//! [`SimMotor`] accepts every demand and keeps its state in a [`SimMotorProbe`] which whoever
//! created it can inspect.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use comms_if::eqpt::motor::{MotorActuator, MotorError, MotorId, NeutralMode};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared view of a simulated motor's state.
pub type SimMotorProbe = Rc<RefCell<SimMotorState>>;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A simulated motor controller.
pub struct SimMotor {
    state: SimMotorProbe,
}

/// Everything a simulated motor has been told.
#[derive(Debug, Clone, Serialize)]
pub struct SimMotorState {
    pub id: MotorId,

    pub inverted: bool,

    pub neutral_mode: Option<NeutralMode>,

    /// Units: amps
    pub current_limit_a: Option<u32>,

    /// The most recent demand.
    pub demand: Option<MotorDemand>,

    /// Every demand in order, only kept if recording was enabled.
    pub history: Vec<MotorDemand>,

    record: bool,
    reject_config: bool,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// A demand sent to a motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MotorDemand {
    /// Units: volts
    Voltage(f64),

    /// Duty cycle
    Output(f64),

    Stop,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl SimMotor {
    pub fn new(id: MotorId) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimMotorState {
                id,
                inverted: false,
                neutral_mode: None,
                current_limit_a: None,
                demand: None,
                history: Vec::new(),
                record: false,
                reject_config: false,
            })),
        }
    }

    /// Keep every demand in the probe's history.
    pub fn recording(self) -> Self {
        self.state.borrow_mut().record = true;
        self
    }

    /// Reject every configuration request, as a controller with bad firmware would.
    pub fn rejecting_config(self) -> Self {
        self.state.borrow_mut().reject_config = true;
        self
    }

    pub fn probe(&self) -> SimMotorProbe {
        self.state.clone()
    }

    fn demand(&mut self, demand: MotorDemand) {
        let mut state = self.state.borrow_mut();
        trace!("Sim motor {:?} demand: {:?}", state.id, demand);

        if state.record {
            state.history.push(demand);
        }
        state.demand = Some(demand);
    }

    fn configure<F: FnOnce(&mut SimMotorState)>(&mut self, f: F) -> Result<(), MotorError> {
        let mut state = self.state.borrow_mut();

        if state.reject_config {
            return Err(MotorError::ConfigRejected(
                state.id,
                "simulated rejection".to_string(),
            ));
        }

        f(&mut *state);
        Ok(())
    }
}

impl MotorActuator for SimMotor {
    fn id(&self) -> MotorId {
        self.state.borrow().id
    }

    fn set_voltage(&mut self, volts: f64) {
        self.demand(MotorDemand::Voltage(volts))
    }

    fn set_output(&mut self, duty: f64) {
        self.demand(MotorDemand::Output(duty))
    }

    fn stop(&mut self) {
        self.demand(MotorDemand::Stop)
    }

    fn configure_current_limit(&mut self, amps: u32) -> Result<(), MotorError> {
        self.configure(|s| s.current_limit_a = Some(amps))
    }

    fn configure_neutral_mode(&mut self, mode: NeutralMode) -> Result<(), MotorError> {
        self.configure(|s| s.neutral_mode = Some(mode))
    }

    fn configure_inversion(&mut self, inverted: bool) -> Result<(), MotorError> {
        self.configure(|s| s.inverted = inverted)
    }
}

impl SimMotorState {
    /// The voltage most recently demanded, if the last demand was a voltage.
    pub fn voltage(&self) -> Option<f64> {
        match self.demand {
            Some(MotorDemand::Voltage(v)) => Some(v),
            _ => None,
        }
    }

    /// The duty cycle most recently demanded, if the last demand was a duty cycle.
    pub fn output(&self) -> Option<f64> {
        match self.demand {
            Some(MotorDemand::Output(d)) => Some(d),
            _ => None,
        }
    }
}
