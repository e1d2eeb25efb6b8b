//! # Robot
//!
//! The [`Robot`] owns the scheduler and the subsystems, wires up the operator controls and runs
//! the autonomous program when the robot is put into autonomous mode.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{error, info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use comms_if::{
    eqpt::{input::InputSource, motor::MotorActuator},
    tunable::TunableStore,
};

use crate::autos::build_autonomous_program;
use crate::constants;
use crate::controls::bind_operator_controls;
use crate::drive::{DriveStatusReport, Drivetrain, FollowSign, MotorGroup, DRIVE_ID};
use crate::fuel::{FuelStatusReport, FuelSystem};
use crate::sched::{CommandHandle, SchedError, Scheduler, SubsystemInitError, SubsystemRef};
use crate::sim_eqpt::SimMotor;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Every motor controller on the robot.
pub struct RobotEqpt {
    pub left_leader: Box<dyn MotorActuator>,
    pub left_follower: Box<dyn MotorActuator>,
    pub right_leader: Box<dyn MotorActuator>,
    pub right_follower: Box<dyn MotorActuator>,
    pub feeder: Box<dyn MotorActuator>,
    pub launcher: Box<dyn MotorActuator>,
}

pub struct Robot {
    sched: Scheduler,
    drive: SubsystemRef<Drivetrain>,
    fuel: SubsystemRef<FuelSystem>,
    mode: RobotMode,
    auto_handle: Option<CommandHandle>,
}

/// Status of the whole robot, logged periodically by the executable.
#[derive(Debug, Clone, Serialize)]
pub struct RobotStatusReport {
    pub mode: RobotMode,
    pub num_cycles: u64,
    pub drive: DriveStatusReport,
    pub fuel: FuelStatusReport,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Operating mode of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RobotMode {
    /// Nothing runs and every actuator is stopped.
    Disabled,

    /// The autonomous program runs, operator controls stay bound.
    Autonomous,

    /// The operator is in control.
    Teleop,
}

#[derive(Debug, thiserror::Error)]
pub enum RobotInitError {
    #[error("Failed to initialise a subsystem: {0}")]
    SubsystemInitError(#[from] SubsystemInitError),

    #[error("Failed to set up the scheduler: {0}")]
    SchedError(#[from] SchedError),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl RobotEqpt {
    /// Simulated motor controllers with the robot's bus IDs.
    pub fn simulated() -> Self {
        use constants::{drive, fuel};

        let sim = |id| -> Box<dyn MotorActuator> { Box::new(SimMotor::new(id)) };

        Self {
            left_leader: sim(drive::LEFT_LEADER_ID),
            left_follower: sim(drive::LEFT_FOLLOWER_ID),
            right_leader: sim(drive::RIGHT_LEADER_ID),
            right_follower: sim(drive::RIGHT_FOLLOWER_ID),
            feeder: sim(fuel::FEEDER_ID),
            launcher: sim(fuel::LAUNCHER_ID),
        }
    }
}

impl Robot {
    /// Build the robot, starting in [`RobotMode::Disabled`].
    pub fn new(
        eqpt: RobotEqpt,
        tunables: Rc<dyn TunableStore>,
        input: Rc<dyn InputSource>,
        cycle_period: Duration,
    ) -> Result<Self, RobotInitError> {
        let left = MotorGroup::new(eqpt.left_leader)
            .with_follower(eqpt.left_follower, FollowSign::Same);
        let right = MotorGroup::new(eqpt.right_leader)
            .with_follower(eqpt.right_follower, FollowSign::Same);

        let drive = Rc::new(RefCell::new(Drivetrain::new(left, right, tunables.clone())?));
        let fuel = Rc::new(RefCell::new(FuelSystem::new(
            eqpt.feeder,
            eqpt.launcher,
            tunables,
        )?));

        let mut sched = Scheduler::new(cycle_period);
        sched.register_subsystem(drive.clone())?;
        sched.register_subsystem(fuel.clone())?;

        bind_operator_controls(&mut sched, input, &drive, &fuel)?;

        let mut robot = Self {
            sched,
            drive,
            fuel,
            mode: RobotMode::Disabled,
            auto_handle: None,
        };
        robot.make_safe();

        info!("Robot initialised");

        Ok(robot)
    }

    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    /// Change the robot's mode.
    ///
    /// Entering autonomous cancels everything and schedules a fresh autonomous program. Entering
    /// teleop cancels the autonomous program. Entering disabled cancels everything and stops
    /// every actuator.
    pub fn set_mode(&mut self, mode: RobotMode) {
        if mode == self.mode {
            return;
        }

        info!("Robot mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;

        match mode {
            RobotMode::Disabled => self.make_safe(),
            RobotMode::Autonomous => {
                self.sched.cancel_all();
                let program = build_autonomous_program(&self.drive, &self.fuel);
                match self.sched.schedule(program) {
                    Ok(h) => self.auto_handle = Some(h),
                    Err(e) => error!("Could not schedule the autonomous program: {}", e),
                }
            }
            RobotMode::Teleop => {
                if let Some(h) = self.auto_handle.take() {
                    self.sched.cancel(h);
                }
            }
        }

        // Start the drive default now rather than at the end of the next cycle
        if mode != RobotMode::Disabled && self.sched.holder_of(DRIVE_ID).is_none() {
            if let Some(h) = self.sched.default_of(DRIVE_ID) {
                if let Err(e) = self.sched.schedule_handle(h) {
                    warn!("Could not start the drive default command: {}", e);
                }
            }
        }
    }

    /// Run one cycle.
    ///
    /// While disabled only subsystem periodic processing and trigger sampling run.
    pub fn tick(&mut self) {
        match self.mode {
            RobotMode::Disabled => self.sched.tick_disabled(),
            RobotMode::Autonomous | RobotMode::Teleop => self.sched.tick(),
        }
    }

    /// Cancel every command and stop every actuator.
    fn make_safe(&mut self) {
        self.sched.cancel_all();
        self.auto_handle = None;
        self.drive.borrow_mut().stop();
        self.fuel.borrow_mut().stop();
    }

    /// True while the autonomous program is running.
    pub fn auto_running(&self) -> bool {
        match self.auto_handle {
            Some(h) => self.sched.is_scheduled(h),
            None => false,
        }
    }

    pub fn report(&self) -> RobotStatusReport {
        RobotStatusReport {
            mode: self.mode,
            num_cycles: self.sched.num_cycles(),
            drive: self.drive.borrow().report(),
            fuel: self.fuel.borrow().report(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::constants::sched::CYCLE_PERIOD;
    use crate::op_input::OpInput;
    use crate::sim_eqpt::SimMotorProbe;
    use comms_if::eqpt::input::{ButtonId, InputFrame};
    use comms_if::tunable::MemTunableStore;

    /// Simulated subsystems with probes on the motors tests look at.
    pub(crate) struct SimParts {
        pub drive: SubsystemRef<Drivetrain>,
        pub fuel: SubsystemRef<FuelSystem>,
        pub left_leader: SimMotorProbe,
        pub feeder: SimMotorProbe,
        pub launcher: SimMotorProbe,
    }

    pub(crate) fn sim_robot_parts() -> SimParts {
        use constants::{drive, fuel};

        let left_leader = SimMotor::new(drive::LEFT_LEADER_ID);
        let feeder = SimMotor::new(fuel::FEEDER_ID);
        let launcher = SimMotor::new(fuel::LAUNCHER_ID);
        let (left_probe, feeder_probe, launcher_probe) =
            (left_leader.probe(), feeder.probe(), launcher.probe());

        let tunables: Rc<dyn TunableStore> = Rc::new(MemTunableStore::new());
        let drive = Drivetrain::new(
            MotorGroup::new(Box::new(left_leader)).with_follower(
                Box::new(SimMotor::new(drive::LEFT_FOLLOWER_ID)),
                FollowSign::Same,
            ),
            MotorGroup::new(Box::new(SimMotor::new(drive::RIGHT_LEADER_ID))),
            tunables.clone(),
        )
        .unwrap();
        let fuel = FuelSystem::new(Box::new(feeder), Box::new(launcher), tunables).unwrap();

        SimParts {
            drive: Rc::new(RefCell::new(drive)),
            fuel: Rc::new(RefCell::new(fuel)),
            left_leader: left_probe,
            feeder: feeder_probe,
            launcher: launcher_probe,
        }
    }

    fn sim_robot() -> (Robot, Rc<OpInput>) {
        let input = Rc::new(OpInput::new());
        let robot = Robot::new(
            RobotEqpt::simulated(),
            Rc::new(MemTunableStore::new()),
            input.clone(),
            CYCLE_PERIOD,
        )
        .unwrap();
        (robot, input)
    }

    #[test]
    fn test_starts_disabled() {
        let (mut robot, input) = sim_robot();
        assert_eq!(robot.mode(), RobotMode::Disabled);

        let mut frame = InputFrame::default();
        frame.buttons.insert(ButtonId::L1);
        input.set_frame(frame);

        robot.tick();
        assert_eq!(robot.report().num_cycles, 1);
        assert_eq!(robot.report().fuel.op, None);
    }

    #[test]
    fn test_telemetry_published_while_disabled() {
        let input = Rc::new(OpInput::new());
        let store = Rc::new(MemTunableStore::new());
        let mut robot =
            Robot::new(RobotEqpt::simulated(), store.clone(), input, CYCLE_PERIOD).unwrap();

        robot.tick();

        let published = store.snapshot();
        assert_eq!(published.get(constants::drive::LEFT_OUTPUT_KEY), Some(&0.0));
        assert_eq!(published.get(constants::drive::RIGHT_OUTPUT_KEY), Some(&0.0));
    }

    #[test]
    fn test_mode_changes() {
        let (mut robot, input) = sim_robot();

        robot.set_mode(RobotMode::Autonomous);
        assert!(robot.auto_running());
        robot.tick();
        assert_eq!(robot.report().drive.left_output, constants::auto::DRIVE_SPEED);

        // Teleop cancels the program and hands the drivetrain back to the operator
        robot.set_mode(RobotMode::Teleop);
        assert!(!robot.auto_running());

        let mut frame = InputFrame::default();
        frame.buttons.insert(ButtonId::R1);
        input.set_frame(frame);
        robot.tick();
        assert_eq!(robot.report().drive.left_output, 0.0);
        assert_eq!(robot.report().fuel.op, Some(crate::fuel::FuelOp::SpinUp));

        robot.set_mode(RobotMode::Disabled);
        assert_eq!(robot.report().fuel.op, None);
        assert_eq!(robot.report().num_cycles, 2);
    }

    #[test]
    fn test_rejected_motor_config() {
        let mut eqpt = RobotEqpt::simulated();
        eqpt.launcher = Box::new(SimMotor::new(constants::fuel::LAUNCHER_ID).rejecting_config());

        let result = Robot::new(
            eqpt,
            Rc::new(MemTunableStore::new()),
            Rc::new(OpInput::new()),
            CYCLE_PERIOD,
        );
        assert!(matches!(result, Err(RobotInitError::SubsystemInitError(_))));
    }
}
