//! # Drivetrain subsystem
//!
//! The drivetrain is a differential drive, each side being a group of motors with one leader and
//! any number of followers mirroring it. Speeds are given as arcade forward and rotation inputs
//! which are mixed into side demands by [`calc_arcade`].
//!
//! The left side is electrically inverted at construction, so a positive demand drives both sides
//! forward.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_arcade;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, trace};
use serde::Serialize;
use std::rc::Rc;

use comms_if::{
    eqpt::motor::{MotorActuator, MotorError, NeutralMode},
    tunable::TunableStore,
};

use crate::cmd::{FnCommand, SubsystemId};
use crate::constants::drive::*;
use crate::sched::{Subsystem, SubsystemInitError, SubsystemRef};
pub use calc_arcade::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const DRIVE_ID: SubsystemId = SubsystemId("drive");

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A leader motor and the followers mirroring its output.
pub struct MotorGroup {
    leader: Box<dyn MotorActuator>,
    followers: Vec<(Box<dyn MotorActuator>, FollowSign)>,
}

/// The drivetrain subsystem.
pub struct Drivetrain {
    left: MotorGroup,
    right: MotorGroup,
    params: ArcadeParams,
    tunables: Rc<dyn TunableStore>,
    last_output: ArcadeOutput,
}

/// Status of the drivetrain after the last demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DriveStatusReport {
    pub left_output: f64,
    pub right_output: f64,
    pub left_limited: bool,
    pub right_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// How a follower's direction relates to its leader's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowSign {
    /// Turns the same way as the leader, including the leader's inversion.
    Same,

    /// Turns the opposite way to the leader.
    Opposed,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl MotorGroup {
    pub fn new(leader: Box<dyn MotorActuator>) -> Self {
        Self {
            leader,
            followers: Vec::new(),
        }
    }

    pub fn with_follower(mut self, follower: Box<dyn MotorActuator>, sign: FollowSign) -> Self {
        self.followers.push((follower, sign));
        self
    }

    /// Configure every motor in the group.
    ///
    /// Followers are inverted relative to `inverted` according to their [`FollowSign`].
    pub fn configure(
        &mut self,
        current_limit_a: u32,
        neutral_mode: NeutralMode,
        inverted: bool,
    ) -> Result<(), MotorError> {
        configure_motor(self.leader.as_mut(), current_limit_a, neutral_mode, inverted)?;

        for (follower, sign) in self.followers.iter_mut() {
            let follower_inverted = match sign {
                FollowSign::Same => inverted,
                FollowSign::Opposed => !inverted,
            };
            configure_motor(follower.as_mut(), current_limit_a, neutral_mode, follower_inverted)?;
        }

        Ok(())
    }

    /// Demand a duty cycle from the leader, followers mirror it.
    pub fn set_output(&mut self, duty: f64) {
        self.leader.set_output(duty);
        for (follower, _) in self.followers.iter_mut() {
            follower.set_output(duty);
        }
    }
}

impl Drivetrain {
    /// Create and configure the drivetrain.
    ///
    /// Every motor is put in coast with the drive current limit, and the left group is inverted.
    pub fn new(
        mut left: MotorGroup,
        mut right: MotorGroup,
        tunables: Rc<dyn TunableStore>,
    ) -> Result<Self, SubsystemInitError> {
        left
            .configure(MOTOR_CURRENT_LIMIT_A, NeutralMode::Coast, true)
            .map_err(|e| SubsystemInitError::MotorConfig(DRIVE_ID, e))?;
        right
            .configure(MOTOR_CURRENT_LIMIT_A, NeutralMode::Coast, false)
            .map_err(|e| SubsystemInitError::MotorConfig(DRIVE_ID, e))?;

        info!("Drivetrain initialised");

        Ok(Self {
            left,
            right,
            params: ArcadeParams {
                deadzone: DEADZONE,
                right_side_scaling: RIGHT_SIDE_SCALING,
            },
            tunables,
            last_output: ArcadeOutput::default(),
        })
    }

    /// Drive with arcade speeds, both in [-1, 1].
    pub fn arcade_drive(&mut self, forward: f64, rotation: f64) -> ArcadeOutput {
        let output = calc_arcade(forward, rotation, &self.params);
        trace!(
            "Arcade ({:.3}, {:.3}) -> left {:.3}, right {:.3}",
            forward,
            rotation,
            output.left,
            output.right
        );

        self.left.set_output(output.left);
        self.right.set_output(output.right);
        self.last_output = output;

        output
    }

    /// Put both sides in neutral.
    pub fn stop(&mut self) {
        self.arcade_drive(0.0, 0.0);
    }

    pub fn report(&self) -> DriveStatusReport {
        DriveStatusReport {
            left_output: self.last_output.left,
            right_output: self.last_output.right,
            left_limited: self.last_output.left_limited,
            right_limited: self.last_output.right_limited,
        }
    }
}

impl Subsystem for Drivetrain {
    fn id(&self) -> SubsystemId {
        DRIVE_ID
    }

    fn periodic(&mut self) {
        self.tunables.put_number(LEFT_OUTPUT_KEY, self.last_output.left);
        self.tunables.put_number(RIGHT_OUTPUT_KEY, self.last_output.right);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Command driving with the speeds returned by `forward` and `rotation`, sampled every cycle.
///
/// The command never finishes on its own.
pub fn drive_arcade<F, R>(drive: &SubsystemRef<Drivetrain>, forward: F, rotation: R) -> FnCommand
where
    F: Fn() -> f64 + 'static,
    R: Fn() -> f64 + 'static,
{
    let drive = drive.clone();
    FnCommand::run("drive_arcade", &[DRIVE_ID], move || {
        drive.borrow_mut().arcade_drive(forward(), rotation());
    })
}

/// Command putting the drivetrain in neutral, finishing straight away.
pub fn stop_command(drive: &SubsystemRef<Drivetrain>) -> FnCommand {
    let drive = drive.clone();
    FnCommand::run_once("drive_stop", &[DRIVE_ID], move || drive.borrow_mut().stop())
}

fn configure_motor(
    motor: &mut dyn MotorActuator,
    current_limit_a: u32,
    neutral_mode: NeutralMode,
    inverted: bool,
) -> Result<(), MotorError> {
    motor.configure_current_limit(current_limit_a)?;
    motor.configure_neutral_mode(neutral_mode)?;
    motor.configure_inversion(inverted)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cmd::Command;
    use crate::sim_eqpt::{SimMotor, SimMotorProbe};
    use comms_if::eqpt::motor::MotorId;
    use comms_if::tunable::MemTunableStore;
    use std::cell::RefCell;

    struct Probes {
        left_leader: SimMotorProbe,
        left_follower: SimMotorProbe,
        right_leader: SimMotorProbe,
        right_follower: SimMotorProbe,
    }

    fn sim_drive(store: Rc<MemTunableStore>) -> (Drivetrain, Probes) {
        let ids = [LEFT_LEADER_ID, LEFT_FOLLOWER_ID, RIGHT_LEADER_ID, RIGHT_FOLLOWER_ID];
        let motors: Vec<SimMotor> = ids
            .iter()
            .map(|id| SimMotor::new(*id))
            .collect();
        let probes = Probes {
            left_leader: motors[0].probe(),
            left_follower: motors[1].probe(),
            right_leader: motors[2].probe(),
            right_follower: motors[3].probe(),
        };

        let mut motors = motors.into_iter();
        let mut next = || -> Box<dyn MotorActuator> { Box::new(motors.next().unwrap()) };
        let left = MotorGroup::new(next()).with_follower(next(), FollowSign::Same);
        let right = MotorGroup::new(next()).with_follower(next(), FollowSign::Same);

        (Drivetrain::new(left, right, store).unwrap(), probes)
    }

    #[test]
    fn test_configuration() {
        let (_, probes) = sim_drive(Rc::new(MemTunableStore::new()));

        assert!(probes.left_leader.borrow().inverted);
        assert!(probes.left_follower.borrow().inverted);
        assert!(!probes.right_leader.borrow().inverted);
        assert!(!probes.right_follower.borrow().inverted);

        for p in [&probes.left_leader, &probes.right_follower].iter() {
            assert_eq!(p.borrow().neutral_mode, Some(NeutralMode::Coast));
            assert_eq!(p.borrow().current_limit_a, Some(MOTOR_CURRENT_LIMIT_A));
        }
    }

    #[test]
    fn test_rejected_config_is_fatal() {
        let left = MotorGroup::new(Box::new(SimMotor::new(MotorId(21)).rejecting_config()));
        let right = MotorGroup::new(Box::new(SimMotor::new(MotorId(22))));

        assert!(matches!(
            Drivetrain::new(left, right, Rc::new(MemTunableStore::new())),
            Err(SubsystemInitError::MotorConfig(DRIVE_ID, MotorError::ConfigRejected(..)))
        ));
    }

    #[test]
    fn test_followers_mirror_leaders() {
        let (mut drive, probes) = sim_drive(Rc::new(MemTunableStore::new()));

        drive.arcade_drive(0.5, 0.0);

        assert_eq!(probes.left_leader.borrow().output(), Some(0.5));
        assert_eq!(probes.left_follower.borrow().output(), Some(0.5));
        assert_eq!(
            probes.right_leader.borrow().output(),
            probes.right_follower.borrow().output()
        );
        assert!(drive.report().right_output < 0.5);
    }

    #[test]
    fn test_opposed_follower() {
        let follower = SimMotor::new(MotorId(2));
        let probe = follower.probe();
        let mut group = MotorGroup::new(Box::new(SimMotor::new(MotorId(1))))
            .with_follower(Box::new(follower), FollowSign::Opposed);

        group.configure(40, NeutralMode::Brake, true).unwrap();
        assert!(!probe.borrow().inverted);
    }

    #[test]
    fn test_commands_and_telemetry() {
        let store = Rc::new(MemTunableStore::new());
        let (drive, probes) = sim_drive(store.clone());
        let drive = Rc::new(RefCell::new(drive));

        let mut cmd = drive_arcade(&drive, || 0.4, || 0.0);
        cmd.init();
        cmd.execute(&crate::cmd::Cycle {
            num: 0,
            period: crate::constants::sched::CYCLE_PERIOD,
        });
        assert!(!cmd.is_finished());
        assert_eq!(probes.left_leader.borrow().output(), Some(0.4));

        drive.borrow_mut().periodic();
        assert_eq!(store.get_number(LEFT_OUTPUT_KEY, f64::NAN), 0.4);

        let mut stop = stop_command(&drive);
        stop.init();
        assert!(stop.is_finished());
        assert_eq!(probes.left_leader.borrow().output(), Some(0.0));
        assert_eq!(probes.right_leader.borrow().output(), Some(0.0));
    }
}
