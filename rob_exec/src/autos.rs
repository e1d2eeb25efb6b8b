//! # Autonomous programs

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::cmd::{Command, CommandExt};
use crate::constants::auto::*;
use crate::drive::{self, Drivetrain};
use crate::fuel::{launch_sequence, FuelSystem, LaunchPower};
use crate::sched::SubsystemRef;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the autonomous program.
///
/// Drives forward off the starting line, stops, then spins up and launches for the rest of the
/// period. The rollers are stopped when the launch ends or the program is interrupted.
pub fn build_autonomous_program(
    drive: &SubsystemRef<Drivetrain>,
    fuel: &SubsystemRef<FuelSystem>,
) -> Box<dyn Command> {
    drive::drive_arcade(drive, || DRIVE_SPEED, || 0.0)
        .with_timeout(DRIVE_DURATION)
        .and_then(drive::stop_command(drive))
        .and_then(launch_sequence(fuel, LaunchPower::Full, Some(LAUNCH_DURATION)))
        .boxed()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::sched::CYCLE_PERIOD;
    use crate::drive::DRIVE_ID;
    use crate::fuel::FUEL_ID;
    use crate::robot::test::sim_robot_parts;
    use crate::sched::Scheduler;

    #[test]
    fn test_autonomous_timeline() {
        let parts = sim_robot_parts();
        let mut sched = Scheduler::new(CYCLE_PERIOD);
        sched.register_subsystem(parts.drive.clone()).unwrap();
        sched.register_subsystem(parts.fuel.clone()).unwrap();

        let h = sched
            .schedule(build_autonomous_program(&parts.drive, &parts.fuel))
            .unwrap();
        assert_eq!(sched.holder_of(DRIVE_ID), Some(h));
        assert_eq!(sched.holder_of(FUEL_ID), Some(h));

        // Drive for 13 cycles, the first to reach 0.25 s
        sched.tick();
        assert_eq!(parts.left_leader.borrow().output(), Some(DRIVE_SPEED));
        for _ in 1..13 {
            sched.tick();
        }
        assert_eq!(parts.left_leader.borrow().output(), Some(0.0));

        // The stop finishes on the next cycle, spin up starts on the one after
        sched.tick();
        assert_eq!(parts.feeder.borrow().voltage(), None);
        sched.tick();
        assert_eq!(parts.feeder.borrow().voltage(), Some(-10.0));

        // 50 cycles of spin up, 450 of launching
        for _ in 0..50 {
            sched.tick();
        }
        assert_eq!(parts.feeder.borrow().voltage(), Some(11.0));
        for _ in 0..449 {
            sched.tick();
        }
        assert!(!sched.is_scheduled(h));
        assert_eq!(parts.feeder.borrow().output(), Some(0.0));
        assert_eq!(parts.launcher.borrow().output(), Some(0.0));
    }
}
