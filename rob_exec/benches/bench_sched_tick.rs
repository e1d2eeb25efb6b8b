//! # Scheduler Tick Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use std::rc::Rc;

use comms_if::{
    eqpt::input::{AxisId, ButtonId, InputFrame},
    tunable::MemTunableStore,
};
use rob_lib::{
    constants::sched::CYCLE_PERIOD,
    op_input::OpInput,
    robot::{Robot, RobotEqpt, RobotMode},
};

fn sched_tick_benchmark(c: &mut Criterion) {
    // ---- Build the robot ----

    let op_input = Rc::new(OpInput::new());
    let mut robot = Robot::new(
        RobotEqpt::simulated(),
        Rc::new(MemTunableStore::new()),
        op_input.clone(),
        CYCLE_PERIOD,
    )
    .unwrap();

    robot.set_mode(RobotMode::Teleop);

    // Drive and launch at the same time, so both subsystems are claimed
    let mut frame = InputFrame::default();
    frame.axes.insert(AxisId::LeftY, -0.7);
    frame.axes.insert(AxisId::RightX, 0.3);
    frame.buttons.insert(ButtonId::R1);
    op_input.set_frame(frame);

    // ---- Run benchmark ----

    c.bench_function("teleop tick", |b| b.iter(|| robot.tick()));
}

criterion_group!(benches, sched_tick_benchmark);
criterion_main!(benches);
