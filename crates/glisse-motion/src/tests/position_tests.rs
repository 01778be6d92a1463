use super::*;

use glisse_core::{ManualScheduler, Runtime, RuntimeHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

const FRAME_NANOS: u64 = 16_666_667; // ~60 FPS

fn runtime() -> (Runtime, RuntimeHandle) {
    let runtime = Runtime::new(Arc::new(ManualScheduler));
    let handle = runtime.handle();
    (runtime, handle)
}

fn drain_until_settled(handle: &RuntimeHandle, model: &PositionModel) -> usize {
    let mut frame_time = 0u64;
    let mut frames = 0usize;
    while model.is_animating() {
        frame_time += FRAME_NANOS;
        handle.drain_frame_callbacks(frame_time);
        frames += 1;
        assert!(frames < 600, "transition failed to settle");
    }
    frames
}

#[test]
fn spring_transition_reaches_target_exactly() {
    let (_runtime, handle) = runtime();
    let model = PositionModel::new(1000.0, handle.frame_clock());

    model.animate_to(400.0, MotionProfile::Spring(SpringProfile::settle()));
    assert!(model.is_animating());
    drain_until_settled(&handle, &model);

    assert_eq!(model.value(), 400.0);
    assert_eq!(model.velocity(), 0.0);
}

#[test]
fn settle_callback_fires_once() {
    let (_runtime, handle) = runtime();
    let model = PositionModel::new(0.0, handle.frame_clock());
    let settles = Rc::new(Cell::new(0u32));

    let counter = Rc::clone(&settles);
    model.animate_to_then(250.0, MotionProfile::Spring(SpringProfile::settle()), move || {
        counter.set(counter.get() + 1);
    });
    drain_until_settled(&handle, &model);

    // Extra frames after settling must not re-fire.
    handle.drain_frame_callbacks(10_000_000_000);
    assert_eq!(settles.get(), 1);
}

#[test]
fn immediate_profile_completes_on_the_same_tick() {
    let (runtime, handle) = runtime();
    let model = PositionModel::new(800.0, handle.frame_clock());
    let published = Rc::new(RefCell::new(Vec::new()));
    let settled = Rc::new(Cell::new(false));

    let log = Rc::clone(&published);
    model.set_paint_subscriber(move |offset| log.borrow_mut().push(offset));
    let flag = Rc::clone(&settled);
    model.animate_to_then(0.0, MotionProfile::Immediate, move || flag.set(true));

    // No frame was scheduled and no intermediate offset was published.
    assert!(!runtime.needs_frame());
    assert!(!model.is_animating());
    assert!(settled.get());
    assert_eq!(model.value(), 0.0);
    assert_eq!(*published.borrow(), vec![0.0]);
}

#[test]
fn superseding_transition_drops_the_old_settle_callback() {
    let (_runtime, handle) = runtime();
    let model = PositionModel::new(0.0, handle.frame_clock());
    let first = Rc::new(Cell::new(false));
    let second = Rc::new(Cell::new(false));

    let first_flag = Rc::clone(&first);
    model.animate_to_then(500.0, MotionProfile::Spring(SpringProfile::settle()), move || {
        first_flag.set(true);
    });
    handle.drain_frame_callbacks(FRAME_NANOS);
    handle.drain_frame_callbacks(2 * FRAME_NANOS);

    let second_flag = Rc::clone(&second);
    model.animate_to_then(100.0, MotionProfile::Spring(SpringProfile::settle()), move || {
        second_flag.set(true);
    });
    drain_until_settled(&handle, &model);

    assert!(!first.get(), "superseded settle callback must not fire");
    assert!(second.get());
    assert_eq!(model.value(), 100.0);
}

#[test]
fn set_pins_offset_and_halts_motion() {
    let (_runtime, handle) = runtime();
    let model = PositionModel::new(0.0, handle.frame_clock());

    model.animate_to(600.0, MotionProfile::Spring(SpringProfile::settle()));
    handle.drain_frame_callbacks(FRAME_NANOS);
    handle.drain_frame_callbacks(2 * FRAME_NANOS);
    assert!(model.velocity() != 0.0);

    model.set(42.0);
    assert!(!model.is_animating());
    assert_eq!(model.value(), 42.0);
    assert_eq!(model.velocity(), 0.0);

    // Any leftover frame callbacks are dead.
    handle.drain_frame_callbacks(3 * FRAME_NANOS);
    assert_eq!(model.value(), 42.0);
}

#[test]
fn paint_subscriber_sees_each_integration_step() {
    let (_runtime, handle) = runtime();
    let model = PositionModel::new(0.0, handle.frame_clock());
    let published = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&published);
    model.set_paint_subscriber(move |offset| log.borrow_mut().push(offset));
    model.animate_to(300.0, MotionProfile::Spring(SpringProfile::settle()));
    drain_until_settled(&handle, &model);

    let published = published.borrow();
    assert!(published.len() > 3, "expected several steps, saw {published:?}");
    assert!(published.iter().any(|o| *o > 0.0 && *o < 300.0));
    assert_eq!(*published.last().unwrap(), 300.0);
}

#[test]
fn injected_velocity_carries_into_the_spring() {
    let (_runtime, handle) = runtime();
    let flung = PositionModel::new(500.0, handle.frame_clock());
    let still = PositionModel::new(500.0, handle.frame_clock());

    flung.set_velocity(-3000.0);
    flung.animate_to(0.0, MotionProfile::Spring(SpringProfile::settle()));
    still.animate_to(0.0, MotionProfile::Spring(SpringProfile::settle()));

    handle.drain_frame_callbacks(FRAME_NANOS);
    handle.drain_frame_callbacks(2 * FRAME_NANOS);

    assert!(
        flung.value() < still.value(),
        "fling {} should outpace standstill {}",
        flung.value(),
        still.value()
    );
}

#[test]
fn animating_to_the_resting_offset_settles_synchronously() {
    let (runtime, handle) = runtime();
    let model = PositionModel::new(150.0, handle.frame_clock());
    let settled = Rc::new(Cell::new(false));

    let flag = Rc::clone(&settled);
    model.animate_to_then(150.0, MotionProfile::Spring(SpringProfile::settle()), move || {
        flag.set(true);
    });

    assert!(settled.get());
    assert!(!runtime.needs_frame());
}

#[test]
fn settle_callback_may_start_the_next_transition() {
    let (_runtime, handle) = runtime();
    let model = PositionModel::new(0.0, handle.frame_clock());

    let chained = model.clone();
    model.animate_to_then(200.0, MotionProfile::Spring(SpringProfile::settle()), move || {
        chained.animate_to(50.0, MotionProfile::Immediate);
    });
    drain_until_settled(&handle, &model);

    assert_eq!(model.value(), 50.0);
}

#[test]
fn disposed_model_ignores_everything() {
    let (runtime, handle) = runtime();
    let model = PositionModel::new(75.0, handle.frame_clock());
    let settled = Rc::new(Cell::new(false));

    model.dispose();
    model.set(10.0);
    model.set_velocity(500.0);
    let flag = Rc::clone(&settled);
    model.animate_to_then(0.0, MotionProfile::Immediate, move || flag.set(true));
    handle.drain_frame_callbacks(FRAME_NANOS);

    assert_eq!(model.value(), 75.0);
    assert_eq!(model.velocity(), 0.0);
    assert!(!settled.get());
    assert!(!runtime.needs_frame());
}

#[test]
fn dispose_cancels_inflight_transition() {
    let (runtime, handle) = runtime();
    let model = PositionModel::new(0.0, handle.frame_clock());
    let settled = Rc::new(Cell::new(false));

    let flag = Rc::clone(&settled);
    model.animate_to_then(900.0, MotionProfile::Spring(SpringProfile::settle()), move || {
        flag.set(true);
    });
    handle.drain_frame_callbacks(FRAME_NANOS);
    model.dispose();
    handle.drain_frame_callbacks(2 * FRAME_NANOS);
    handle.drain_frame_callbacks(3 * FRAME_NANOS);

    assert!(!settled.get());
    assert!(!runtime.needs_frame());
}
