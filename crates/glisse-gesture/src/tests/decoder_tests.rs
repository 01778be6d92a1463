use super::*;

use crate::sample::{Axis, DragTarget, PointerPhase, PointerSample};

fn decoder() -> GestureDecoder {
    GestureDecoder::new(DecoderConfig::new(Axis::Vertical))
}

fn down(id: u64, x: f32, y: f32, t: i64) -> PointerSample {
    PointerSample::new(id, PointerPhase::Start, x, y).with_timestamp(t)
}

fn drag(id: u64, x: f32, y: f32, t: i64) -> PointerSample {
    PointerSample::new(id, PointerPhase::Move, x, y).with_timestamp(t)
}

fn up(id: u64, x: f32, y: f32, t: i64) -> PointerSample {
    PointerSample::new(id, PointerPhase::End, x, y).with_timestamp(t)
}

fn cancel(id: u64, x: f32, y: f32, t: i64) -> PointerSample {
    PointerSample::new(id, PointerPhase::Cancel, x, y).with_timestamp(t)
}

#[test]
fn deltas_start_after_slop_is_absorbed() {
    let mut decoder = decoder();

    let first = decoder.on_sample(&down(1, 0.0, 100.0, 0), 500.0).unwrap();
    assert!(first.is_first && first.is_active);
    assert_eq!(first.start_offset, 500.0);
    assert_eq!(first.delta, 0.0);

    // Below slop: silent.
    assert!(decoder.on_sample(&drag(1, 0.0, 103.0, 10), 500.0).is_none());

    // Crossing slop engages the drag but absorbs the travelled distance.
    let engaged = decoder.on_sample(&drag(1, 0.0, 106.0, 20), 500.0).unwrap();
    assert!(engaged.dragged);
    assert_eq!(engaged.delta, 0.0);
    assert_eq!(engaged.cumulative, 0.0);

    let forward = decoder.on_sample(&drag(1, 0.0, 116.0, 30), 500.0).unwrap();
    assert_eq!(forward.delta, 10.0);
    assert_eq!(forward.cumulative, 10.0);
    assert_eq!(forward.direction, 1);

    let back = decoder.on_sample(&drag(1, 0.0, 111.0, 40), 500.0).unwrap();
    assert_eq!(back.delta, -5.0);
    assert_eq!(back.cumulative, 5.0);
    assert_eq!(back.direction, -1);
}

#[test]
fn session_below_slop_is_a_tap() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 100.0, 0), 500.0).unwrap();
    assert!(decoder.on_sample(&drag(1, 0.0, 102.0, 10), 500.0).is_none());
    assert!(decoder.on_sample(&drag(1, 1.0, 99.0, 20), 500.0).is_none());

    let release = decoder.on_sample(&up(1, 1.0, 99.0, 30), 500.0).unwrap();
    assert!(release.is_last && release.is_tap);
    assert!(!release.dragged);
    assert_eq!(release.cumulative, 0.0);
    assert_eq!(release.velocity, 0.0);
    assert!(!decoder.has_session());
}

#[test]
fn cross_axis_lock_silences_the_whole_session() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 100.0, 0), 500.0).unwrap();
    // Horizontal movement wins the lock on a vertical surface.
    assert!(decoder.on_sample(&drag(1, 20.0, 100.0, 10), 500.0).is_none());
    // Later vertical movement stays suppressed.
    assert!(decoder.on_sample(&drag(1, 40.0, 140.0, 20), 500.0).is_none());

    let release = decoder.on_sample(&up(1, 40.0, 140.0, 30), 500.0).unwrap();
    assert!(release.is_last);
    assert!(!release.dragged && !release.is_tap);
    assert_eq!(release.cumulative, 0.0);
    assert_eq!(release.velocity, 0.0);
}

#[test]
fn excluded_target_session_is_fully_silent() {
    let mut config = DecoderConfig::new(Axis::Vertical);
    config.excluded_targets = Some(Rc::new(|target| {
        matches!(
            target,
            DragTarget::TextInput | DragTarget::Button | DragTarget::Link
        )
    }));
    let mut decoder = GestureDecoder::new(config);

    let field_down = down(1, 0.0, 100.0, 0).with_target(DragTarget::TextInput);
    assert!(decoder.on_sample(&field_down, 500.0).is_none());
    assert!(decoder.on_sample(&drag(1, 0.0, 160.0, 10), 500.0).is_none());
    assert!(decoder.on_sample(&up(1, 0.0, 160.0, 20), 500.0).is_none());
    assert!(!decoder.has_session());

    // The surface itself still drags afterwards.
    assert!(decoder.on_sample(&down(1, 0.0, 100.0, 30), 500.0).is_some());
    assert!(decoder.on_sample(&drag(1, 0.0, 110.0, 40), 500.0).is_some());
}

#[test]
fn session_is_bound_to_the_first_pointer() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 100.0, 0), 500.0).unwrap();
    assert!(decoder.on_sample(&down(2, 50.0, 50.0, 5), 500.0).is_none());
    assert!(decoder.on_sample(&drag(2, 50.0, 300.0, 10), 500.0).is_none());

    // First pointer continues unaffected.
    decoder.on_sample(&drag(1, 0.0, 110.0, 15), 500.0).unwrap();
    let step = decoder.on_sample(&drag(1, 0.0, 120.0, 20), 500.0).unwrap();
    assert_eq!(step.delta, 10.0);

    // Second pointer lifting does not end the session.
    assert!(decoder.on_sample(&up(2, 50.0, 300.0, 25), 500.0).is_none());
    assert!(decoder.has_session());

    let release = decoder.on_sample(&up(1, 0.0, 120.0, 30), 500.0).unwrap();
    assert!(release.is_last && release.dragged);
}

#[test]
fn release_velocity_is_in_units_per_ms() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 0.0, 0), 500.0).unwrap();
    for i in 1..=4 {
        decoder.on_sample(&drag(1, 0.0, (i * 20) as f32, (i * 10) as i64), 500.0);
    }
    let release = decoder.on_sample(&up(1, 0.0, 100.0, 50), 500.0).unwrap();

    // 20 units every 10ms.
    assert!(
        (release.velocity - 2.0).abs() < 0.3,
        "expected ~2 units/ms, got {}",
        release.velocity
    );
    assert_eq!(release.direction, 1);
}

#[test]
fn extreme_release_velocity_is_capped() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 0.0, 0), 500.0).unwrap();
    for i in 1..=3 {
        decoder.on_sample(&drag(1, 0.0, (i * 1000) as f32, (i * 10) as i64), 500.0);
    }
    let release = decoder.on_sample(&up(1, 0.0, 3000.0, 40), 500.0).unwrap();

    assert_eq!(release.velocity, crate::constants::MAX_VELOCITY / 1000.0);
}

#[test]
fn cancel_reports_neither_tap_nor_velocity() {
    let mut decoder = decoder();

    // Cancelled before engaging: not a tap.
    decoder.on_sample(&down(1, 0.0, 100.0, 0), 500.0).unwrap();
    decoder.on_sample(&drag(1, 0.0, 103.0, 10), 500.0);
    let dropped = decoder.on_sample(&cancel(1, 0.0, 103.0, 20), 500.0).unwrap();
    assert!(dropped.is_last && !dropped.is_tap && !dropped.dragged);

    // Cancelled mid-drag: movement stands, velocity does not.
    decoder.on_sample(&down(1, 0.0, 100.0, 30), 500.0).unwrap();
    decoder.on_sample(&drag(1, 0.0, 150.0, 40), 500.0);
    decoder.on_sample(&drag(1, 0.0, 200.0, 50), 500.0);
    let dropped = decoder.on_sample(&cancel(1, 0.0, 200.0, 60), 500.0).unwrap();
    assert!(dropped.dragged);
    assert_eq!(dropped.velocity, 0.0);
}

#[test]
fn anchor_offset_rides_every_frame() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 100.0, 0), 742.0).unwrap();
    decoder.on_sample(&drag(1, 0.0, 110.0, 10), 700.0);
    // Offsets passed after the start are ignored; the anchor stands.
    let step = decoder.on_sample(&drag(1, 0.0, 120.0, 20), 650.0).unwrap();
    assert_eq!(step.start_offset, 742.0);
    let release = decoder.on_sample(&up(1, 0.0, 120.0, 30), 600.0).unwrap();
    assert_eq!(release.start_offset, 742.0);
}

#[test]
fn reset_drops_the_session_silently() {
    let mut decoder = decoder();

    decoder.on_sample(&down(1, 0.0, 100.0, 0), 500.0).unwrap();
    decoder.on_sample(&drag(1, 0.0, 140.0, 10), 500.0);
    decoder.reset();

    assert!(!decoder.has_session());
    assert!(decoder.on_sample(&drag(1, 0.0, 150.0, 20), 500.0).is_none());
    assert!(decoder.on_sample(&up(1, 0.0, 150.0, 30), 500.0).is_none());
}

#[test]
fn unstamped_samples_are_stamped_by_the_decoder() {
    let mut decoder = decoder();

    let start = PointerSample::new(1, PointerPhase::Start, 0.0, 100.0);
    decoder.on_sample(&start, 500.0).unwrap();
    let moved = PointerSample::new(1, PointerPhase::Move, 0.0, 140.0);
    let step = decoder.on_sample(&moved, 500.0).unwrap();
    assert!(step.dragged);
    let release = PointerSample::new(1, PointerPhase::End, 0.0, 140.0);
    let last = decoder.on_sample(&release, 500.0).unwrap();
    assert!(last.velocity.is_finite());
}
