//! Pointer stream to drag frame decoding.
//!
//! A session begins at pointer-down and ends at up/cancel. Until movement
//! exceeds [`AXIS_LOCK_SLOP`](crate::AXIS_LOCK_SLOP) on some axis no deltas
//! are produced; the first axis to exceed it locks the session. A session
//! locked to the cross axis stays silent to the end, and a session that
//! never locks is reported as a tap on release. The slop distance itself is
//! absorbed, so the surface does not jump when the drag engages.
//!
//! The offset the surface had at pointer-down rides along in every frame as
//! `start_offset`: the surface may keep moving between samples, and drags
//! are interpreted against that one anchor, not against wherever the
//! surface happens to be now.

use crate::constants::{AXIS_LOCK_SLOP, MAX_VELOCITY};
use crate::sample::{Axis, DragTarget, PointerId, PointerPhase, PointerSample};
use crate::velocity_tracker::VelocityTracker;
use std::rc::Rc;
use web_time::Instant;

/// Decoder tuning. `slop` gates both axis lock and tap classification.
#[derive(Clone)]
pub struct DecoderConfig {
    pub axis: Axis,
    pub slop: f32,
    /// Cap applied when reading the tracker, units/sec.
    pub max_velocity: f32,
    /// Gestures starting on a target this returns `true` for never move the
    /// surface.
    pub excluded_targets: Option<Rc<dyn Fn(DragTarget) -> bool>>,
}

impl DecoderConfig {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            slop: AXIS_LOCK_SLOP,
            max_velocity: MAX_VELOCITY,
            excluded_targets: None,
        }
    }
}

/// One decoded step of an active drag.
#[derive(Clone, Copy, Debug)]
pub struct DragFrame {
    /// Primary-axis movement since the previous frame.
    pub delta: f32,
    /// Signed primary-axis movement since the drag engaged.
    pub cumulative: f32,
    /// Release velocity estimate, units/ms. Zero until meaningful.
    pub velocity: f32,
    /// Sign of the latest primary-axis movement: -1, 0 or 1.
    pub direction: i8,
    /// Surface offset captured at pointer-down.
    pub start_offset: f32,
    pub is_first: bool,
    pub is_last: bool,
    pub is_active: bool,
    /// Release never exceeded the slop on any axis.
    pub is_tap: bool,
    /// The session locked to the primary axis and produces movement.
    pub dragged: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AxisLock {
    Undecided,
    Primary,
    Cross,
}

struct GestureSession {
    pointer: PointerId,
    start_offset: f32,
    origin_primary: f32,
    origin_cross: f32,
    last_primary: f32,
    cumulative: f32,
    lock: AxisLock,
    tracker: VelocityTracker,
}

/// Sessions on excluded targets are remembered only so their remaining
/// samples can be swallowed.
enum SessionSlot {
    Excluded { pointer: PointerId },
    Tracking(GestureSession),
}

impl SessionSlot {
    fn pointer(&self) -> PointerId {
        match self {
            SessionSlot::Excluded { pointer } => *pointer,
            SessionSlot::Tracking(session) => session.pointer,
        }
    }
}

/// Turns raw pointer samples into [`DragFrame`]s along one axis.
pub struct GestureDecoder {
    config: DecoderConfig,
    session: Option<SessionSlot>,
    /// Time base for samples the host could not stamp.
    epoch: Instant,
}

impl GestureDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            session: None,
            epoch: Instant::now(),
        }
    }

    /// True while a pointer session (excluded or not) is in progress.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Drops any in-progress session without emitting a frame. Used when
    /// the owning surface is reconfigured or disposed mid-gesture.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Feeds one pointer sample. `current_offset` is the surface offset at
    /// this instant; it is only read when a session starts.
    pub fn on_sample(&mut self, sample: &PointerSample, current_offset: f32) -> Option<DragFrame> {
        match sample.phase {
            PointerPhase::Start => self.on_start(sample, current_offset),
            PointerPhase::Move => self.on_move(sample),
            PointerPhase::End => self.on_end(sample, false),
            PointerPhase::Cancel => self.on_end(sample, true),
        }
    }

    fn on_start(&mut self, sample: &PointerSample, current_offset: f32) -> Option<DragFrame> {
        if self.session.is_some() {
            // The session is bound to the first pointer for its lifetime.
            log::trace!("ignoring secondary pointer {}", sample.id);
            return None;
        }

        let excluded = self
            .config
            .excluded_targets
            .as_ref()
            .is_some_and(|predicate| predicate(sample.target));
        if excluded {
            log::debug!("session on excluded target {:?}", sample.target);
            self.session = Some(SessionSlot::Excluded { pointer: sample.id });
            return None;
        }

        let primary = self.config.axis.primary(sample.x, sample.y);
        let cross = self.config.axis.cross(sample.x, sample.y);
        let mut tracker = VelocityTracker::new();
        tracker.push(self.stamp(sample), primary);
        self.session = Some(SessionSlot::Tracking(GestureSession {
            pointer: sample.id,
            start_offset: current_offset,
            origin_primary: primary,
            origin_cross: cross,
            last_primary: primary,
            cumulative: 0.0,
            lock: AxisLock::Undecided,
            tracker,
        }));

        Some(DragFrame {
            delta: 0.0,
            cumulative: 0.0,
            velocity: 0.0,
            direction: 0,
            start_offset: current_offset,
            is_first: true,
            is_last: false,
            is_active: true,
            is_tap: false,
            dragged: false,
        })
    }

    fn on_move(&mut self, sample: &PointerSample) -> Option<DragFrame> {
        let time_ms = self.stamp(sample);
        let session = match self.session.as_mut() {
            Some(SessionSlot::Tracking(session)) if session.pointer == sample.id => session,
            _ => return None,
        };

        let primary = self.config.axis.primary(sample.x, sample.y);
        let cross = self.config.axis.cross(sample.x, sample.y);
        session.tracker.push(time_ms, primary);

        if session.lock == AxisLock::Undecided {
            let travel_primary = (primary - session.origin_primary).abs();
            let travel_cross = (cross - session.origin_cross).abs();
            if travel_primary.max(travel_cross) >= self.config.slop {
                if travel_primary >= travel_cross {
                    session.lock = AxisLock::Primary;
                    // Absorb the slop so the drag picks up from here.
                    session.last_primary = primary;
                    log::trace!("session locked to primary axis after {travel_primary} units");
                } else {
                    session.lock = AxisLock::Cross;
                    log::trace!("session locked to cross axis, surface will not move");
                }
            }
        }

        if session.lock != AxisLock::Primary {
            return None;
        }

        let delta = primary - session.last_primary;
        session.last_primary = primary;
        session.cumulative += delta;
        let velocity = session.tracker.velocity_capped(self.config.max_velocity) / 1000.0;

        Some(DragFrame {
            delta,
            cumulative: session.cumulative,
            velocity,
            direction: direction_of(delta),
            start_offset: session.start_offset,
            is_first: false,
            is_last: false,
            is_active: true,
            is_tap: false,
            dragged: true,
        })
    }

    fn on_end(&mut self, sample: &PointerSample, cancelled: bool) -> Option<DragFrame> {
        match self.session.as_ref() {
            Some(slot) if slot.pointer() == sample.id => {}
            _ => return None,
        }
        let time_ms = self.stamp(sample);
        let slot = self.session.take();
        let mut session = match slot {
            Some(SessionSlot::Tracking(session)) => session,
            _ => return None,
        };

        let dragged = session.lock == AxisLock::Primary;
        let is_tap = !cancelled && session.lock == AxisLock::Undecided;
        let velocity = if dragged && !cancelled {
            let primary = self.config.axis.primary(sample.x, sample.y);
            session.tracker.push(time_ms, primary);
            session.tracker.velocity_capped(self.config.max_velocity) / 1000.0
        } else {
            0.0
        };

        if is_tap {
            log::trace!("session classified as tap");
        }

        Some(DragFrame {
            delta: 0.0,
            cumulative: session.cumulative,
            velocity,
            direction: direction_of(velocity),
            start_offset: session.start_offset,
            is_first: false,
            is_last: true,
            is_active: false,
            is_tap,
            dragged,
        })
    }

    fn stamp(&self, sample: &PointerSample) -> i64 {
        sample
            .timestamp_ms
            .unwrap_or_else(|| self.epoch.elapsed().as_millis() as i64)
    }
}

fn direction_of(value: f32) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
#[path = "tests/decoder_tests.rs"]
mod tests;
