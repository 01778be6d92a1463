//! Imperative position holder driven by the frame clock.
//!
//! [`PositionModel`] owns the one number everything else revolves around:
//! the surface offset along its travel axis. It is deliberately not a
//! reactive value. The hosting UI can rebuild itself as often as it likes;
//! the model keeps its offset, its in-flight transition, and its paint
//! subscriber untouched until told otherwise.
//!
//! Exactly one transition is active at a time. Starting a new one cancels
//! the previous frame callback and drops its settle callback unfired.

use crate::spring::{MotionProfile, SpringProfile};
use glisse_core::{FrameCallbackRegistration, FrameClock};
use std::cell::RefCell;
use std::rc::Rc;

type SettleCallback = Box<dyn FnOnce() + 'static>;
type PaintSubscriber = Rc<dyn Fn(f32) + 'static>;

/// Shared handle to the position state. Clones observe and drive the same
/// offset.
pub struct PositionModel {
    inner: Rc<RefCell<PositionInner>>,
}

struct PositionInner {
    clock: FrameClock,
    offset: f32,
    /// Units/sec, the spring's native unit.
    velocity: f32,
    target: Option<f32>,
    profile: SpringProfile,
    last_frame_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
    on_settle: Option<SettleCallback>,
    paint: Option<PaintSubscriber>,
    disposed: bool,
}

impl PositionModel {
    pub fn new(initial: f32, clock: FrameClock) -> Self {
        let inner = PositionInner {
            clock,
            offset: initial,
            velocity: 0.0,
            target: None,
            profile: SpringProfile::default(),
            last_frame_nanos: None,
            registration: None,
            on_settle: None,
            paint: None,
            disposed: false,
        };
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub fn value(&self) -> f32 {
        self.inner.borrow().offset
    }

    /// Current velocity in units/sec. Zero while pinned or at rest.
    pub fn velocity(&self) -> f32 {
        self.inner.borrow().velocity
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().target.is_some()
    }

    /// Registers the callback invoked with the new offset after every
    /// change, integration step or pin alike. Replaces any previous
    /// subscriber.
    pub fn set_paint_subscriber(&self, subscriber: impl Fn(f32) + 'static) {
        self.inner.borrow_mut().paint = Some(Rc::new(subscriber));
    }

    /// Pins the offset: cancels any in-flight transition (its settle
    /// callback is dropped, not fired) and zeroes velocity. This is the
    /// write path for active drags.
    pub fn set(&self, value: f32) {
        let paint = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.halt();
            inner.offset = value;
            inner.velocity = 0.0;
            inner.paint.clone()
        };
        if let Some(paint) = paint {
            paint(value);
        }
    }

    /// Overrides the velocity the next transition starts from. Used to hand
    /// a gesture's release velocity into the spring.
    pub fn set_velocity(&self, velocity: f32) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.velocity = velocity;
    }

    /// Starts a transition toward `target`, superseding any in-flight one.
    pub fn animate_to(&self, target: f32, profile: MotionProfile) {
        self.begin(target, profile, None);
    }

    /// Like [`animate_to`](Self::animate_to), additionally invoking
    /// `on_settle` once when this transition reaches its target. A
    /// superseded transition's callback never fires.
    pub fn animate_to_then(
        &self,
        target: f32,
        profile: MotionProfile,
        on_settle: impl FnOnce() + 'static,
    ) {
        self.begin(target, profile, Some(Box::new(on_settle)));
    }

    /// Releases the frame callback, paint subscriber and any pending settle
    /// callback. Every later call on this model is a no-op.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.halt();
        inner.paint = None;
        inner.disposed = true;
    }

    fn begin(&self, target: f32, profile: MotionProfile, on_settle: Option<SettleCallback>) {
        let (paint, settled) = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                log::trace!("animate_to({target}) on disposed position model ignored");
                return;
            }
            // Supersede: the previous transition's settle callback is
            // dropped here without firing.
            inner.halt();

            let finish_now = match profile {
                MotionProfile::Immediate => true,
                MotionProfile::Spring(spring) => {
                    if spring.is_at_rest(inner.offset, inner.velocity, target) {
                        true
                    } else {
                        inner.profile = spring;
                        inner.target = Some(target);
                        false
                    }
                }
            };

            if finish_now {
                let changed = inner.offset != target;
                inner.offset = target;
                inner.velocity = 0.0;
                let paint = if changed { inner.paint.clone() } else { None };
                (paint, on_settle)
            } else {
                inner.on_settle = on_settle;
                (None, None)
            }
        };

        if self.inner.borrow().target.is_some() {
            Self::schedule_frame(&self.inner);
        }
        // Callbacks run after the borrow is released; both may call back
        // into this model.
        if let Some(paint) = paint {
            paint(target);
        }
        if let Some(settled) = settled {
            settled();
        }
    }

    fn schedule_frame(this: &Rc<RefCell<PositionInner>>) {
        let clock = {
            let inner = this.borrow();
            if inner.registration.is_some() {
                return;
            }
            inner.clock.clone()
        };
        let weak = Rc::downgrade(this);
        let registration = clock.with_frame_nanos(move |frame_time_nanos| {
            if let Some(strong) = weak.upgrade() {
                Self::on_frame(&strong, frame_time_nanos);
            }
        });
        this.borrow_mut().registration = Some(registration);
    }

    fn on_frame(this: &Rc<RefCell<PositionInner>>, frame_time_nanos: u64) {
        let mut schedule_next = false;
        let mut publish: Option<(PaintSubscriber, f32)> = None;
        let mut settled: Option<SettleCallback> = None;
        {
            let mut inner = this.borrow_mut();
            inner.registration = None;
            let Some(target) = inner.target else {
                return;
            };

            match inner.last_frame_nanos.replace(frame_time_nanos) {
                None => {
                    // First frame only establishes the time base.
                    schedule_next = true;
                }
                Some(previous) => {
                    let dt_secs =
                        frame_time_nanos.saturating_sub(previous) as f32 / 1_000_000_000.0;
                    if dt_secs == 0.0 {
                        schedule_next = true;
                    } else {
                        let (offset, velocity) =
                            inner
                                .profile
                                .step(inner.offset, inner.velocity, target, dt_secs);
                        inner.offset = offset;
                        inner.velocity = velocity;

                        if inner.profile.is_at_rest(offset, velocity, target) {
                            inner.offset = target;
                            inner.velocity = 0.0;
                            inner.target = None;
                            inner.last_frame_nanos = None;
                            settled = inner.on_settle.take();
                        } else {
                            schedule_next = true;
                        }
                        publish = inner.paint.clone().map(|paint| (paint, inner.offset));
                    }
                }
            }
        }

        if schedule_next {
            Self::schedule_frame(this);
        }
        if let Some((paint, offset)) = publish {
            paint(offset);
        }
        if let Some(settled) = settled {
            settled();
        }
    }
}

impl PositionInner {
    /// Stops any in-flight transition. Offset and velocity are left alone so
    /// a superseding transition can continue the current motion.
    fn halt(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.cancel();
        }
        self.target = None;
        self.last_frame_nanos = None;
        self.on_settle = None;
    }
}

impl Clone for PositionModel {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/position_tests.rs"]
mod tests;
