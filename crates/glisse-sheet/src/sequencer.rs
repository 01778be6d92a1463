//! Transition bookkeeping and the deferred close notification.
//!
//! Every transition bumps a per-instance sequence number. A close schedules
//! its host notification against the number it was issued, and the
//! notification fires only if that number is still the latest at fire time
//! and the host still presents the surface. Cancelling the timer alone is
//! not enough once hosts hold wall-clock timers or recycle surfaces, so
//! both guards stay.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glisse_core::{FrameCallbackRegistration, FrameClock};

use crate::snap::SnapPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// A transition toward an open point is in flight.
    Animating(SnapPoint),
    /// A close ran and its notification, issued at this sequence number, has
    /// not fired or been invalidated yet.
    PendingClose(u64),
}

/// Owns the close-notification lifecycle for one surface.
///
/// Handles are cheap clones over shared state, in the style of the other
/// frame-driven primitives: settle callbacks capture a clone instead of
/// borrowing whoever owns the sequencer.
pub struct TransitionSequencer {
    inner: Rc<RefCell<SequencerInner>>,
}

struct SequencerInner {
    clock: FrameClock,
    state: SequencerState,
    /// Bumped by every transition, open or close. Monotonic per instance.
    sequence: u64,
    delay_ms: u64,
    pending: Option<PendingNotification>,
    /// True while the host still shows the surface. Cleared by the fired
    /// notification itself, so repeat closes cannot notify twice.
    presented: Rc<Cell<bool>>,
    on_close: Rc<dyn Fn()>,
    disposed: bool,
}

struct PendingNotification {
    sequence: u64,
    /// Frame time the notification becomes due, fixed on its first tick.
    due_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
}

impl TransitionSequencer {
    pub fn new(
        clock: FrameClock,
        delay_ms: u64,
        presented: Rc<Cell<bool>>,
        on_close: impl Fn() + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SequencerInner {
                clock,
                state: SequencerState::Idle,
                sequence: 0,
                delay_ms,
                pending: None,
                presented,
                on_close: Rc::new(on_close),
                disposed: false,
            })),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.inner.borrow().state
    }

    pub fn set_close_delay(&self, delay_ms: u64) {
        self.inner.borrow_mut().delay_ms = delay_ms;
    }

    /// Records a transition toward an open point. Invalidate first: any
    /// pending close notification belongs to a superseded transition.
    pub fn note_open_transition(&self, target: SnapPoint) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.sequence += 1;
        if inner.pending.take().is_some() {
            log::debug!("pending close notification superseded by move to {target:?}");
        }
        inner.state = SequencerState::Animating(target);
    }

    /// Marks the in-flight open transition as settled. Close transitions
    /// settle through their notification instead.
    pub fn note_settled(&self) {
        let mut inner = self.inner.borrow_mut();
        if matches!(inner.state, SequencerState::Animating(_)) {
            inner.state = SequencerState::Idle;
        }
    }

    /// Invalidates a pending close because the user grabbed the surface
    /// mid-close. Bumps the sequence so even a host-side timer comparing
    /// numbers sees the close as stale.
    pub fn interrupt_close(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        let pending = inner.pending.take().is_some();
        if pending || matches!(inner.state, SequencerState::PendingClose(_)) {
            inner.sequence += 1;
            inner.state = SequencerState::Idle;
            log::debug!("pending close interrupted by grab");
        }
    }

    /// Starts a close: bumps the sequence, replaces any pending
    /// notification and schedules a fresh one after the configured delay.
    pub fn begin_close(&self) -> u64 {
        let sequence = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return inner.sequence;
            }
            inner.sequence += 1;
            let sequence = inner.sequence;
            inner.pending = Some(PendingNotification {
                sequence,
                due_nanos: None,
                registration: None,
            });
            inner.state = SequencerState::PendingClose(sequence);
            sequence
        };
        Self::arm_tick(&self.inner);
        sequence
    }

    /// Drops any pending notification without firing it.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.pending = None;
        inner.state = SequencerState::Idle;
        inner.disposed = true;
    }

    fn arm_tick(inner: &Rc<RefCell<SequencerInner>>) {
        let clock = {
            let inner_ref = inner.borrow();
            if inner_ref.disposed || inner_ref.pending.is_none() {
                return;
            }
            inner_ref.clock.clone()
        };
        let weak = Rc::downgrade(inner);
        let registration = clock.with_frame_nanos(move |frame_nanos| {
            if let Some(inner) = weak.upgrade() {
                Self::on_tick(&inner, frame_nanos);
            }
        });
        if let Some(pending) = inner.borrow_mut().pending.as_mut() {
            pending.registration = Some(registration);
        }
    }

    fn on_tick(inner: &Rc<RefCell<SequencerInner>>, frame_nanos: u64) {
        enum Outcome {
            Rearm,
            Fire(Rc<dyn Fn()>),
            Done,
        }
        let outcome = {
            let mut guard = inner.borrow_mut();
            let inner_ref = &mut *guard;
            match inner_ref.pending.as_mut() {
                None => Outcome::Done,
                Some(pending) => {
                    pending.registration = None;
                    let due = *pending
                        .due_nanos
                        .get_or_insert(frame_nanos + inner_ref.delay_ms * 1_000_000);
                    if frame_nanos < due {
                        Outcome::Rearm
                    } else {
                        let issued = pending.sequence;
                        inner_ref.pending = None;
                        inner_ref.state = SequencerState::Idle;
                        let latest = inner_ref.sequence;
                        let presented = inner_ref.presented.get();
                        if issued == latest && presented {
                            inner_ref.presented.set(false);
                            Outcome::Fire(Rc::clone(&inner_ref.on_close))
                        } else {
                            log::debug!(
                                "close notification {issued} suppressed (latest {latest}, presented {presented})"
                            );
                            Outcome::Done
                        }
                    }
                }
            }
        };
        // The notification runs host code that may call straight back into
        // the sequencer, so the borrow is released first.
        match outcome {
            Outcome::Rearm => Self::arm_tick(inner),
            Outcome::Fire(on_close) => on_close(),
            Outcome::Done => {}
        }
    }
}

impl Clone for TransitionSequencer {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}
