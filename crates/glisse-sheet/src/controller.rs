//! The sheet controller, one per surface.
//!
//! Hosts forward pointer samples, viewport changes and their open flag;
//! the controller turns them into offset updates on its [`PositionModel`]
//! and tells the host exactly once when a close finished settling. All
//! collaborator callbacks (paint, settle, haptics, close notification) run
//! with the controller's own state borrow released, so they may call
//! straight back in.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glisse_core::{FrameClock, HapticEvent, Haptics, ViewportMetrics, ViewportReader};
use glisse_gesture::{DecoderConfig, GestureDecoder, PointerSample};
use glisse_motion::{MotionProfile, PositionModel};

use crate::config::{ConfigError, SheetConfig};
use crate::sequencer::{SequencerState, TransitionSequencer};
use crate::snap::{SnapLayout, SnapPoint, SnapResolver};
use crate::viewport_adapter::ViewportAdapter;

/// Dead band around the half-open reference, in travel units. Without it a
/// finger resting on the threshold would fire the crossing haptic every
/// frame.
const HALF_CROSS_HYSTERESIS: f32 = 2.0;

/// How a programmatic dismissal was triggered. Logged, and useful for hosts
/// that want different analytics per path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    EscapeKey,
    BackdropTap,
}

type CloseCallbackSlot = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Facade over one sheet or swipe-reveal surface.
pub struct SheetController {
    inner: Rc<RefCell<ControllerInner>>,
}

struct ControllerInner {
    config: SheetConfig,
    haptics: Rc<dyn Haptics>,
    viewport: ViewportReader,
    model: PositionModel,
    decoder: GestureDecoder,
    resolver: SnapResolver,
    sequencer: TransitionSequencer,
    adapter: ViewportAdapter,
    /// True while the host shows the surface; cleared by the fired close
    /// notification. Shared with the sequencer.
    presented: Rc<Cell<bool>>,
    close_callback: CloseCallbackSlot,
    current_point: SnapPoint,
    /// Open point the next `set_open(true)` returns to.
    restore_point: SnapPoint,
    dragging: bool,
    drag_engaged: bool,
    /// The pointer-down pinned an in-flight transition. If no drag engages,
    /// the release resumes that transition instead of leaving the surface
    /// hanging mid-travel.
    caught_transition: bool,
    /// Side of the half reference the drag last settled on; `true` is the
    /// open side. Drives the crossing haptic.
    half_side_open: Option<bool>,
    disposed: bool,
}

enum ReleaseAction {
    Open {
        point: SnapPoint,
        offset: f32,
        velocity: f32,
    },
    Close {
        velocity: f32,
    },
    /// Haptic-free continuation of a caught transition.
    Resume {
        point: SnapPoint,
        offset: f32,
    },
}

impl SheetController {
    /// Builds a controller mounted at the closed offset.
    ///
    /// This is the only fallible entry point; every runtime input after it
    /// is sanitized instead of reported.
    pub fn new(
        config: SheetConfig,
        clock: FrameClock,
        haptics: Rc<dyn Haptics>,
        viewport_metrics: Rc<dyn ViewportMetrics>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let viewport = ViewportReader::new(viewport_metrics);
        let extent = viewport.extent();
        let layout = SnapLayout::from_config(&config, extent);
        let model = PositionModel::new(layout.closed_offset(), clock.clone());
        let decoder = GestureDecoder::new(decoder_config(&config));
        let resolver = SnapResolver::new(layout, config.velocity_threshold, config.swipe_to_dismiss);

        let presented = Rc::new(Cell::new(true));
        let close_callback: CloseCallbackSlot = Rc::new(RefCell::new(None));
        let callback_slot = Rc::clone(&close_callback);
        let sequencer = TransitionSequencer::new(
            clock.clone(),
            config.effective_close_delay_ms(),
            Rc::clone(&presented),
            move || {
                let callback = callback_slot.borrow().clone();
                if let Some(callback) = callback {
                    callback();
                }
            },
        );
        let adapter = ViewportAdapter::new(clock, viewport.clone());

        let restore_point = initial_restore(&config);
        let controller = Self {
            inner: Rc::new(RefCell::new(ControllerInner {
                config,
                haptics,
                viewport,
                model,
                decoder,
                resolver,
                sequencer,
                adapter,
                presented,
                close_callback,
                current_point: SnapPoint::Closed,
                restore_point,
                dragging: false,
                drag_engaged: false,
                caught_transition: false,
                half_side_open: None,
                disposed: false,
            })),
        };
        controller.wire_recompute();
        Ok(controller)
    }

    /// Host's authoritative open flag. `true` transitions to the remembered
    /// open point; `false` closes and, once settled, notifies.
    pub fn set_open(&self, open: bool) {
        let restore = {
            let inner = self.inner.borrow();
            if inner.disposed {
                return;
            }
            if open {
                inner.presented.set(true);
            }
            inner.restore_point
        };
        if open {
            self.transition_to_open(restore);
        } else {
            self.begin_close_transition(None);
        }
    }

    /// Moves an already presented surface to `point`. Does not touch the
    /// host's presentation flag; opening from scratch goes through
    /// [`set_open`](Self::set_open).
    pub fn snap_to(&self, point: SnapPoint) {
        if point == SnapPoint::Closed {
            self.close();
        } else {
            self.transition_to_open(point);
        }
    }

    /// Engine-initiated close. The host learns about it through the settled
    /// close notification, unlike `set_open(false)` where the host already
    /// knows.
    pub fn close(&self) {
        self.begin_close_transition(None);
    }

    /// Dismissal by escape key or backdrop tap. A close with a haptic.
    pub fn dismiss(&self, reason: DismissReason) {
        let proceed = {
            let inner = self.inner.borrow();
            !inner.disposed && inner.current_point != SnapPoint::Closed
        };
        if !proceed {
            return;
        }
        log::debug!("dismissing surface ({reason:?})");
        self.begin_close_transition(Some(HapticEvent::Dismiss));
    }

    /// Feeds one pointer sample from the host's input pipeline.
    pub fn on_pointer(&self, sample: &PointerSample) {
        let mut engage_haptic = false;
        let mut half_haptic = false;
        let mut interrupt_close = false;
        let mut pin: Option<f32> = None;
        let mut release: Option<ReleaseAction> = None;

        let (model, haptics, sequencer, profile, closed_offset) = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            let offset = inner.model.value();
            let Some(frame) = inner.decoder.on_sample(sample, offset) else {
                return;
            };

            if frame.is_first {
                inner.dragging = true;
                inner.drag_engaged = false;
                inner.caught_transition = false;
                inner.half_side_open = None;
                if inner.model.is_animating() {
                    // Grab-to-catch: pin the surface where it is. A caught
                    // close is no longer a close, so its notification must
                    // not fire under the user's finger.
                    inner.caught_transition = true;
                    interrupt_close = true;
                    pin = Some(offset);
                }
            }

            if frame.is_active && frame.dragged {
                if !inner.drag_engaged {
                    inner.drag_engaged = true;
                    engage_haptic = true;
                }
                let raw = frame.start_offset + frame.cumulative;
                let bounds = inner.resolver.layout().bounds();
                let next = bounds.rubberband(raw, inner.config.rubberband_factor);
                half_haptic = inner.note_half_side(next);
                pin = Some(next);
            }

            if frame.is_last {
                let caught = inner.caught_transition;
                inner.dragging = false;
                inner.drag_engaged = false;
                inner.caught_transition = false;
                inner.half_side_open = None;
                if frame.dragged {
                    let released_at = pin.unwrap_or(offset);
                    let target =
                        inner
                            .resolver
                            .resolve(released_at, frame.velocity, inner.current_point);
                    if target == SnapPoint::Closed {
                        inner.current_point = SnapPoint::Closed;
                        release = Some(ReleaseAction::Close {
                            velocity: frame.velocity,
                        });
                    } else {
                        inner.current_point = target;
                        inner.restore_point = target;
                        match inner.resolver.layout().offset_of(target) {
                            Some(target_offset) => {
                                release = Some(ReleaseAction::Open {
                                    point: target,
                                    offset: target_offset,
                                    velocity: frame.velocity,
                                });
                            }
                            None => {
                                log::warn!("resolved snap point {target:?} missing from layout")
                            }
                        }
                    }
                } else if caught {
                    // Tap or cross-axis scroll on a caught surface: resume
                    // the interrupted travel toward the current point.
                    let point = inner.current_point;
                    let target_offset = inner
                        .resolver
                        .layout()
                        .offset_of(point)
                        .unwrap_or_else(|| inner.resolver.layout().closed_offset());
                    release = Some(ReleaseAction::Resume {
                        point,
                        offset: target_offset,
                    });
                }
            }

            (
                inner.model.clone(),
                Rc::clone(&inner.haptics),
                inner.sequencer.clone(),
                inner.motion_profile(),
                inner.resolver.layout().closed_offset(),
            )
        };

        if interrupt_close {
            sequencer.interrupt_close();
        }
        if let Some(value) = pin {
            model.set(value);
        }
        if engage_haptic {
            haptics.emit(HapticEvent::DragStart);
        }
        if half_haptic {
            haptics.emit(HapticEvent::HalfwayCrossed);
        }
        match release {
            Some(ReleaseAction::Open {
                point,
                offset,
                velocity,
            }) => {
                haptics.emit(HapticEvent::ReleaseOpen);
                sequencer.note_open_transition(point);
                // Tracker speaks units/ms, the spring units/sec.
                model.set_velocity(velocity * 1000.0);
                let settle = sequencer.clone();
                model.animate_to_then(offset, profile, move || settle.note_settled());
            }
            Some(ReleaseAction::Close { velocity }) => {
                haptics.emit(HapticEvent::ReleaseClose);
                sequencer.begin_close();
                model.set_velocity(velocity * 1000.0);
                model.animate_to(closed_offset, profile);
            }
            Some(ReleaseAction::Resume { point, offset }) => {
                if point == SnapPoint::Closed {
                    sequencer.begin_close();
                    model.animate_to(closed_offset, profile);
                } else {
                    sequencer.note_open_transition(point);
                    let settle = sequencer.clone();
                    model.animate_to_then(offset, profile, move || settle.note_settled());
                }
            }
            None => {}
        }
    }

    /// Forwards a resize, orientation or keyboard-inset event. Bursts fold
    /// into one recompute on the next paint frame.
    pub fn on_viewport_changed(&self) {
        let inner = self.inner.borrow();
        if inner.disposed {
            return;
        }
        inner.adapter.notify_resized();
    }

    /// Swaps the configuration in place, keeping the current offset.
    /// Validates exactly like construction; on error nothing changes.
    pub fn reconfigure(&self, config: SheetConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let work = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return Ok(());
            }
            let extent = inner.viewport.extent();
            let layout = SnapLayout::from_config(&config, extent);
            inner.decoder = GestureDecoder::new(decoder_config(&config));
            inner.resolver =
                SnapResolver::new(layout, config.velocity_threshold, config.swipe_to_dismiss);
            inner.sequencer.set_close_delay(config.effective_close_delay_ms());
            inner.dragging = false;
            inner.drag_engaged = false;
            inner.half_side_open = None;
            if inner.resolver.layout().offset_of(inner.current_point).is_none() {
                let fallback = inner.resolver.layout().nearest(inner.model.value());
                log::debug!(
                    "snap point {:?} absent after reconfigure, moving to {fallback:?}",
                    inner.current_point
                );
                inner.current_point = fallback;
            }
            if inner.resolver.layout().offset_of(inner.restore_point).is_none() {
                inner.restore_point = initial_restore(&config);
            }
            inner.config = config;
            let target = inner
                .resolver
                .layout()
                .offset_of(inner.current_point)
                .unwrap_or_else(|| inner.resolver.layout().closed_offset());
            (inner.model.clone(), inner.sequencer.clone(), target)
        };
        let (model, sequencer, target) = work;
        model.animate_to_then(target, MotionProfile::Immediate, move || {
            sequencer.note_settled()
        });
        Ok(())
    }

    /// Registers the callback invoked once per settled close.
    pub fn on_close_settled(&self, callback: impl Fn() + 'static) {
        let slot = Rc::clone(&self.inner.borrow().close_callback);
        *slot.borrow_mut() = Some(Rc::new(callback));
    }

    /// Registers the per-offset paint callback on the underlying model.
    pub fn set_paint_subscriber(&self, subscriber: impl Fn(f32) + 'static) {
        self.inner.borrow().model.set_paint_subscriber(subscriber);
    }

    pub fn offset(&self) -> f32 {
        self.inner.borrow().model.value()
    }

    /// Current velocity in units/sec.
    pub fn velocity(&self) -> f32 {
        self.inner.borrow().model.velocity()
    }

    /// Snap point of the last settled or in-flight transition.
    pub fn current_snap(&self) -> SnapPoint {
        self.inner.borrow().current_point
    }

    /// Normalized openness, 0 closed to 1 at the most open point.
    pub fn openness(&self) -> f32 {
        let inner = self.inner.borrow();
        inner.resolver.layout().openness(inner.model.value())
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.borrow().dragging
    }

    pub fn is_transitioning(&self) -> bool {
        self.inner.borrow().model.is_animating()
    }

    pub fn transition_state(&self) -> SequencerState {
        self.inner.borrow().sequencer.state()
    }

    /// Tears the controller down: pending frame callbacks and the close
    /// notification are dropped, later calls are no-ops.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.presented.set(false);
        inner.sequencer.dispose();
        inner.adapter.dispose();
        inner.model.dispose();
        inner.decoder.reset();
    }

    fn transition_to_open(&self, point: SnapPoint) {
        let work = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            match inner.resolver.layout().offset_of(point) {
                None => {
                    log::warn!("cannot open to unconfigured snap point {point:?}");
                    None
                }
                Some(offset) => {
                    inner.current_point = point;
                    inner.restore_point = point;
                    Some((
                        inner.model.clone(),
                        inner.sequencer.clone(),
                        inner.motion_profile(),
                        offset,
                    ))
                }
            }
        };
        if let Some((model, sequencer, profile, offset)) = work {
            sequencer.note_open_transition(point);
            let settle = sequencer.clone();
            model.animate_to_then(offset, profile, move || settle.note_settled());
        }
    }

    fn begin_close_transition(&self, haptic: Option<HapticEvent>) {
        let work = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.current_point = SnapPoint::Closed;
            inner.half_side_open = None;
            (
                inner.model.clone(),
                Rc::clone(&inner.haptics),
                inner.sequencer.clone(),
                inner.motion_profile(),
                inner.resolver.layout().closed_offset(),
            )
        };
        let (model, haptics, sequencer, profile, closed_offset) = work;
        if let Some(event) = haptic {
            haptics.emit(event);
        }
        sequencer.begin_close();
        model.animate_to(closed_offset, profile);
    }

    /// Hooks the debounced viewport recompute back into this controller.
    fn wire_recompute(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.borrow().adapter.set_on_recompute(move |extent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let work = {
                let mut inner_ref = inner.borrow_mut();
                if inner_ref.disposed {
                    return;
                }
                let layout = SnapLayout::from_config(&inner_ref.config, extent);
                inner_ref.resolver.set_layout(layout);
                if inner_ref.dragging {
                    // The new geometry applies on release; yanking the
                    // surface out from under a finger is worse than one
                    // stale frame of bounds.
                    log::debug!("viewport changed mid-drag, repositioning deferred to release");
                    None
                } else {
                    let target = inner_ref
                        .resolver
                        .layout()
                        .offset_of(inner_ref.current_point)
                        .unwrap_or_else(|| inner_ref.resolver.layout().closed_offset());
                    Some((inner_ref.model.clone(), inner_ref.sequencer.clone(), target))
                }
            };
            if let Some((model, sequencer, target)) = work {
                model.animate_to_then(target, MotionProfile::Immediate, move || {
                    sequencer.note_settled()
                });
            }
        });
    }
}

impl Clone for SheetController {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl ControllerInner {
    fn motion_profile(&self) -> MotionProfile {
        if self.config.reduced_motion {
            MotionProfile::Immediate
        } else {
            MotionProfile::Spring(self.config.spring)
        }
    }

    /// Offset treated as the halfway threshold: the `Half` point when
    /// configured, the middle of the travel bounds otherwise.
    fn half_reference(&self) -> f32 {
        let layout = self.resolver.layout();
        layout.offset_of(SnapPoint::Half).unwrap_or_else(|| {
            let bounds = layout.bounds();
            (bounds.min + bounds.max) / 2.0
        })
    }

    /// Tracks which side of the half reference the drag sits on. Returns
    /// true exactly when the drag crossed from one side to the other.
    fn note_half_side(&mut self, offset: f32) -> bool {
        let reference = self.half_reference();
        let side = if offset < reference - HALF_CROSS_HYSTERESIS {
            Some(true)
        } else if offset > reference + HALF_CROSS_HYSTERESIS {
            Some(false)
        } else {
            None
        };
        let Some(side) = side else {
            return false;
        };
        match self.half_side_open {
            None => {
                self.half_side_open = Some(side);
                false
            }
            Some(previous) if previous != side => {
                self.half_side_open = Some(side);
                true
            }
            Some(_) => false,
        }
    }
}

fn decoder_config(config: &SheetConfig) -> DecoderConfig {
    let mut decoder = DecoderConfig::new(config.axis);
    decoder.excluded_targets = config.excluded_drag_targets.clone();
    decoder
}

/// First open point in authored order; what `set_open(true)` targets before
/// any gesture picked another.
fn initial_restore(config: &SheetConfig) -> SnapPoint {
    config
        .snap_points
        .keys()
        .copied()
        .find(|&point| point != SnapPoint::Closed)
        .unwrap_or(SnapPoint::Closed)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
