//! Single-threaded runtime that owns the frame-callback queue.
//!
//! Hosts drive the engine by calling [`RuntimeHandle::drain_frame_callbacks`]
//! once per paint with the frame timestamp in nanoseconds. Everything that
//! needs to run "next frame" registers a one-shot callback here; the runtime
//! asks the host for a frame through [`FrameScheduler`] whenever at least one
//! callback is pending.

use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

pub type FrameCallbackId = u64;

type FrameCallback = Box<dyn FnOnce(u64) + 'static>;

/// Host hook used to request a paint frame.
///
/// Called whenever a frame callback is registered while no frame is already
/// pending. A browser host forwards this to `requestAnimationFrame`; a
/// desktop host to its event-loop wakeup. Tests use [`ManualScheduler`] and
/// drain explicitly.
pub trait FrameScheduler {
    fn schedule_frame(&self);
}

/// Scheduler that does nothing; the embedder drains frames on its own cadence.
#[derive(Default)]
pub struct ManualScheduler;

impl FrameScheduler for ManualScheduler {
    fn schedule_frame(&self) {}
}

struct RuntimeInner {
    scheduler: Arc<dyn FrameScheduler>,
    next_callback_id: Cell<FrameCallbackId>,
    /// Registered callbacks keyed by id; cancellation removes the entry.
    callbacks: RefCell<FxHashMap<FrameCallbackId, FrameCallback>>,
    /// Registration order. Ids whose callback was cancelled are skipped on
    /// drain, so this may briefly hold stale ids.
    order: RefCell<VecDeque<FrameCallbackId>>,
    frame_requested: Cell<bool>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            scheduler,
            next_callback_id: Cell::new(0),
            callbacks: RefCell::new(FxHashMap::default()),
            order: RefCell::new(VecDeque::new()),
            frame_requested: Cell::new(false),
        }
    }

    fn register_frame_callback(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = self.next_callback_id.get();
        self.next_callback_id.set(id + 1);
        self.callbacks.borrow_mut().insert(id, callback);
        self.order.borrow_mut().push_back(id);
        if !self.frame_requested.replace(true) {
            self.scheduler.schedule_frame();
        }
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        // The order queue keeps the stale id; drain skips ids with no entry.
        self.callbacks.borrow_mut().remove(&id);
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        // Swap the queue out first: callbacks registered while draining run
        // on the next frame, not this one.
        let due = std::mem::take(&mut *self.order.borrow_mut());
        self.frame_requested.set(false);
        for id in due {
            let callback = self.callbacks.borrow_mut().remove(&id);
            if let Some(callback) = callback {
                callback(frame_time_nanos);
            }
        }
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.callbacks.borrow().is_empty()
    }
}

/// Owner of the runtime state. Keep this alive for as long as the engine
/// runs; handles go inert once it is dropped.
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// True while at least one frame callback is waiting.
    pub fn needs_frame(&self) -> bool {
        self.inner.has_frame_callbacks()
    }
}

/// Cloneable weak reference to a [`Runtime`].
///
/// All operations are no-ops (or return `None`) after the runtime is dropped,
/// so long-lived animation state can hold handles without keeping the
/// runtime alive.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    /// Runs every callback that was registered before this call, in
    /// registration order, passing the frame timestamp through.
    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        } else {
            log::trace!("drain_frame_callbacks on dropped runtime");
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_frame_callbacks())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> crate::FrameClock {
        crate::FrameClock::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CountingScheduler {
        requests: Cell<usize>,
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule_frame(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let runtime = Runtime::new(Arc::new(ManualScheduler));
        let handle = runtime.handle();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let seen = Rc::clone(&seen);
            handle.register_frame_callback(move |_| seen.borrow_mut().push(tag));
        }
        handle.drain_frame_callbacks(0);

        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn cancelled_callback_does_not_run() {
        let runtime = Runtime::new(Arc::new(ManualScheduler));
        let handle = runtime.handle();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_a = Rc::clone(&seen);
        let id = handle
            .register_frame_callback(move |_| seen_a.borrow_mut().push("a"))
            .unwrap();
        let seen_b = Rc::clone(&seen);
        handle.register_frame_callback(move |_| seen_b.borrow_mut().push("b"));
        handle.cancel_frame_callback(id);
        handle.drain_frame_callbacks(0);

        assert_eq!(*seen.borrow(), vec!["b"]);
    }

    #[test]
    fn callback_registered_while_draining_waits_for_next_frame() {
        let runtime = Runtime::new(Arc::new(ManualScheduler));
        let handle = runtime.handle();
        let times = Rc::new(RefCell::new(Vec::new()));

        let inner_handle = handle.clone();
        let inner_times = Rc::clone(&times);
        handle.register_frame_callback(move |t| {
            inner_times.borrow_mut().push(("outer", t));
            let inner_times = Rc::clone(&inner_times);
            inner_handle.register_frame_callback(move |t| {
                inner_times.borrow_mut().push(("inner", t));
            });
        });

        handle.drain_frame_callbacks(10);
        assert_eq!(*times.borrow(), vec![("outer", 10)]);
        handle.drain_frame_callbacks(20);
        assert_eq!(*times.borrow(), vec![("outer", 10), ("inner", 20)]);
    }

    #[test]
    fn registering_requests_a_frame_once() {
        let scheduler = Arc::new(CountingScheduler {
            requests: Cell::new(0),
        });
        let runtime = Runtime::new(scheduler.clone());
        let handle = runtime.handle();

        handle.register_frame_callback(|_| {});
        handle.register_frame_callback(|_| {});
        assert_eq!(scheduler.requests.get(), 1);

        handle.drain_frame_callbacks(0);
        handle.register_frame_callback(|_| {});
        assert_eq!(scheduler.requests.get(), 2);
    }

    #[test]
    fn handle_outliving_runtime_is_inert() {
        let handle = {
            let runtime = Runtime::new(Arc::new(ManualScheduler));
            runtime.handle()
        };
        assert!(handle.register_frame_callback(|_| {}).is_none());
        assert!(!handle.has_frame_callbacks());
        handle.drain_frame_callbacks(0);
    }

    #[test]
    fn needs_frame_tracks_pending_callbacks() {
        let runtime = Runtime::new(Arc::new(ManualScheduler));
        let handle = runtime.handle();
        assert!(!runtime.needs_frame());

        handle.register_frame_callback(|_| {});
        assert!(runtime.needs_frame());

        handle.drain_frame_callbacks(0);
        assert!(!runtime.needs_frame());
    }
}
