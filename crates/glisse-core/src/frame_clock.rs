//! Frame-callback handle with scoped cancellation.

use crate::runtime::RuntimeHandle;
use crate::FrameCallbackId;

/// Entry point for scheduling work on the next paint frame.
#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Registers `callback` to run on the next frame with the frame time in
    /// nanoseconds. Dropping the returned registration cancels it.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let runtime = self.runtime.clone();
        match runtime.register_frame_callback(callback) {
            Some(id) => FrameCallbackRegistration::new(runtime, id),
            None => FrameCallbackRegistration::inactive(runtime),
        }
    }
}

/// Keeps a scheduled frame callback alive; dropping it cancels the callback
/// if it has not run yet.
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    fn new(runtime: RuntimeHandle, id: FrameCallbackId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ManualScheduler, Runtime};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    #[test]
    fn registration_drop_cancels_callback() {
        let runtime = Runtime::new(Arc::new(ManualScheduler));
        let handle = runtime.handle();
        let clock = handle.frame_clock();
        let fired = Rc::new(Cell::new(false));

        let fired_flag = Rc::clone(&fired);
        let registration = clock.with_frame_nanos(move |_| fired_flag.set(true));
        drop(registration);
        handle.drain_frame_callbacks(0);

        assert!(!fired.get());
    }

    #[test]
    fn kept_registration_fires_with_frame_time() {
        let runtime = Runtime::new(Arc::new(ManualScheduler));
        let handle = runtime.handle();
        let clock = handle.frame_clock();
        let seen = Rc::new(Cell::new(0u64));

        let seen_time = Rc::clone(&seen);
        let _registration = clock.with_frame_nanos(move |t| seen_time.set(t));
        handle.drain_frame_callbacks(42);

        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn clock_on_dropped_runtime_hands_out_inactive_registrations() {
        let clock = {
            let runtime = Runtime::new(Arc::new(ManualScheduler));
            runtime.handle().frame_clock()
        };
        let registration = clock.with_frame_nanos(|_| {});
        registration.cancel();
    }
}
