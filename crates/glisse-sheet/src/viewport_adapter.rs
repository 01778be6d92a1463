//! Debounced viewport change handling.
//!
//! Hosts forward every resize, keyboard inset and orientation event;
//! mobile browsers fire those in bursts. The adapter coalesces a burst into
//! one recompute on the next paint frame by holding a single pending frame
//! registration.

use std::cell::RefCell;
use std::rc::Rc;

use glisse_core::{FrameCallbackRegistration, FrameClock, ViewportReader};

pub struct ViewportAdapter {
    inner: Rc<RefCell<AdapterInner>>,
}

struct AdapterInner {
    clock: FrameClock,
    viewport: ViewportReader,
    pending: Option<FrameCallbackRegistration>,
    on_recompute: Option<Rc<dyn Fn(f32)>>,
    disposed: bool,
}

impl ViewportAdapter {
    pub fn new(clock: FrameClock, viewport: ViewportReader) -> Self {
        Self {
            inner: Rc::new(RefCell::new(AdapterInner {
                clock,
                viewport,
                pending: None,
                on_recompute: None,
                disposed: false,
            })),
        }
    }

    /// Installs the recompute callback, invoked with the sanitized extent.
    pub fn set_on_recompute(&self, callback: impl Fn(f32) + 'static) {
        self.inner.borrow_mut().on_recompute = Some(Rc::new(callback));
    }

    /// Requests a recompute on the next paint frame. Further requests before
    /// that frame fold into the already-pending one.
    pub fn notify_resized(&self) {
        let clock = {
            let inner = self.inner.borrow();
            if inner.disposed || inner.pending.is_some() {
                return;
            }
            inner.clock.clone()
        };
        let weak = Rc::downgrade(&self.inner);
        let registration = clock.with_frame_nanos(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let work = {
                let mut inner_ref = inner.borrow_mut();
                inner_ref.pending = None;
                if inner_ref.disposed {
                    None
                } else {
                    inner_ref
                        .on_recompute
                        .clone()
                        .map(|callback| (inner_ref.viewport.clone(), callback))
                }
            };
            if let Some((viewport, callback)) = work {
                callback(viewport.extent());
            }
        });
        self.inner.borrow_mut().pending = Some(registration);
    }

    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.pending = None;
        inner.on_recompute = None;
        inner.disposed = true;
    }
}
