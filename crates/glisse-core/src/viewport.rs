//! Viewport metrics collaborator.
//!
//! Mobile browsers report the visual viewport inconsistently while on-screen
//! keyboards or URL bars animate, so the extent a host hands us can be zero,
//! negative, or not even finite for a frame or two. Offsets are derived from
//! this extent; letting a NaN through would poison every later offset
//! computation. [`ViewportReader`] is the single place that sanitizes.

use std::rc::Rc;

/// Host-provided viewport measurements along the travel axis, in logical
/// units.
pub trait ViewportMetrics {
    /// Extent of the visual viewport. May be garbage mid-resize.
    fn visual_extent(&self) -> f32;

    /// Extent of the window, used when the visual viewport is unusable.
    /// Expected to always be a sane positive value.
    fn window_extent(&self) -> f32;
}

/// Sanitizing facade over a [`ViewportMetrics`] provider.
#[derive(Clone)]
pub struct ViewportReader {
    metrics: Rc<dyn ViewportMetrics>,
}

impl ViewportReader {
    pub fn new(metrics: Rc<dyn ViewportMetrics>) -> Self {
        Self { metrics }
    }

    /// Current travel extent, falling back to the window extent when the
    /// visual viewport reports a non-finite or non-positive value.
    pub fn extent(&self) -> f32 {
        let visual = self.metrics.visual_extent();
        if visual.is_finite() && visual > 0.0 {
            return visual;
        }
        let window = self.metrics.window_extent();
        log::warn!(
            "visual viewport extent {visual} unusable, falling back to window extent {window}"
        );
        window
    }
}

/// Fixed-size metrics for tests and hosts where the surface container never
/// resizes on its own.
pub struct FixedViewport {
    extent: std::cell::Cell<f32>,
}

impl FixedViewport {
    pub fn new(extent: f32) -> Self {
        Self {
            extent: std::cell::Cell::new(extent),
        }
    }

    pub fn set_extent(&self, extent: f32) {
        self.extent.set(extent);
    }
}

impl ViewportMetrics for FixedViewport {
    fn visual_extent(&self) -> f32 {
        self.extent.get()
    }

    fn window_extent(&self) -> f32 {
        self.extent.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FlakyViewport {
        visual: Cell<f32>,
    }

    impl ViewportMetrics for FlakyViewport {
        fn visual_extent(&self) -> f32 {
            self.visual.get()
        }

        fn window_extent(&self) -> f32 {
            640.0
        }
    }

    #[test]
    fn healthy_extent_passes_through() {
        let reader = ViewportReader::new(Rc::new(FlakyViewport {
            visual: Cell::new(812.0),
        }));
        assert_eq!(reader.extent(), 812.0);
    }

    #[test]
    fn degenerate_extents_fall_back_to_window() {
        let viewport = Rc::new(FlakyViewport {
            visual: Cell::new(0.0),
        });
        let reader = ViewportReader::new(viewport.clone());

        for bad in [0.0, -4.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            viewport.visual.set(bad);
            assert_eq!(reader.extent(), 640.0, "extent {bad} should fall back");
        }
    }
}
