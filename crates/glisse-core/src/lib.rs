//! Runtime plumbing shared by the Glisse crates.
//!
//! Glisse is a gesture-to-motion engine for snap surfaces (bottom sheets,
//! swipe-reveal rows). This crate holds the pieces every layer above needs:
//! the frame-callback runtime that stands in for the host's paint loop, and
//! the traits through which the engine talks to its host (haptic device,
//! viewport metrics). It knows nothing about gestures or snap points.

mod frame_clock;
mod haptics;
mod runtime;
mod viewport;

pub use frame_clock::{FrameCallbackRegistration, FrameClock};
pub use haptics::{HapticEvent, Haptics, NoopHaptics};
pub use runtime::{FrameCallbackId, FrameScheduler, ManualScheduler, Runtime, RuntimeHandle};
pub use viewport::{FixedViewport, ViewportMetrics, ViewportReader};
