//! Snap surfaces: modal sheets and swipe-reveal rows.
//!
//! This crate is the embedding surface of the Glisse engine. A host builds
//! a [`SheetConfig`], hands it to a [`SheetController`] together with its
//! frame clock, haptic sink and viewport metrics, then forwards pointer
//! samples and resize events. The controller answers with offset updates on
//! its paint subscriber and a single settled-close notification per close.
//!
//! The pieces underneath are usable on their own: [`SnapResolver`] for
//! release resolution, [`TransitionSequencer`] for close bookkeeping,
//! [`ViewportAdapter`] for resize debouncing.

pub mod config;
pub mod controller;
pub mod sequencer;
pub mod snap;
pub mod viewport_adapter;

pub use config::{
    ConfigError, SheetConfig, DEFAULT_CLOSE_SETTLE_DELAY_MS, DEFAULT_VELOCITY_THRESHOLD,
};
pub use controller::{DismissReason, SheetController};
pub use sequencer::{SequencerState, TransitionSequencer};
pub use snap::{SnapLayout, SnapPoint, SnapResolver, SnapTarget};
pub use viewport_adapter::ViewportAdapter;

// Everything a host needs to embed a surface, without naming the lower
// crates.
pub use glisse_core::{
    FixedViewport, FrameClock, HapticEvent, Haptics, NoopHaptics, Runtime, RuntimeHandle,
    ViewportMetrics,
};
pub use glisse_gesture::{Axis, DragTarget, PointerId, PointerPhase, PointerSample};
pub use glisse_motion::{MotionProfile, SpringProfile, TravelBounds};
