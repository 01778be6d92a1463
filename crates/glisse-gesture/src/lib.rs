//! Pointer input decoding for Glisse.
//!
//! Raw pointer samples go in, normalized drag frames come out: deltas along
//! one axis, a running total, an impulse-based release velocity, and the
//! tap/axis-lock classification that decides whether the surface moves at
//! all.

mod constants;
mod decoder;
mod sample;
mod velocity_tracker;

pub use constants::{AXIS_LOCK_SLOP, MAX_VELOCITY};
pub use decoder::{DecoderConfig, DragFrame, GestureDecoder};
pub use sample::{Axis, DragTarget, PointerId, PointerPhase, PointerSample};
pub use velocity_tracker::{VelocityTracker, ASSUME_STOPPED_MS};
