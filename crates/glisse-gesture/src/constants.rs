//! Shared gesture thresholds.
//!
//! These values are in logical units. The same slop constant gates both the
//! axis-lock decision and the tap classification on purpose: a session that
//! never travelled far enough to lock an axis is exactly the session that
//! should count as a tap, so using one threshold removes the gap where a
//! gesture is too long to be a tap but too short to scroll.

/// Movement (from the press origin, per axis) required before a session
/// locks to an axis and starts producing drag deltas.
///
/// Sessions that end below this on both axes are reported as taps. 5.0 is
/// deliberately a little tighter than the ~8dp platform touch slop; snap
/// surfaces sit under thumbs, and late engagement reads as lag there.
pub const AXIS_LOCK_SLOP: f32 = 5.0;

/// Velocity cap in units/sec applied when reading the tracker.
///
/// Matches the common platform maximum fling velocity at baseline density.
/// Uncapped impulse estimates from two close-together samples can reach
/// absurd values that would always trip direction-only snap resolution.
pub const MAX_VELOCITY: f32 = 8_000.0;
