//! Release-velocity estimation over a short sample window.
//!
//! Uses the impulse strategy: each pair of adjacent samples contributes the
//! work a unit mass would need to reach that segment's velocity, and the
//! accumulated kinetic energy converts back to a signed velocity. Compared
//! to a least-squares fit this weighs the most recent motion heavily and is
//! robust to a finger resting mid-gesture.

/// Ring buffer capacity. At typical pointer rates this covers well past the
/// horizon below.
const HISTORY_SIZE: usize = 20;

/// Samples older than this relative to the newest are ignored.
const HORIZON_MS: i64 = 100;

/// A gap this long between adjacent samples means the pointer stopped;
/// samples before the gap are ignored.
pub const ASSUME_STOPPED_MS: i64 = 40;

#[derive(Clone, Copy)]
struct TrackerSample {
    time_ms: i64,
    position: f32,
}

/// Single-axis velocity tracker over absolute positions.
#[derive(Clone)]
pub struct VelocityTracker {
    samples: [Option<TrackerSample>; HISTORY_SIZE],
    index: usize,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            index: 0,
        }
    }

    /// Records the pointer's primary-axis position at `time_ms`.
    pub fn push(&mut self, time_ms: i64, position: f32) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(TrackerSample { time_ms, position });
    }

    pub fn reset(&mut self) {
        self.samples = [None; HISTORY_SIZE];
        self.index = 0;
    }

    /// Current velocity estimate in units/sec. Zero with fewer than two
    /// usable samples.
    pub fn velocity(&self) -> f32 {
        let mut positions = [0.0f32; HISTORY_SIZE];
        let mut times_ms = [0.0f32; HISTORY_SIZE];
        let mut count = 0usize;

        let newest = match self.samples[self.index] {
            Some(sample) => sample,
            None => return 0.0,
        };

        // Walk backwards from the newest sample, newest-first into the
        // scratch arrays, stopping at the horizon or at a stop gap.
        let mut cursor = self.index;
        let mut next_newer_ms = newest.time_ms;
        while let Some(sample) = self.samples[cursor] {
            let age_ms = newest.time_ms - sample.time_ms;
            let gap_ms = next_newer_ms - sample.time_ms;
            if age_ms > HORIZON_MS || gap_ms > ASSUME_STOPPED_MS {
                break;
            }
            next_newer_ms = sample.time_ms;

            positions[count] = sample.position;
            times_ms[count] = -(age_ms as f32);
            count += 1;
            if count >= HISTORY_SIZE {
                break;
            }
            cursor = cursor.checked_sub(1).unwrap_or(HISTORY_SIZE - 1);
        }

        if count < 2 {
            return 0.0;
        }
        impulse_velocity(&positions[..count], &times_ms[..count]) * 1000.0
    }

    /// Velocity estimate clamped to `±max` units/sec.
    pub fn velocity_capped(&self, max: f32) -> f32 {
        if !max.is_finite() || max <= 0.0 {
            return 0.0;
        }
        self.velocity().clamp(-max, max)
    }
}

/// Impulse accumulation over newest-first samples. Returns units/ms.
fn impulse_velocity(positions: &[f32], times_ms: &[f32]) -> f32 {
    let count = positions.len();
    let mut work = 0.0f32;
    // Oldest segment first; index i is the older endpoint, i-1 the newer.
    for i in (1..count).rev() {
        let dt = times_ms[i - 1] - times_ms[i];
        if dt == 0.0 {
            continue;
        }
        let dx = positions[i - 1] - positions[i];
        let segment_velocity = dx / dt;
        let accumulated = velocity_from_energy(work);
        work += (segment_velocity - accumulated) * segment_velocity.abs();
        if i == count - 1 {
            work *= 0.5;
        }
    }
    velocity_from_energy(work)
}

/// Inverts E = v^2 / 2 for unit mass, keeping the sign of the energy.
#[inline]
fn velocity_from_energy(energy: f32) -> f32 {
    energy.signum() * (2.0 * energy.abs()).sqrt()
}
