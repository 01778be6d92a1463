//! Damped spring integration for surface motion.
//!
//! The spring is parameterized by a raw stiffness/friction pair rather than
//! a damping ratio so tuning values carry over directly from the CSS/JS
//! spring ecosystems. Integration is semi-implicit Euler with a bounded
//! substep, which stays stable for stiff springs even when the host skips
//! frames.

/// Largest single integration step in seconds. Frame deltas above this are
/// subdivided; a dropped-frame 100ms delta would otherwise overshoot hard
/// at high stiffness.
const MAX_STEP_SECS: f32 = 0.004;

/// Stiffness/friction pair driving a damped transition, plus the rest
/// thresholds that decide when the motion has settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringProfile {
    /// Spring constant, units/sec^2 per unit of displacement.
    pub stiffness: f32,
    /// Damping coefficient, units/sec^2 per unit/sec of velocity.
    pub friction: f32,
    /// Velocity magnitude (units/sec) below which the spring may settle.
    pub rest_velocity: f32,
    /// Displacement magnitude (units) below which the spring may settle.
    pub rest_distance: f32,
}

impl SpringProfile {
    /// Critically damped settle used for sheet open/close transitions.
    /// Reaches rest in roughly 200ms from a standstill.
    pub fn settle() -> Self {
        Self {
            stiffness: 300.0,
            friction: 35.0,
            rest_velocity: 1.0,
            rest_distance: 0.1,
        }
    }

    /// Softer spring for large travels where `settle` feels abrupt.
    pub fn gentle() -> Self {
        Self {
            stiffness: 170.0,
            friction: 26.0,
            rest_velocity: 1.0,
            rest_distance: 0.1,
        }
    }

    /// Fast spring for short-travel rows.
    pub fn stiff() -> Self {
        Self {
            stiffness: 700.0,
            friction: 50.0,
            rest_velocity: 1.0,
            rest_distance: 0.1,
        }
    }

    /// Advances `position`/`velocity` toward `target` by `dt_secs`.
    pub fn step(&self, position: f32, velocity: f32, target: f32, dt_secs: f32) -> (f32, f32) {
        let mut position = position;
        let mut velocity = velocity;
        let mut remaining = dt_secs;
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP_SECS);
            let displacement = position - target;
            let acceleration = -self.stiffness * displacement - self.friction * velocity;
            velocity += acceleration * step;
            position += velocity * step;
            remaining -= step;
        }
        (position, velocity)
    }

    /// Whether the motion is close enough to `target` to snap and stop.
    pub fn is_at_rest(&self, position: f32, velocity: f32, target: f32) -> bool {
        velocity.abs() < self.rest_velocity && (position - target).abs() < self.rest_distance
    }
}

impl Default for SpringProfile {
    fn default() -> Self {
        Self::settle()
    }
}

/// How a transition should move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    /// Jump straight to the target with no intermediate frames. Used for
    /// reduced motion and for repositioning after a resize.
    Immediate,
    /// Damped spring motion.
    Spring(SpringProfile),
}
