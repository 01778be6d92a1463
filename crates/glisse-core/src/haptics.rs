//! Haptic feedback collaborator.
//!
//! The engine only names the transition that happened; the host decides how
//! (and whether) to vibrate. Hosts without a haptic device plug in
//! [`NoopHaptics`].

/// Transition events that warrant tactile feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HapticEvent {
    /// A drag engaged on the surface. Conventionally a selection tick.
    DragStart,
    /// The surface crossed the half-open position under the user's finger.
    /// Conventionally a selection tick.
    HalfwayCrossed,
    /// A release resolved to an open snap point. Conventionally light.
    ReleaseOpen,
    /// A release resolved to the closed position. Conventionally medium.
    ReleaseClose,
    /// The surface was dismissed by escape key or backdrop tap.
    /// Conventionally light.
    Dismiss,
}

pub trait Haptics {
    fn emit(&self, event: HapticEvent);
}

/// Haptics sink for hosts without a vibration device.
#[derive(Default)]
pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn emit(&self, _event: HapticEvent) {}
}
