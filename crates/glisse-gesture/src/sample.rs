//! Raw pointer input types.

pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Travel axis of a surface. Sheets slide vertically, swipe-reveal rows
/// horizontally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    /// Component of `(x, y)` along this axis.
    pub fn primary(&self, x: f32, y: f32) -> f32 {
        match self {
            Axis::Vertical => y,
            Axis::Horizontal => x,
        }
    }

    /// Component of `(x, y)` across this axis.
    pub fn cross(&self, x: f32, y: f32) -> f32 {
        match self {
            Axis::Vertical => x,
            Axis::Horizontal => y,
        }
    }
}

/// What kind of element a gesture started on. Hosts classify the hit target
/// so interactive children can be excluded from dragging the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DragTarget {
    /// The surface body itself.
    Surface,
    /// A dedicated grab handle.
    Handle,
    TextInput,
    Button,
    Link,
}

/// One pointer event as delivered by the host.
#[derive(Clone, Copy, Debug)]
pub struct PointerSample {
    pub id: PointerId,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    /// Host event timestamp in milliseconds, when the host can stamp
    /// events. The decoder stamps unstamped samples itself.
    pub timestamp_ms: Option<i64>,
    pub target: DragTarget,
}

impl PointerSample {
    pub fn new(id: PointerId, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            id,
            phase,
            x,
            y,
            timestamp_ms: None,
            target: DragTarget::Surface,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn with_target(mut self, target: DragTarget) -> Self {
        self.target = target;
        self
    }
}
