//! Sheet configuration and construction-time validation.
//!
//! Configuration is the only place the engine reports errors. Everything
//! after [`SheetConfig::validate`] passes is total: malformed runtime input
//! (bogus viewport metrics, unknown pointers) is sanitized or ignored with
//! a log line instead of surfacing a `Result`.

use std::rc::Rc;

use glisse_gesture::{Axis, DragTarget};
use glisse_motion::SpringProfile;
use indexmap::IndexMap;

use crate::snap::SnapPoint;

/// Release speed above which a drag counts as a flick, in units per
/// millisecond. Roughly half a viewport per second on a phone-sized screen.
pub const DEFAULT_VELOCITY_THRESHOLD: f32 = 0.5;

/// How long a close transition is given to settle before the host is told
/// the surface finished closing, in milliseconds. Slightly longer than the
/// settle spring's typical rest time so the notification lands after the
/// motion, not during it.
pub const DEFAULT_CLOSE_SETTLE_DELAY_MS: u64 = 210;

/// Static description of a sheet or swipe-reveal surface.
///
/// Built once, validated once, then handed to
/// [`SheetController::new`](crate::SheetController::new). Snap points are
/// authored as visible percentages of the travel extent; the controller maps
/// them to concrete offsets whenever the viewport changes.
#[derive(Clone)]
pub struct SheetConfig {
    /// Axis the surface travels along. Cross-axis movement hands the gesture
    /// back to the host.
    pub axis: Axis,
    /// Visible percent (0..=100) per configured point, in authored order.
    /// Must contain [`SnapPoint::Closed`] at 0 and at least one open point.
    pub snap_points: IndexMap<SnapPoint, f32>,
    /// Lower clamp applied to open snap points, in visible percent.
    pub min_visible_percent: f32,
    /// Upper clamp applied to open snap points, in visible percent.
    pub max_visible_percent: f32,
    /// Flick threshold in units per millisecond.
    pub velocity_threshold: f32,
    /// Fraction of out-of-bounds travel that survives the rubberband.
    /// 0 is a hard stop, 1 disables the resistance.
    pub rubberband_factor: f32,
    /// Delay before a close notification fires. Forced to 0 when
    /// `reduced_motion` is set.
    pub close_settle_delay_ms: u64,
    /// Whether a gesture release may resolve to [`SnapPoint::Closed`].
    /// Programmatic closes work either way.
    pub swipe_to_dismiss: bool,
    /// Replace springs with same-tick jumps and drop the close delay.
    pub reduced_motion: bool,
    /// Spring used for release and programmatic transitions.
    pub spring: SpringProfile,
    /// Predicate for drag targets whose gestures the engine must leave
    /// alone. `None` drags from anywhere.
    pub excluded_drag_targets: Option<Rc<dyn Fn(DragTarget) -> bool>>,
}

impl SheetConfig {
    /// Vertical modal sheet: closed, half open, nearly full, dismissable by
    /// swiping down. Interactive children keep their own gestures.
    pub fn sheet() -> Self {
        let mut snap_points = IndexMap::new();
        snap_points.insert(SnapPoint::Closed, 0.0);
        snap_points.insert(SnapPoint::Half, 50.0);
        snap_points.insert(SnapPoint::Full, 90.0);
        Self {
            axis: Axis::Vertical,
            snap_points,
            min_visible_percent: 0.0,
            max_visible_percent: 100.0,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            rubberband_factor: 0.15,
            close_settle_delay_ms: DEFAULT_CLOSE_SETTLE_DELAY_MS,
            swipe_to_dismiss: true,
            reduced_motion: false,
            spring: SpringProfile::settle(),
            excluded_drag_targets: Some(Rc::new(|target| {
                matches!(
                    target,
                    DragTarget::TextInput | DragTarget::Button | DragTarget::Link
                )
            })),
        }
    }

    /// Horizontal swipe-reveal row: fully hidden or fully revealed, with a
    /// softer rubberband because rows sit inside scrolling lists.
    pub fn swipe_row() -> Self {
        let mut snap_points = IndexMap::new();
        snap_points.insert(SnapPoint::Closed, 0.0);
        snap_points.insert(SnapPoint::Full, 100.0);
        Self {
            axis: Axis::Horizontal,
            snap_points,
            min_visible_percent: 0.0,
            max_visible_percent: 100.0,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            rubberband_factor: 0.3,
            close_settle_delay_ms: DEFAULT_CLOSE_SETTLE_DELAY_MS,
            swipe_to_dismiss: true,
            reduced_motion: false,
            spring: SpringProfile::stiff(),
            excluded_drag_targets: Some(Rc::new(|target| {
                matches!(
                    target,
                    DragTarget::TextInput | DragTarget::Button | DragTarget::Link
                )
            })),
        }
    }

    /// Checks every structural invariant the runtime relies on.
    ///
    /// Called by the controller on construction and reconfiguration; hosts
    /// can call it early to fail fast while building a config by hand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snap_points.is_empty() {
            return Err(ConfigError::NoSnapPoints);
        }
        match self.snap_points.get(&SnapPoint::Closed) {
            None => return Err(ConfigError::MissingClosed),
            Some(&percent) if percent != 0.0 => {
                return Err(ConfigError::ClosedNotHidden { value: percent });
            }
            Some(_) => {}
        }
        if !self.snap_points.keys().any(|&point| point != SnapPoint::Closed) {
            return Err(ConfigError::NoOpenPoint);
        }
        for (&point, &percent) in &self.snap_points {
            if !percent.is_finite() {
                return Err(ConfigError::NonFinitePercent { point, value: percent });
            }
            if !(0.0..=100.0).contains(&percent) {
                return Err(ConfigError::PercentOutOfRange { point, value: percent });
            }
        }
        // Snap point names are ordered by how much they reveal; the authored
        // percentages have to agree with that order.
        let mut ordered: Vec<(SnapPoint, f32)> = self
            .snap_points
            .iter()
            .map(|(&point, &percent)| (point, percent))
            .collect();
        ordered.sort_by_key(|&(point, _)| point);
        for pair in ordered.windows(2) {
            let (lower, lower_percent) = pair[0];
            let (upper, upper_percent) = pair[1];
            if lower_percent >= upper_percent {
                return Err(ConfigError::OrderInverted { lower, upper });
            }
        }
        for (name, value) in [
            ("min_visible_percent", self.min_visible_percent),
            ("max_visible_percent", self.max_visible_percent),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::VisibleBoundsOutOfRange { name, value });
            }
        }
        if self.min_visible_percent > self.max_visible_percent {
            return Err(ConfigError::VisibleBoundsInverted {
                min: self.min_visible_percent,
                max: self.max_visible_percent,
            });
        }
        if !self.rubberband_factor.is_finite() || !(0.0..=1.0).contains(&self.rubberband_factor) {
            return Err(ConfigError::RubberbandOutOfRange {
                value: self.rubberband_factor,
            });
        }
        for (name, value) in [
            ("velocity_threshold", self.velocity_threshold),
            ("spring.stiffness", self.spring.stiffness),
            ("spring.friction", self.spring.friction),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveSetting { name, value });
            }
        }
        Ok(())
    }

    /// Close delay with the reduced-motion override applied.
    pub(crate) fn effective_close_delay_ms(&self) -> u64 {
        if self.reduced_motion {
            0
        } else {
            self.close_settle_delay_ms
        }
    }
}

impl std::fmt::Debug for SheetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetConfig")
            .field("axis", &self.axis)
            .field("snap_points", &self.snap_points)
            .field("min_visible_percent", &self.min_visible_percent)
            .field("max_visible_percent", &self.max_visible_percent)
            .field("velocity_threshold", &self.velocity_threshold)
            .field("rubberband_factor", &self.rubberband_factor)
            .field("close_settle_delay_ms", &self.close_settle_delay_ms)
            .field("swipe_to_dismiss", &self.swipe_to_dismiss)
            .field("reduced_motion", &self.reduced_motion)
            .field("spring", &self.spring)
            .field(
                "excluded_drag_targets",
                &self.excluded_drag_targets.as_ref().map(|_| "<predicate>"),
            )
            .finish()
    }
}

/// Why a [`SheetConfig`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    NoSnapPoints,
    MissingClosed,
    /// `Closed` must sit at 0% visible; it is the offset the surface
    /// unmounts from.
    ClosedNotHidden { value: f32 },
    /// At least one point besides `Closed` is required, otherwise there is
    /// nowhere to open to.
    NoOpenPoint,
    NonFinitePercent { point: SnapPoint, value: f32 },
    PercentOutOfRange { point: SnapPoint, value: f32 },
    /// Authored percentages disagree with the snap point order.
    OrderInverted { lower: SnapPoint, upper: SnapPoint },
    VisibleBoundsOutOfRange { name: &'static str, value: f32 },
    VisibleBoundsInverted { min: f32, max: f32 },
    RubberbandOutOfRange { value: f32 },
    NonPositiveSetting { name: &'static str, value: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoSnapPoints => write!(f, "no snap points configured"),
            ConfigError::MissingClosed => write!(f, "snap points must include Closed"),
            ConfigError::ClosedNotHidden { value } => {
                write!(f, "Closed must be 0% visible, got {value}")
            }
            ConfigError::NoOpenPoint => {
                write!(f, "at least one open snap point is required besides Closed")
            }
            ConfigError::NonFinitePercent { point, value } => {
                write!(f, "snap point {point:?} has non-finite visibility {value}")
            }
            ConfigError::PercentOutOfRange { point, value } => {
                write!(f, "snap point {point:?} visibility {value} outside 0..=100")
            }
            ConfigError::OrderInverted { lower, upper } => {
                write!(f, "snap point {lower:?} must be less visible than {upper:?}")
            }
            ConfigError::VisibleBoundsOutOfRange { name, value } => {
                write!(f, "{name} {value} outside 0..=100")
            }
            ConfigError::VisibleBoundsInverted { min, max } => {
                write!(f, "min_visible_percent {min} exceeds max_visible_percent {max}")
            }
            ConfigError::RubberbandOutOfRange { value } => {
                write!(f, "rubberband_factor {value} outside 0..=1")
            }
            ConfigError::NonPositiveSetting { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
