//! Snap geometry and release resolution.
//!
//! A [`SnapLayout`] maps the configured visible percentages onto concrete
//! offsets for one viewport extent. Offsets grow toward hidden: 0 is fully
//! open, `extent` is fully off-screen, so `offset = (1 - visible/100) *
//! extent`. The [`SnapResolver`] picks the point a released drag settles at.

use glisse_motion::TravelBounds;
use smallvec::SmallVec;

use crate::config::SheetConfig;

/// Named resting positions, ordered from least to most visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapPoint {
    /// Fully hidden; the offset the host unmounts from.
    Closed,
    /// A sliver, e.g. a grabber plus one row of content.
    Peek,
    Half,
    Full,
}

/// A snap point resolved against a concrete viewport extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapTarget {
    pub point: SnapPoint,
    /// Visibility after the min/max clamp, in percent.
    pub visible_percent: f32,
    pub offset: f32,
}

/// All configured snap targets for one extent, sorted least visible first.
#[derive(Clone, Debug)]
pub struct SnapLayout {
    targets: SmallVec<[SnapTarget; 4]>,
    bounds: TravelBounds,
    extent: f32,
}

impl SnapLayout {
    /// Resolves `config` against a viewport extent.
    ///
    /// Open points are clamped into the configured visible band before the
    /// percent-to-offset mapping; `Closed` stays at the hidden edge so a
    /// close always leaves the screen entirely.
    pub fn from_config(config: &SheetConfig, extent: f32) -> Self {
        let mut targets: SmallVec<[SnapTarget; 4]> = config
            .snap_points
            .iter()
            .map(|(&point, &percent)| {
                let clamped = if point == SnapPoint::Closed {
                    percent
                } else {
                    percent.clamp(config.min_visible_percent, config.max_visible_percent)
                };
                if clamped != percent {
                    log::debug!("snap point {point:?} clamped from {percent}% to {clamped}%");
                }
                SnapTarget {
                    point,
                    visible_percent: clamped,
                    offset: (1.0 - clamped / 100.0) * extent,
                }
            })
            .collect();
        targets.sort_by_key(|target| target.point);
        let bounds = TravelBounds::new(
            (1.0 - config.max_visible_percent / 100.0) * extent,
            (1.0 - config.min_visible_percent / 100.0) * extent,
        );
        Self {
            targets,
            bounds,
            extent,
        }
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// Offset the surface is fully hidden at.
    pub fn closed_offset(&self) -> f32 {
        self.extent
    }

    /// Drag travel limits derived from the visible band. `Closed` can sit
    /// outside them; transitions may leave the band, drags rubberband at it.
    pub fn bounds(&self) -> TravelBounds {
        self.bounds
    }

    pub fn targets(&self) -> &[SnapTarget] {
        &self.targets
    }

    pub fn offset_of(&self, point: SnapPoint) -> Option<f32> {
        self.targets
            .iter()
            .find(|target| target.point == point)
            .map(|target| target.offset)
    }

    /// Most visible configured point. Layouts always hold at least `Closed`
    /// plus one open point, so this never sees an empty list.
    pub fn most_open(&self) -> SnapTarget {
        self.targets[self.targets.len() - 1]
    }

    /// Configured point geometrically nearest to `offset`, ties toward the
    /// more open point.
    pub fn nearest(&self, offset: f32) -> SnapPoint {
        nearest_of(&self.targets, offset)
    }

    /// Normalized openness: 0 at the closed offset, 1 at the most open
    /// configured point, clamped in between.
    pub fn openness(&self, offset: f32) -> f32 {
        let open = self.most_open().offset;
        let closed = self.closed_offset();
        let span = closed - open;
        if span <= f32::EPSILON {
            return if offset < closed { 1.0 } else { 0.0 };
        }
        ((closed - offset) / span).clamp(0.0, 1.0)
    }
}

/// Walks most-open-first with a strict comparison so an exact tie keeps the
/// more open candidate.
fn nearest_of(candidates: &[SnapTarget], offset: f32) -> SnapPoint {
    let mut best = candidates[candidates.len() - 1];
    let mut best_distance = (offset - best.offset).abs();
    for target in candidates.iter().rev().skip(1) {
        let distance = (offset - target.offset).abs();
        if distance < best_distance {
            best = *target;
            best_distance = distance;
        }
    }
    best.point
}

/// Decides where a released drag settles.
#[derive(Clone, Debug)]
pub struct SnapResolver {
    layout: SnapLayout,
    /// Flick threshold in units per millisecond.
    velocity_threshold: f32,
    swipe_to_dismiss: bool,
}

impl SnapResolver {
    pub fn new(layout: SnapLayout, velocity_threshold: f32, swipe_to_dismiss: bool) -> Self {
        Self {
            layout,
            velocity_threshold,
            swipe_to_dismiss,
        }
    }

    pub fn layout(&self) -> &SnapLayout {
        &self.layout
    }

    /// Swaps the geometry in place after a viewport change, keeping the
    /// release rules as configured.
    pub fn set_layout(&mut self, layout: SnapLayout) {
        self.layout = layout;
    }

    /// Picks the settle point for a release at `offset` with `velocity` in
    /// units per millisecond.
    ///
    /// A flick past the threshold moves exactly one point along its
    /// direction from `current`, regardless of where the finger let go; the
    /// surface never tunnels through an intermediate stop. Anything slower
    /// snaps to the nearest candidate, ties toward the more open one.
    /// `Closed` is only a gesture candidate when the config allows dismissal.
    pub fn resolve(&self, offset: f32, velocity: f32, current: SnapPoint) -> SnapPoint {
        let candidates: SmallVec<[SnapTarget; 4]> = self
            .layout
            .targets
            .iter()
            .filter(|target| self.swipe_to_dismiss || target.point != SnapPoint::Closed)
            .copied()
            .collect();
        if candidates.is_empty() {
            // Only reachable through a config that validation rejects.
            log::warn!("no snap candidates for release, staying at {current:?}");
            return current;
        }
        if velocity.abs() > self.velocity_threshold {
            // Offsets shrink as the surface opens, so negative velocity
            // travels toward open.
            let toward_open = velocity < 0.0;
            let position = candidates
                .iter()
                .position(|target| target.point == current);
            let index = match (position, toward_open) {
                (Some(index), true) => (index + 1).min(candidates.len() - 1),
                (Some(index), false) => index.saturating_sub(1),
                // `current` filtered out (Closed with dismissal off): the
                // conceptual index sits below every candidate.
                (None, true) => 0,
                (None, false) => return current,
            };
            let chosen = candidates[index].point;
            log::debug!(
                "flick at {velocity:.2} units/ms from {current:?} resolves to {chosen:?}"
            );
            return chosen;
        }
        nearest_of(&candidates, offset)
    }
}
