//! Travel bounds and rubberband resistance.

/// Permitted offset range before resistance applies. Replaced wholesale on
/// every viewport recomputation, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelBounds {
    pub min: f32,
    pub max: f32,
}

impl TravelBounds {
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, offset: f32) -> bool {
        (self.min..=self.max).contains(&offset)
    }

    /// Compresses offsets beyond the bounds: the overshoot is scaled by
    /// `factor` (0 = hard stop at the bound, 1 = no resistance). Offsets
    /// inside the bounds pass through unchanged.
    pub fn rubberband(&self, offset: f32, factor: f32) -> f32 {
        if offset < self.min {
            self.min - (self.min - offset) * factor
        } else if offset > self.max {
            self.max + (offset - self.max) * factor
        } else {
            offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: TravelBounds = TravelBounds {
        min: 100.0,
        max: 900.0,
    };

    #[test]
    fn inside_bounds_is_unchanged() {
        for offset in [100.0, 420.0, 900.0] {
            assert_eq!(BOUNDS.rubberband(offset, 0.15), offset);
        }
    }

    #[test]
    fn boundary_is_a_fixed_point_for_any_factor() {
        for factor in [0.0, 0.15, 0.3, 0.5, 1.0] {
            assert_eq!(BOUNDS.rubberband(BOUNDS.max, factor), BOUNDS.max);
            assert_eq!(BOUNDS.rubberband(BOUNDS.min, factor), BOUNDS.min);
        }
    }

    #[test]
    fn overshoot_is_compressed_and_monotone() {
        let factor = 0.15;
        let mut last = BOUNDS.max;
        for requested_overshoot in [1.0f32, 10.0, 50.0, 200.0, 1000.0] {
            let adjusted = BOUNDS.rubberband(BOUNDS.max + requested_overshoot, factor);
            let returned_overshoot = adjusted - BOUNDS.max;
            assert!(returned_overshoot < requested_overshoot);
            assert!(returned_overshoot > 0.0);
            assert!(adjusted >= last, "not monotone at {requested_overshoot}");
            last = adjusted;
        }
    }

    #[test]
    fn factor_zero_is_a_hard_stop() {
        assert_eq!(BOUNDS.rubberband(1500.0, 0.0), BOUNDS.max);
        assert_eq!(BOUNDS.rubberband(-300.0, 0.0), BOUNDS.min);
    }

    #[test]
    fn factor_one_passes_through() {
        assert_eq!(BOUNDS.rubberband(1500.0, 1.0), 1500.0);
        assert_eq!(BOUNDS.rubberband(-300.0, 1.0), -300.0);
    }

    #[test]
    fn below_min_mirrors_above_max() {
        let above = BOUNDS.rubberband(BOUNDS.max + 40.0, 0.3) - BOUNDS.max;
        let below = BOUNDS.min - BOUNDS.rubberband(BOUNDS.min - 40.0, 0.3);
        assert!((above - below).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_endpoints_are_reordered() {
        let bounds = TravelBounds::new(900.0, 100.0);
        assert_eq!(bounds.min, 100.0);
        assert_eq!(bounds.max, 900.0);
    }
}
