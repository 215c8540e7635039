//! Closed ray parameter ranges used by the slab test.

/// Closed interval [min, max] of ray parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl Interval {
    /// Every parameter in front of the ray origin.
    pub const FORWARD: Interval = Interval {
        min: 0.0,
        max: f32::INFINITY,
    };

    /// Interval spanned by two values in either order.
    ///
    /// NaN inputs (0 * inf on a slab boundary) collapse to the other bound.
    pub fn spanning(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Overlap of two intervals, empty if they are disjoint.
    pub fn intersect(&self, other: Interval) -> Self {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// True when no value lies in the interval.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}
