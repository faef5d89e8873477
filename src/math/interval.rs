//! Time intervals

/// A range of real numbers with independently inclusive/exclusive bounds.
///
/// Either bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
    pub min_inclusive: bool,
    pub max_inclusive: bool,
}

impl Interval {
    /// Closed interval `[a, b]`; the bounds are swapped if given in reverse
    pub fn closed(a: f64, b: f64) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self {
            min,
            max,
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    /// Open interval `(a, b)`
    pub fn open(a: f64, b: f64) -> Self {
        Self {
            min_inclusive: false,
            max_inclusive: false,
            ..Self::closed(a, b)
        }
    }

    /// Strictly-future times: `(eps, ∞)`
    pub fn future(eps: f64) -> Self {
        Self::open(eps, f64::INFINITY)
    }

    /// The whole real line
    pub fn everything() -> Self {
        Self::open(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn contains(&self, v: f64) -> bool {
        let above = if self.min_inclusive { v >= self.min } else { v > self.min };
        let below = if self.max_inclusive { v <= self.max } else { v < self.max };
        above && below
    }

    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_bounded(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Same interval with the upper bound lowered to `new_max` (if smaller)
    pub fn restrict_max(&self, new_max: f64) -> Self {
        if new_max < self.max {
            Self {
                max: new_max,
                max_inclusive: true,
                ..*self
            }
        } else {
            *self
        }
    }

    /// Same interval with the lower bound raised to `new_min` (if larger)
    pub fn restrict_min(&self, new_min: f64) -> Self {
        if new_min > self.min {
            Self {
                min: new_min,
                min_inclusive: true,
                ..*self
            }
        } else {
            *self
        }
    }

    /// Overlap of two intervals, `None` if they are disjoint
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let (min, min_inclusive) = if self.min > other.min {
            (self.min, self.min_inclusive)
        } else if other.min > self.min {
            (other.min, other.min_inclusive)
        } else {
            (self.min, self.min_inclusive && other.min_inclusive)
        };
        let (max, max_inclusive) = if self.max < other.max {
            (self.max, self.max_inclusive)
        } else if other.max < self.max {
            (other.max, other.max_inclusive)
        } else {
            (self.max, self.max_inclusive && other.max_inclusive)
        };
        if min > max || (min == max && !(min_inclusive && max_inclusive)) {
            return None;
        }
        Some(Interval {
            min,
            max,
            min_inclusive,
            max_inclusive,
        })
    }
}
