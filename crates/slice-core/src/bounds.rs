//! Axis-aligned bounding boxes.
//!
//! [`Bounds`] stores `[xmin, xmax, ymin, ymax, zmin, zmax]`. An empty box
//! is represented explicitly by [`Bounds::invalid`] (min > max on every
//! axis); it is the sentinel returned by geometry queries when there is
//! nothing to measure.
//!
//! ```rust
//! use slice_core::Bounds;
//! use slice_math::Vec3;
//!
//! let mut b = Bounds::invalid();
//! assert!(!b.is_valid());
//! b.include(Vec3::new(1.0, 2.0, 3.0));
//! b.include(Vec3::new(-1.0, 0.0, 5.0));
//! assert_eq!(b.dimensions(), Vec3::new(2.0, 2.0, 2.0));
//! ```

use slice_math::Vec3;

/// Min/max extents on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Bounds {
    /// The empty box.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            min: Vec3::splat(f64::INFINITY),
            max: Vec3::splat(f64::NEG_INFINITY),
        }
    }

    /// Creates a box from two corners (order-independent).
    #[inline]
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Tight box around a set of points; invalid when the iterator is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut b = Self::invalid();
        for p in points {
            b.include(p);
        }
        b
    }

    /// Grows the box to contain `p`. Non-finite points are ignored.
    #[inline]
    pub fn include(&mut self, p: Vec3) {
        if !p.is_finite() {
            return;
        }
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        match (self.is_valid(), other.is_valid()) {
            (false, _) => *other,
            (_, false) => *self,
            _ => Self {
                min: self.min.min(other.min),
                max: self.max.max(other.max),
            },
        }
    }

    /// True when min <= max on every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Extent on each axis; zero for an invalid box.
    #[inline]
    pub fn dimensions(&self) -> Vec3 {
        if self.is_valid() { self.max - self.min } else { Vec3::ZERO }
    }

    /// Centre of the box; zero for an invalid box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        if self.is_valid() { (self.min + self.max) * 0.5 } else { Vec3::ZERO }
    }

    /// The eight corners, x varying fastest.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        })
    }

    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::invalid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bounds() {
        let b = Bounds::invalid();
        assert!(!b.is_valid());
        assert_eq!(b.dimensions(), Vec3::ZERO);
        assert_eq!(b.center(), Vec3::ZERO);
        assert!(!Bounds::from_points(std::iter::empty()).is_valid());
    }

    #[test]
    fn test_union_with_invalid() {
        let a = Bounds::from_corners(Vec3::ZERO, Vec3::ONE);
        assert_eq!(a.union(&Bounds::invalid()), a);
        assert_eq!(Bounds::invalid().union(&a), a);
    }

    #[test]
    fn test_corners() {
        let b = Bounds::from_corners(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let c = b.corners();
        assert_eq!(c[0], Vec3::ZERO);
        assert_eq!(c[7], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Bounds::from_points(c), b);
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut b = Bounds::invalid();
        b.include(Vec3::new(f64::NAN, 0.0, 0.0));
        assert!(!b.is_valid());
    }
}
