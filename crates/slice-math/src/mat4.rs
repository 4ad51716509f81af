//! 4x4 affine matrix type for spatial transforms.
//!
//! [`Mat4`] carries every coordinate-frame change in the slice pipeline:
//! `IJKToRAS` of a volume, `SliceToRAS` of a slice plane, `XYToSlice`
//! for the pixel grid and their products.
//!
//! # Convention
//!
//! Matrices use **column vectors**. The first three columns are the images
//! of the unit axes, the fourth column is the translation:
//!
//! ```text
//! | x0 y0 z0 t0 |   | u |
//! | x1 y1 z1 t1 | * | v |
//! | x2 y2 z2 t2 |   | w |
//! |  0  0  0  1 |   | 1 |
//! ```

use crate::Vec3;
use std::ops::Mul;

/// A 4x4 affine matrix backed by [`glam::DMat4`].
///
/// # Example
///
/// ```rust
/// use slice_math::{Mat4, Vec3};
///
/// let m = Mat4::from_scale_translation(Vec3::new(2.0, 2.0, 2.0), Vec3::new(1.0, 0.0, 0.0));
/// let inv = m.inverse().unwrap();
/// let p = Vec3::new(3.0, 4.0, 5.0);
/// assert!(inv.transform_point(m.transform_point(p)).abs_diff_eq(p, 1e-12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    inner: ::glam::DMat4,
}

impl Mat4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        inner: ::glam::DMat4::IDENTITY,
    };

    /// Creates a matrix from three axis columns and a translation column.
    #[inline]
    pub fn from_axes(x: Vec3, y: Vec3, z: Vec3, translation: Vec3) -> Self {
        Self {
            inner: ::glam::DMat4::from_cols(
                x.to_glam().extend(0.0),
                y.to_glam().extend(0.0),
                z.to_glam().extend(0.0),
                translation.to_glam().extend(1.0),
            ),
        }
    }

    /// Creates a matrix from row arrays.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slice_math::Mat4;
    ///
    /// let m = Mat4::from_rows([
    ///     [1.0, 0.0, 0.0, 0.0],
    ///     [0.0, 1.0, 0.0, 0.0],
    ///     [0.0, 0.0, 1.0, 0.0],
    ///     [0.0, 0.0, 0.0, 1.0],
    /// ]);
    /// assert_eq!(m, Mat4::IDENTITY);
    /// ```
    #[inline]
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let m = ::glam::DMat4::from_cols_array_2d(&rows);
        Self { inner: m.transpose() }
    }

    /// Creates a scale followed by a translation.
    #[inline]
    pub fn from_scale_translation(scale: Vec3, translation: Vec3) -> Self {
        Self::from_axes(
            Vec3::X * scale.x,
            Vec3::Y * scale.y,
            Vec3::Z * scale.z,
            translation,
        )
    }

    /// Returns element at `(row, col)`.
    #[inline]
    pub fn element(&self, row: usize, col: usize) -> f64 {
        self.inner.col(col)[row]
    }

    /// Returns column `i` (0..3) without its homogeneous component.
    #[inline]
    pub fn axis(&self, i: usize) -> Vec3 {
        Vec3::from_glam(self.inner.col(i).truncate())
    }

    /// Returns the translation column.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.axis(3)
    }

    /// Returns a copy with the translation column replaced.
    #[inline]
    pub fn with_translation(&self, t: Vec3) -> Self {
        Self::from_axes(self.axis(0), self.axis(1), self.axis(2), t)
    }

    /// Returns a copy with the translation removed (rotation/scale part only).
    #[inline]
    pub fn linear_part(&self) -> Self {
        self.with_translation(Vec3::ZERO)
    }

    /// Transforms a point (w = 1).
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::from_glam(self.inner.transform_point3(p.to_glam()))
    }

    /// Transforms a direction (w = 0).
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        Vec3::from_glam(self.inner.transform_vector3(v.to_glam()))
    }

    /// Determinant of the matrix.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.inner.determinant()
    }

    /// Computes the inverse matrix.
    ///
    /// Returns `None` if the matrix is singular or not finite.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inner = self.inner.inverse();
        if inner.is_finite() { Some(Self { inner }) } else { None }
    }

    /// Multiplies two matrices (`self * other`).
    #[inline]
    pub fn mul_mat(&self, other: &Self) -> Self {
        Self {
            inner: self.inner * other.inner,
        }
    }

    /// Returns true if all elements are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.inner.is_finite()
    }

    /// Element-wise approximate equality.
    #[inline]
    pub fn abs_diff_eq(&self, other: &Self, eps: f64) -> bool {
        self.inner.abs_diff_eq(other.inner, eps)
    }

    /// Converts to glam DMat4.
    #[inline]
    pub fn to_glam(&self) -> ::glam::DMat4 {
        self.inner
    }

    /// Creates from glam DMat4.
    #[inline]
    pub fn from_glam(m: ::glam::DMat4) -> Self {
        Self { inner: m }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_mat(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat4_from_rows_matches_axes() {
        let m = Mat4::from_rows([
            [1.0, 4.0, 7.0, 10.0],
            [2.0, 5.0, 8.0, 11.0],
            [3.0, 6.0, 9.0, 12.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        assert_eq!(m.axis(0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.axis(1), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(m.translation(), Vec3::new(10.0, 11.0, 12.0));
        assert_eq!(m.element(0, 3), 10.0);
    }

    #[test]
    fn test_mat4_point_vs_vector() {
        let m = Mat4::from_scale_translation(Vec3::ONE, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(m.transform_point(Vec3::ZERO), Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(m.transform_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_mat4_singular() {
        let m = Mat4::from_scale_translation(Vec3::new(1.0, 0.0, 1.0), Vec3::ZERO);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_mat4_mul_order() {
        let scale = Mat4::from_scale_translation(Vec3::splat(2.0), Vec3::ZERO);
        let shift = Mat4::from_scale_translation(Vec3::ONE, Vec3::new(1.0, 0.0, 0.0));
        // shift applied after scale
        let p = (shift * scale).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_mat4_linear_part() {
        let m = Mat4::from_scale_translation(Vec3::splat(3.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.linear_part().translation(), Vec3::ZERO);
        assert_eq!(m.linear_part().axis(0), Vec3::new(3.0, 0.0, 0.0));
    }
}
