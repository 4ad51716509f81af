//! Polygonal data: points with line and polygon cells.
//!
//! [`PolyData`] carries both the slice-plane mesh shown in 3D views and
//! the glyph overlays drawn on top of a slice. Optional per-point scalars
//! drive lookup-table colouring, optional texture coordinates map the
//! composite slice image onto the plane mesh.

use crate::{Bounds, TimeStamp};
use slice_math::Vec3;

/// Points, cells and optional per-point attributes.
#[derive(Debug, Clone, Default)]
pub struct PolyData {
    points: Vec<Vec3>,
    lines: Vec<[u32; 2]>,
    polygons: Vec<Vec<u32>>,
    scalars: Option<Vec<f32>>,
    tcoords: Option<Vec<[f32; 2]>>,
    mtime: TimeStamp,
}

impl PolyData {
    /// Creates an empty data set.
    pub fn new() -> Self {
        Self {
            mtime: TimeStamp::now(),
            ..Self::default()
        }
    }

    /// Appends a point and returns its index.
    pub fn push_point(&mut self, p: Vec3) -> u32 {
        self.points.push(p);
        self.mtime.modified();
        (self.points.len() - 1) as u32
    }

    /// Appends a two-point line cell.
    pub fn push_line(&mut self, a: u32, b: u32) {
        self.lines.push([a, b]);
        self.mtime.modified();
    }

    /// Appends a polygon cell.
    pub fn push_polygon(&mut self, ids: impl Into<Vec<u32>>) {
        self.polygons.push(ids.into());
        self.mtime.modified();
    }

    /// Attaches per-point scalars.
    pub fn set_scalars(&mut self, scalars: Vec<f32>) {
        self.scalars = Some(scalars);
        self.mtime.modified();
    }

    /// Attaches per-point texture coordinates.
    pub fn set_tcoords(&mut self, tcoords: Vec<[f32; 2]>) {
        self.tcoords = Some(tcoords);
        self.mtime.modified();
    }

    /// All points.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Line cells.
    pub fn lines(&self) -> &[[u32; 2]] {
        &self.lines
    }

    /// Polygon cells.
    pub fn polygons(&self) -> &[Vec<u32>] {
        &self.polygons
    }

    /// Per-point scalars, if any.
    pub fn scalars(&self) -> Option<&[f32]> {
        self.scalars.as_deref()
    }

    /// Per-point texture coordinates, if any.
    pub fn tcoords(&self) -> Option<&[[f32; 2]]> {
        self.tcoords.as_deref()
    }

    /// Number of points.
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of line and polygon cells.
    pub fn number_of_cells(&self) -> usize {
        self.lines.len() + self.polygons.len()
    }

    /// True when there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounds of all points.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.points.iter().copied())
    }

    /// Modification time.
    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }
}

impl PartialEq for PolyData {
    /// Equal geometry and attributes; the modification time is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.lines == other.lines
            && self.polygons == other.polygons
            && self.scalars == other.scalars
            && self.tcoords == other.tcoords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_quad() {
        let mut pd = PolyData::new();
        let ids: Vec<u32> = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::Y,
        ]
        .into_iter()
        .map(|p| pd.push_point(p))
        .collect();
        pd.push_polygon(ids);
        assert_eq!(pd.number_of_points(), 4);
        assert_eq!(pd.number_of_cells(), 1);
        assert_eq!(pd.bounds().dimensions(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_mtime_advances() {
        let mut pd = PolyData::new();
        let t0 = pd.mtime();
        pd.push_point(Vec3::ZERO);
        assert!(pd.mtime() > t0);
    }
}
