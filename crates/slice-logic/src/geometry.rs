//! Slice plane geometry.
//!
//! # Coordinate frames
//!
//! ```text
//! XY     pixel grid of the view, (0, 0) at a corner, z = 0
//! Slice  millimetres in the plane, origin at the grid centre
//! RAS    patient world space
//! IJK    continuous voxel indices of a volume
//! ```
//!
//! `XYToSlice` scales pixels by `fov / dims` and shifts by `-fov / 2`, so
//! the pixel `(w / 2, h / 2)` lands on the plane origin. `SliceToRAS` comes
//! from the slice node. Reslicing a volume uses
//! `XYToIJK = RASToIJK * SliceToRAS * XYToSlice`.

use crate::traits::GeometryProvider;
use crate::{LogicError, LogicResult};
use slice_core::{Bounds, TimeStamp, Volume};
use slice_math::{Mat4, Vec3, nearly_equal};
use slice_scene::SliceNode;
use tracing::{debug, trace};

/// Smallest extent or spacing handed out by the geometry accessors.
pub const MIN_EXTENT: f64 = 1e-6;

/// Orientation presets of the standard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Normal along S; rows run right-to-left, columns posterior-to-anterior.
    Axial,
    /// Normal along R; rows run P-to-A, columns I-to-S.
    Sagittal,
    /// Normal along A; rows run right-to-left, columns I-to-S.
    Coronal,
}

impl Orientation {
    /// All presets.
    pub const ALL: [Orientation; 3] = [Self::Axial, Self::Sagittal, Self::Coronal];

    /// Parses a preset name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(name))
    }

    /// Preset name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Axial => "Axial",
            Self::Sagittal => "Sagittal",
            Self::Coronal => "Coronal",
        }
    }

    /// Row direction, column direction and normal in RAS.
    pub fn axes(self) -> (Vec3, Vec3, Vec3) {
        match self {
            Self::Axial => (Vec3::new(-1.0, 0.0, 0.0), Vec3::Y, Vec3::Z),
            Self::Sagittal => (Vec3::Y, Vec3::Z, Vec3::X),
            Self::Coronal => (Vec3::new(-1.0, 0.0, 0.0), Vec3::Z, Vec3::Y),
        }
    }
}

/// Looks up the preset for a layout name.
pub fn plane_from_layout(name: &str) -> LogicResult<Orientation> {
    Orientation::from_name(name).ok_or_else(|| LogicError::UnknownLayout(name.into()))
}

/// Value description of a slice plane and its pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    /// Plane-to-world transform; columns are row, column, normal and origin.
    pub slice_to_ras: Mat4,
    /// In-plane extent in millimetres.
    pub field_of_view: Vec3,
    /// Output pixel grid.
    pub dimensions: [u32; 3],
}

impl Default for PlaneGeometry {
    fn default() -> Self {
        let (x, y, z) = Orientation::Axial.axes();
        Self {
            slice_to_ras: Mat4::from_axes(x, y, z, Vec3::ZERO),
            field_of_view: Vec3::new(250.0, 250.0, 1.0),
            dimensions: [256, 256, 1],
        }
    }
}

impl PlaneGeometry {
    /// Geometry currently stored on `node`.
    pub fn from_node(node: &SliceNode) -> Self {
        Self {
            slice_to_ras: node.slice_to_ras(),
            field_of_view: node.field_of_view(),
            dimensions: node.dimensions(),
        }
    }

    /// Writes this geometry to `node`.
    pub fn apply_to(&self, node: &mut SliceNode) -> slice_scene::SceneResult<()> {
        node.set_slice_to_ras(self.slice_to_ras)?;
        node.set_field_of_view(self.field_of_view)?;
        node.set_dimensions(self.dimensions)
    }

    /// In-plane x axis.
    pub fn row_direction(&self) -> Vec3 {
        self.slice_to_ras.axis(0)
    }

    /// In-plane y axis.
    pub fn column_direction(&self) -> Vec3 {
        self.slice_to_ras.axis(1)
    }

    /// Plane normal.
    pub fn normal(&self) -> Vec3 {
        self.slice_to_ras.axis(2)
    }

    /// Plane origin.
    pub fn origin(&self) -> Vec3 {
        self.slice_to_ras.translation()
    }

    /// Millimetres per pixel.
    pub fn pixel_spacing(&self) -> Vec3 {
        let [w, h, d] = self.dimensions;
        Vec3::new(
            self.field_of_view.x / w.max(1) as f64,
            self.field_of_view.y / h.max(1) as f64,
            self.field_of_view.z / d.max(1) as f64,
        )
    }

    /// Pixel to plane millimetres.
    pub fn xy_to_slice(&self) -> Mat4 {
        let fov = self.field_of_view;
        Mat4::from_scale_translation(
            self.pixel_spacing(),
            Vec3::new(-fov.x * 0.5, -fov.y * 0.5, 0.0),
        )
    }

    /// Pixel to world.
    pub fn xy_to_ras(&self) -> Mat4 {
        self.slice_to_ras.mul_mat(&self.xy_to_slice())
    }

    /// Pixel to continuous voxel index of `volume`.
    ///
    /// `None` if the volume geometry cannot be inverted.
    pub fn xy_to_ijk(&self, volume: &Volume) -> Option<Mat4> {
        Some(volume.ras_to_ijk()?.mul_mat(&self.xy_to_ras()))
    }

    /// World-to-plane rotation, ignoring the plane position.
    ///
    /// Values measured with it do not depend on the slice offset.
    pub fn ras_to_slice_rotation(&self) -> Option<Mat4> {
        self.slice_to_ras.with_translation(Vec3::ZERO).inverse()
    }

    /// Plane corners in RAS, counter-clockwise from the pixel origin corner.
    pub fn corners(&self) -> [Vec3; 4] {
        let [w, h, _] = self.dimensions;
        let (w, h) = (w as f64, h as f64);
        let m = self.xy_to_ras();
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)].map(|(x, y)| m.transform_point(Vec3::new(x, y, 0.0)))
    }

    /// Same geometry with the preset axes; origin, FOV and dimensions are kept.
    pub fn with_orientation(&self, orientation: Orientation) -> Self {
        let (x, y, z) = orientation.axes();
        Self {
            slice_to_ras: Mat4::from_axes(x, y, z, self.origin()),
            ..*self
        }
    }
}

/// RAS extent and centre of the voxel-edge box of `volume`.
pub fn ras_box(volume: &Volume) -> (Vec3, Vec3) {
    let b = volume.ras_bounds();
    (b.dimensions(), b.center())
}

/// Current plane with a version that advances on every effective change.
#[derive(Debug, Clone)]
pub struct SliceGeometryState {
    plane: PlaneGeometry,
    version: TimeStamp,
}

impl Default for SliceGeometryState {
    fn default() -> Self {
        Self::new(PlaneGeometry::default())
    }
}

impl SliceGeometryState {
    /// Starts at `plane`.
    pub fn new(plane: PlaneGeometry) -> Self {
        Self {
            plane,
            version: TimeStamp::now(),
        }
    }

    /// Replaces the plane; returns false (and keeps the version) if it is equal.
    pub fn set_plane(&mut self, plane: PlaneGeometry) -> bool {
        if plane == self.plane {
            trace!("plane unchanged");
            return false;
        }
        self.plane = plane;
        self.version.modified();
        debug!(
            origin = ?self.plane.origin().to_array(),
            fov = ?self.plane.field_of_view.to_array(),
            dims = ?self.plane.dimensions,
            "plane changed"
        );
        true
    }

    /// Pulls the plane from `node`; true if it changed.
    pub fn sync_from_node(&mut self, node: &SliceNode) -> bool {
        self.set_plane(PlaneGeometry::from_node(node))
    }

    /// Plane obtained by applying the preset named `layout` to the current one.
    pub fn compute_plane_from_layout(&self, layout: &str) -> LogicResult<PlaneGeometry> {
        Ok(self.plane.with_orientation(plane_from_layout(layout)?))
    }

    /// Moves the plane along its normal; false if the offset is already `offset`.
    ///
    /// Orientation and field of view never change. Offsets within rounding
    /// of the current one count as equal.
    pub fn set_offset(&mut self, offset: f64) -> LogicResult<bool> {
        if !offset.is_finite() {
            return Err(LogicError::InvalidArgument(format!("offset {} is not finite", offset)));
        }
        let current = self.offset();
        if nearly_equal(offset, current) {
            return Ok(false);
        }
        let delta = offset - current;
        let origin = self.plane.origin() + self.plane.normal() * delta;
        let plane = PlaneGeometry {
            slice_to_ras: self.plane.slice_to_ras.with_translation(origin),
            ..self.plane
        };
        Ok(self.set_plane(plane))
    }

    /// Slice-space extent and centre of the voxel-edge box of `volume`.
    ///
    /// Measured with the plane rotation only, so independent of the offset.
    pub fn slice_dimensions(&self, volume: &Volume) -> (Vec3, Vec3) {
        let b = self.slice_bounds(Some(volume));
        if !b.is_valid() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        (b.dimensions(), b.center())
    }

    /// Plane fitted to `volume` for a `width x height` view.
    ///
    /// The longer in-plane extent of the volume fills the view, the other
    /// axis follows the view aspect ratio. The origin moves to the volume
    /// centre; orientation is kept.
    pub fn fit_to_volume(&self, volume: &Volume, width: u32, height: u32) -> LogicResult<PlaneGeometry> {
        if width == 0 || height == 0 {
            return Err(LogicError::InvalidArgument(format!(
                "fit target must be non-empty, got {}x{}",
                width, height
            )));
        }
        let (ras_dims, ras_center) = ras_box(volume);
        let (slice_dims, _) = self.slice_dimensions(volume);
        let spacing = self.spacing(Some(volume));
        let (w, h) = (width as f64, height as f64);

        let display_x = slice_dims.x.abs().max(MIN_EXTENT);
        let display_y = slice_dims.y.abs().max(MIN_EXTENT);
        let (mut fit_x, mut fit_y) = (display_x, display_y);

        if h > w {
            let pixel_size = fit_x / w;
            fit_y = pixel_size * h;
        } else {
            let pixel_size = fit_y / h;
            fit_x = pixel_size * w;
        }
        // Neither axis may crop the volume
        if display_x > fit_x {
            fit_y /= fit_x / display_x;
            fit_x = display_x;
        }
        if display_y > fit_y {
            fit_x /= fit_y / display_y;
            fit_y = display_y;
        }

        let depth = self.plane.dimensions[2];
        let fit_z = (spacing.z * depth as f64).max(MIN_EXTENT);
        debug!(
            width,
            height,
            fov_x = fit_x,
            fov_y = fit_y,
            fov_z = fit_z,
            ras_extent = ?ras_dims.to_array(),
            "fit plane to volume"
        );

        Ok(PlaneGeometry {
            slice_to_ras: self.plane.slice_to_ras.with_translation(ras_center),
            field_of_view: Vec3::new(fit_x, fit_y, fit_z),
            dimensions: [width, height, depth],
        })
    }
}

impl GeometryProvider for SliceGeometryState {
    fn plane(&self) -> &PlaneGeometry {
        &self.plane
    }

    fn version(&self) -> TimeStamp {
        self.version
    }

    fn offset(&self) -> f64 {
        self.plane.normal().dot(self.plane.origin())
    }

    fn spacing(&self, background: Option<&Volume>) -> Vec3 {
        let (Some(vol), Some(ras_to_slice)) = (background, self.plane.ras_to_slice_rotation()) else {
            return Vec3::ONE;
        };
        let step = vol.ijk_to_ras().transform_vector(Vec3::ONE);
        let s = ras_to_slice.transform_vector(step).abs();
        Vec3::new(s.x.max(MIN_EXTENT), s.y.max(MIN_EXTENT), s.z.max(MIN_EXTENT))
    }

    fn slice_bounds(&self, background: Option<&Volume>) -> Bounds {
        let (Some(vol), Some(ras_to_slice)) = (background, self.plane.ras_to_slice_rotation()) else {
            return Bounds::invalid();
        };
        let m = ras_to_slice.mul_mat(&vol.ijk_to_ras());
        Bounds::from_points(vol.ijk_bounds().corners().map(|c| m.transform_point(c)))
    }
}
