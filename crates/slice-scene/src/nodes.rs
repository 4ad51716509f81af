//! Scene node types.
//!
//! | Node                   | Describes                                        |
//! |------------------------|--------------------------------------------------|
//! | [`SliceNode`]          | plane geometry of one slice view                 |
//! | [`SliceCompositeNode`] | which volumes fill each layer role, and opacities |
//! | [`VolumeNode`]         | voxel data plus display properties               |
//! | [`ModelNode`]          | a mesh shown in 3D views                         |
//! | [`ModelDisplayNode`]   | colour, opacity, visibility and texture of a mesh |
//!
//! Nodes compare by value. The scene uses that to decide whether a
//! mutation is effective and must be announced.

use crate::{NodeId, SceneError, SceneResult};
use slice_core::{Image2D, LookupTable, PolyData, Volume};
use slice_math::{Mat4, Vec3, nearly_equal};
use std::fmt;

/// Tolerance for unit length and orthogonality of slice axes.
pub const ORTHONORMAL_EPSILON: f64 = 1e-6;

/// Discriminant of [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// [`SliceNode`]
    Slice,
    /// [`SliceCompositeNode`]
    SliceComposite,
    /// [`VolumeNode`]
    Volume,
    /// [`ModelNode`]
    Model,
    /// [`ModelDisplayNode`]
    ModelDisplay,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Slice => "slice node",
            Self::SliceComposite => "slice composite node",
            Self::Volume => "volume node",
            Self::Model => "model node",
            Self::ModelDisplay => "model display node",
        })
    }
}

/// Layer stack position of a volume in a slice view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// Base layer, drawn opaque.
    Background,
    /// Blended over the background.
    Foreground,
    /// Label map, blended last.
    Label,
}

impl LayerRole {
    /// All roles in compositing order.
    pub const ALL: [LayerRole; 3] = [Self::Background, Self::Foreground, Self::Label];

    /// Position in [`LayerRole::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Foreground => 1,
            Self::Label => 2,
        }
    }

    /// Lower-case role name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Foreground => "foreground",
            Self::Label => "label",
        }
    }
}

/// How a slice view combines its layers.
///
/// Only [`CompositingMode::Opacity`] has a blending implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositingMode {
    /// Alpha blending with per-layer opacity.
    #[default]
    Opacity,
    /// Foreground drawn as outlines.
    Outline,
    /// Alternating background/foreground tiles.
    Checkerboard,
    /// Vector glyphs on top of the background.
    Glyph,
}

/// Plane geometry of one slice view.
///
/// `SliceToRAS` columns hold the row direction, column direction, normal
/// and origin of the plane. The three directions stay orthonormal, the
/// field of view and pixel dimensions stay strictly positive: setters that
/// would break this return [`SceneError::InvalidAttribute`] and leave the
/// node unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceNode {
    layout_name: String,
    slice_to_ras: Mat4,
    field_of_view: Vec3,
    dimensions: [u32; 3],
}

impl SliceNode {
    /// Identity plane, 250 mm field of view, 256x256 pixels.
    pub fn new(layout_name: impl Into<String>) -> Self {
        Self {
            layout_name: layout_name.into(),
            slice_to_ras: Mat4::IDENTITY,
            field_of_view: Vec3::new(250.0, 250.0, 1.0),
            dimensions: [256, 256, 1],
        }
    }

    /// View this node belongs to.
    pub fn layout_name(&self) -> &str {
        &self.layout_name
    }

    /// Plane-to-world transform.
    pub fn slice_to_ras(&self) -> Mat4 {
        self.slice_to_ras
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

    /// Plane origin in RAS.
    pub fn origin(&self) -> Vec3 {
        self.slice_to_ras.translation()
    }

    /// Field of view in millimetres.
    pub fn field_of_view(&self) -> Vec3 {
        self.field_of_view
    }

    /// Output pixel grid.
    pub fn dimensions(&self) -> [u32; 3] {
        self.dimensions
    }

    /// Signed distance of the plane from the RAS origin along its normal.
    pub fn offset(&self) -> f64 {
        self.normal().dot(self.origin())
    }

    /// Replaces the whole plane transform.
    pub fn set_slice_to_ras(&mut self, m: Mat4) -> SceneResult<()> {
        check_orthonormal(m.axis(0), m.axis(1), m.axis(2))?;
        check_finite(m.translation(), "origin")?;
        self.slice_to_ras = m;
        Ok(())
    }

    /// Replaces the three axes, keeping the origin.
    pub fn set_orientation(&mut self, row: Vec3, column: Vec3, normal: Vec3) -> SceneResult<()> {
        check_orthonormal(row, column, normal)?;
        self.slice_to_ras = Mat4::from_axes(row, column, normal, self.origin());
        Ok(())
    }

    /// Moves the plane origin.
    pub fn set_origin(&mut self, origin: Vec3) -> SceneResult<()> {
        check_finite(origin, "origin")?;
        self.slice_to_ras = self.slice_to_ras.with_translation(origin);
        Ok(())
    }

    /// Moves the plane along its normal so that [`offset`](Self::offset) becomes `offset`.
    ///
    /// Orientation and field of view are untouched. An offset within rounding
    /// of the current one is a no-op.
    pub fn set_offset(&mut self, offset: f64) -> SceneResult<()> {
        if !offset.is_finite() {
            return Err(SceneError::InvalidAttribute(format!("offset {} is not finite", offset)));
        }
        let current = self.offset();
        if nearly_equal(offset, current) {
            return Ok(());
        }
        let delta = offset - current;
        let origin = self.origin() + self.normal() * delta;
        self.set_origin(origin)
    }

    /// Sets the field of view; every component must be positive.
    pub fn set_field_of_view(&mut self, fov: Vec3) -> SceneResult<()> {
        if !fov.is_finite() || fov.min_element() <= 0.0 {
            return Err(SceneError::InvalidAttribute(format!(
                "field of view must be positive, got {:?}",
                fov.to_array()
            )));
        }
        self.field_of_view = fov;
        Ok(())
    }

    /// Sets the output pixel grid; every component must be non-zero.
    pub fn set_dimensions(&mut self, dims: [u32; 3]) -> SceneResult<()> {
        if dims.contains(&0) {
            return Err(SceneError::InvalidAttribute(format!(
                "dimensions must be non-zero, got {:?}",
                dims
            )));
        }
        self.dimensions = dims;
        Ok(())
    }
}

fn check_finite(v: Vec3, what: &str) -> SceneResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SceneError::InvalidAttribute(format!("{} is not finite", what)))
    }
}

fn check_orthonormal(x: Vec3, y: Vec3, z: Vec3) -> SceneResult<()> {
    let unit = |v: Vec3| v.is_finite() && (v.length() - 1.0).abs() <= ORTHONORMAL_EPSILON;
    let ortho = |a: Vec3, b: Vec3| a.dot(b).abs() <= ORTHONORMAL_EPSILON;
    if unit(x) && unit(y) && unit(z) && ortho(x, y) && ortho(y, z) && ortho(x, z) {
        Ok(())
    } else {
        Err(SceneError::InvalidAttribute("slice axes are not orthonormal".into()))
    }
}

/// Layer assignment and blending settings of one slice view.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceCompositeNode {
    /// View this node belongs to.
    pub layout_name: String,
    /// Background volume.
    pub background_volume: Option<NodeId>,
    /// Foreground volume.
    pub foreground_volume: Option<NodeId>,
    /// Label volume.
    pub label_volume: Option<NodeId>,
    /// Foreground opacity in `[0, 1]`.
    pub foreground_opacity: f32,
    /// Label opacity in `[0, 1]`.
    pub label_opacity: f32,
    /// Layer combination mode.
    pub compositing: CompositingMode,
}

impl SliceCompositeNode {
    /// Empty layers, foreground hidden, labels opaque.
    pub fn new(layout_name: impl Into<String>) -> Self {
        Self {
            layout_name: layout_name.into(),
            background_volume: None,
            foreground_volume: None,
            label_volume: None,
            foreground_opacity: 0.0,
            label_opacity: 1.0,
            compositing: CompositingMode::Opacity,
        }
    }

    /// Volume assigned to `role`.
    pub fn volume(&self, role: LayerRole) -> Option<NodeId> {
        match role {
            LayerRole::Background => self.background_volume,
            LayerRole::Foreground => self.foreground_volume,
            LayerRole::Label => self.label_volume,
        }
    }

    /// Assigns (or clears) the volume of `role`.
    pub fn set_volume(&mut self, role: LayerRole, id: Option<NodeId>) {
        match role {
            LayerRole::Background => self.background_volume = id,
            LayerRole::Foreground => self.foreground_volume = id,
            LayerRole::Label => self.label_volume = id,
        }
    }
}

/// How a volume is mapped to colour.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeDisplay {
    /// Intensity window width.
    pub window: f64,
    /// Intensity window centre.
    pub level: f64,
    /// Trilinear sampling when true; label maps ignore this.
    pub interpolate: bool,
    /// Colour table: labels for label maps, a colour ramp for scalars (grey when `None`).
    pub color_table: Option<LookupTable>,
}

impl Default for VolumeDisplay {
    fn default() -> Self {
        Self {
            window: 256.0,
            level: 128.0,
            interpolate: true,
            color_table: None,
        }
    }
}

/// Voxel data with display properties.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeNode {
    /// Display name.
    pub name: String,
    /// Voxel data.
    pub volume: Volume,
    /// Marks an integer label map.
    pub label_map: bool,
    /// Colour mapping.
    pub display: VolumeDisplay,
}

impl VolumeNode {
    /// Scalar volume windowed over the range of its first component.
    pub fn new(name: impl Into<String>, volume: Volume) -> Self {
        let (lo, hi) = volume.scalar_range(0);
        let display = VolumeDisplay {
            window: ((hi - lo) as f64).max(1.0),
            level: (lo as f64 + hi as f64) * 0.5,
            ..VolumeDisplay::default()
        };
        Self {
            name: name.into(),
            volume,
            label_map: false,
            display,
        }
    }

    /// Label map coloured through `table`.
    pub fn label_map(name: impl Into<String>, volume: Volume, table: LookupTable) -> Self {
        Self {
            name: name.into(),
            volume,
            label_map: true,
            display: VolumeDisplay {
                interpolate: false,
                color_table: Some(table),
                ..VolumeDisplay::default()
            },
        }
    }

    /// True for single-component, non-label volumes.
    pub fn is_scalar(&self) -> bool {
        !self.label_map && self.volume.components() == 1
    }
}

/// A mesh shown in 3D views.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelNode {
    /// Display name.
    pub name: String,
    /// Mesh, absent until generated.
    pub poly_data: Option<PolyData>,
    /// Display node styling this model.
    pub display_node: Option<NodeId>,
}

impl ModelNode {
    /// Empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Display style of a [`ModelNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDisplayNode {
    /// RGB colour in `[0, 1]`.
    pub color: [f32; 3],
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Shown in 3D views.
    pub visible: bool,
    /// Image mapped onto the mesh through its texture coordinates.
    pub texture: Option<Image2D>,
}

impl Default for ModelDisplayNode {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            visible: true,
            texture: None,
        }
    }
}

/// Any node stored in a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plane geometry.
    Slice(SliceNode),
    /// Layer assignment.
    SliceComposite(SliceCompositeNode),
    /// Voxel data.
    Volume(VolumeNode),
    /// Mesh.
    Model(ModelNode),
    /// Mesh style.
    ModelDisplay(ModelDisplayNode),
}

impl Node {
    /// Discriminant.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Slice(_) => NodeKind::Slice,
            Self::SliceComposite(_) => NodeKind::SliceComposite,
            Self::Volume(_) => NodeKind::Volume,
            Self::Model(_) => NodeKind::Model,
            Self::ModelDisplay(_) => NodeKind::ModelDisplay,
        }
    }
}

/// Typed access to one [`Node`] variant.
pub trait SceneNode: Clone + PartialEq + Into<Node> {
    /// Kind stored for this type.
    const KIND: NodeKind;

    /// Borrows the payload if `node` is of this kind.
    fn from_node(node: &Node) -> Option<&Self>;

    /// Mutably borrows the payload if `node` is of this kind.
    fn from_node_mut(node: &mut Node) -> Option<&mut Self>;
}

macro_rules! scene_node {
    ($ty:ident, $variant:ident) => {
        impl From<$ty> for Node {
            fn from(n: $ty) -> Self {
                Node::$variant(n)
            }
        }

        impl SceneNode for $ty {
            const KIND: NodeKind = NodeKind::$variant;

            fn from_node(node: &Node) -> Option<&Self> {
                match node {
                    Node::$variant(n) => Some(n),
                    _ => None,
                }
            }

            fn from_node_mut(node: &mut Node) -> Option<&mut Self> {
                match node {
                    Node::$variant(n) => Some(n),
                    _ => None,
                }
            }
        }
    };
}

scene_node!(SliceNode, Slice);
scene_node!(SliceCompositeNode, SliceComposite);
scene_node!(VolumeNode, Volume);
scene_node!(ModelNode, Model);
scene_node!(ModelDisplayNode, ModelDisplay);
