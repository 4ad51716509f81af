//! Seams between the slice logic and its stages.
//!
//! [`SliceLogic`](crate::SliceLogic) composes one [`GeometryProvider`],
//! three [`Reslicer`]s (one per layer role) and one [`Compositor`]. The
//! default implementations are [`SliceGeometryState`](crate::SliceGeometryState),
//! [`LayerReslicer`](crate::LayerReslicer) and
//! [`SliceCompositor`](crate::SliceCompositor); others can be swapped in with
//! [`SliceLogic::with_stages`](crate::SliceLogic::with_stages).
//!
//! # Example
//!
//! ```rust
//! use slice_core::Image2D;
//! use slice_logic::{GeometryProvider, LogicResult, Reslicer};
//! use slice_scene::{LayerRole, ResolvedVolume};
//!
//! /// Always shows nothing.
//! struct Blank(LayerRole);
//!
//! impl Reslicer for Blank {
//!     fn role(&self) -> LayerRole {
//!         self.0
//!     }
//!     fn update(&mut self, _: Option<ResolvedVolume<'_>>, _: &dyn GeometryProvider) -> LogicResult<bool> {
//!         Ok(false)
//!     }
//!     fn output(&self) -> Option<&Image2D> {
//!         None
//!     }
//!     fn clear(&mut self) {}
//! }
//! ```

use crate::geometry::PlaneGeometry;
use crate::LogicResult;
use slice_core::{Bounds, Image2D, TimeStamp, Volume};
use slice_math::Vec3;
use slice_scene::{CompositingMode, LayerRole, ResolvedVolume};

/// Read access to the current slice plane.
pub trait GeometryProvider {
    /// Current plane.
    fn plane(&self) -> &PlaneGeometry;

    /// Advances whenever the plane changes value.
    fn version(&self) -> TimeStamp;

    /// Distance of the plane from the RAS origin along its normal.
    fn offset(&self) -> f64;

    /// Voxel spacing of `background` in slice axes; `(1, 1, 1)` without one.
    fn spacing(&self, background: Option<&Volume>) -> Vec3;

    /// Slice-space box of `background`, independent of the offset.
    ///
    /// [`Bounds::invalid`] without a background.
    fn slice_bounds(&self, background: Option<&Volume>) -> Bounds;
}

/// Turns one layer volume into an RGBA image on the slice grid.
pub trait Reslicer {
    /// Layer this stage serves.
    fn role(&self) -> LayerRole;

    /// Brings the output up to date; true if it was recomputed.
    ///
    /// An absent volume clears the output.
    fn update(&mut self, volume: Option<ResolvedVolume<'_>>, geometry: &dyn GeometryProvider) -> LogicResult<bool>;

    /// Current output.
    fn output(&self) -> Option<&Image2D>;

    /// Drops the output and any cache.
    fn clear(&mut self);
}

/// How layers are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompositeStrategy {
    /// Alpha blending with per-layer opacity.
    #[default]
    Opacity,
    /// A mode without a blending implementation; composited as [`CompositeStrategy::Opacity`].
    Unsupported(CompositingMode),
}

impl From<CompositingMode> for CompositeStrategy {
    fn from(mode: CompositingMode) -> Self {
        match mode {
            CompositingMode::Opacity => Self::Opacity,
            other => Self::Unsupported(other),
        }
    }
}

/// Layer stack handed to a [`Compositor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeInputs<'a> {
    /// Base layer.
    pub background: Option<&'a Image2D>,
    /// Middle layer.
    pub foreground: Option<&'a Image2D>,
    /// Foreground opacity in `[0, 1]`.
    pub foreground_opacity: f32,
    /// Top layer.
    pub label: Option<&'a Image2D>,
    /// Label opacity in `[0, 1]`.
    pub label_opacity: f32,
    /// Combination mode.
    pub strategy: CompositeStrategy,
}

/// Blends the layer stack into the view image.
pub trait Compositor {
    /// Brings the image up to date; true if it changed.
    fn update(&mut self, inputs: &CompositeInputs<'_>) -> LogicResult<bool>;

    /// Current image; `None` when no layer has data.
    fn image(&self) -> Option<&Image2D>;
}
