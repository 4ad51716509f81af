//! Pipeline configuration.
//!
//! Defaults used when a slice logic has to create or normalise nodes, plus
//! the knobs of its layer pipeline. Every field is optional in YAML:
//!
//! ```yaml
//! layout: Sagittal
//! dimensions: [512, 512, 1]
//! field_of_view: [200.0, 200.0, 1.0]
//! foreground_opacity: 0.5
//! glyph_spacing: 16
//! slice_model:
//!   color: [1.0, 0.9, 0.2]
//! ```

use crate::{LogicError, LogicResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default orientation preset.
pub const DEFAULT_LAYOUT: &str = "Axial";

/// Default output pixel grid.
pub const DEFAULT_DIMENSIONS: [u32; 3] = [256, 256, 1];

/// Default field of view in millimetres.
pub const DEFAULT_FIELD_OF_VIEW: [f64; 3] = [250.0, 250.0, 1.0];

/// Display defaults of the slice plane model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceModelConfig {
    /// RGB colour in `[0, 1]`.
    pub color: [f32; 3],
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Shown in 3D views.
    pub visible: bool,
}

impl Default for SliceModelConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            visible: false,
        }
    }
}

/// Settings of one [`SliceLogic`](crate::SliceLogic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceLogicConfig {
    /// Orientation preset and layout name of the driven view.
    pub layout: String,
    /// Pixel grid given to newly created slice nodes.
    pub dimensions: [u32; 3],
    /// Field of view given to newly created slice nodes.
    pub field_of_view: [f64; 3],
    /// Foreground opacity given to newly created composite nodes.
    pub foreground_opacity: f32,
    /// Label opacity given to newly created composite nodes.
    pub label_opacity: f32,
    /// Trilinear sampling for scalar layers; label layers always sample nearest.
    pub interpolate: bool,
    /// Pixels between glyph samples.
    pub glyph_spacing: u32,
    /// Glyph length per unit of in-plane vector length, in pixels.
    pub glyph_scale: f64,
    /// Slice model display defaults.
    pub slice_model: SliceModelConfig,
    /// Fill an empty background role with the first scalar volume.
    pub auto_assign_background: bool,
}

impl Default for SliceLogicConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.into(),
            dimensions: DEFAULT_DIMENSIONS,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            foreground_opacity: 0.0,
            label_opacity: 1.0,
            interpolate: true,
            glyph_spacing: 8,
            glyph_scale: 1.0,
            slice_model: SliceModelConfig::default(),
            auto_assign_background: true,
        }
    }
}

impl SliceLogicConfig {
    /// Default configuration for the view `layout`.
    pub fn for_layout(layout: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
            ..Self::default()
        }
    }

    /// Parses and validates YAML.
    pub fn from_yaml_str(yaml: &str) -> LogicResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML file.
    pub fn load(path: impl AsRef<Path>) -> LogicResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LogicError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialises to YAML.
    pub fn to_yaml_string(&self) -> LogicResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> LogicResult<()> {
        if self.layout.is_empty() {
            return Err(LogicError::Config("layout must not be empty".into()));
        }
        for (name, v) in [
            ("foreground_opacity", self.foreground_opacity),
            ("label_opacity", self.label_opacity),
            ("slice_model.opacity", self.slice_model.opacity),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(LogicError::Config(format!("{} must be in [0, 1], got {}", name, v)));
            }
        }
        if self.dimensions.contains(&0) {
            return Err(LogicError::Config(format!(
                "dimensions must be non-zero, got {:?}",
                self.dimensions
            )));
        }
        if self.field_of_view.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(LogicError::Config(format!(
                "field_of_view must be positive, got {:?}",
                self.field_of_view
            )));
        }
        if self.glyph_spacing == 0 {
            return Err(LogicError::Config("glyph_spacing must be > 0".into()));
        }
        if !self.glyph_scale.is_finite() {
            return Err(LogicError::Config("glyph_scale must be finite".into()));
        }
        Ok(())
    }
}
