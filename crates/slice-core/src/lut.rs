//! Colour lookup tables.
//!
//! A [`LookupTable`] maps scalars to straight-alpha RGBA in `[0, 1]`.
//! Two lookups are supported:
//!
//! - [`LookupTable::map_scalar`] - linear ramp across `range`, clamped at the ends
//!   (glyph magnitudes, grey ramps)
//! - [`LookupTable::map_label`] - exact entry for an integer label value;
//!   labels without an entry are transparent (label maps)
//!
//! ```rust
//! use slice_core::LookupTable;
//!
//! let labels = LookupTable::labels(8);
//! assert_eq!(labels.map_label(0.0)[3], 0.0); // background label is transparent
//! assert_eq!(labels.map_label(3.0)[3], 1.0);
//! assert_eq!(labels.map_label(42.0), [0.0; 4]);
//! ```

use crate::{Error, Result, TimeStamp};
use slice_math::{inverse_lerp, saturate};

/// Transparent black.
pub const TRANSPARENT: [f32; 4] = [0.0; 4];

/// Scalar-to-colour table.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    name: String,
    range: (f64, f64),
    table: Vec<[f32; 4]>,
    mtime: TimeStamp,
}

impl LookupTable {
    /// Creates a table from explicit entries.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTable`] if `table` is empty.
    pub fn new(name: impl Into<String>, range: (f64, f64), table: Vec<[f32; 4]>) -> Result<Self> {
        let name = name.into();
        if table.is_empty() {
            return Err(Error::EmptyTable(name));
        }
        Ok(Self {
            name,
            range,
            table,
            mtime: TimeStamp::now(),
        })
    }

    /// Opaque black-to-white ramp with `n` entries over `[0, 1]`.
    pub fn grayscale(n: usize) -> Self {
        let n = n.max(2);
        let table = (0..n)
            .map(|i| {
                let v = i as f32 / (n - 1) as f32;
                [v, v, v, 1.0]
            })
            .collect();
        Self {
            name: "Grey".into(),
            range: (0.0, 1.0),
            table,
            mtime: TimeStamp::now(),
        }
    }

    /// Blue-to-red hue ramp with `n` entries over `[0, 1]`.
    pub fn rainbow(n: usize) -> Self {
        let n = n.max(2);
        let table = (0..n)
            .map(|i| {
                // 240 deg (blue) down to 0 deg (red)
                let t = i as f32 / (n - 1) as f32;
                let [r, g, b] = hsv_to_rgb((1.0 - t) * (2.0 / 3.0), 1.0, 1.0);
                [r, g, b, 1.0]
            })
            .collect();
        Self {
            name: "Rainbow".into(),
            range: (0.0, 1.0),
            table,
            mtime: TimeStamp::now(),
        }
    }

    /// Label palette with `n` entries; entry 0 is transparent.
    ///
    /// Hues advance by the golden ratio so neighbouring labels contrast.
    pub fn labels(n: usize) -> Self {
        let n = n.max(1);
        let table = (0..n)
            .map(|i| {
                if i == 0 {
                    return TRANSPARENT;
                }
                let hue = (i as f32 * 0.618_034).fract();
                let [r, g, b] = hsv_to_rgb(hue, 0.75, 0.95);
                [r, g, b, 1.0]
            })
            .collect();
        Self {
            name: "Labels".into(),
            range: (0.0, (n - 1) as f64),
            table,
            mtime: TimeStamp::now(),
        }
    }

    /// Single-entry table, used to colour a mesh with one display colour.
    pub fn single_color(name: impl Into<String>, rgba: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            range: (0.0, 1.0),
            table: vec![rgba],
            mtime: TimeStamp::now(),
        }
    }

    /// Returns a copy whose linear ramp spans `range`.
    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range = range;
        self.mtime.modified();
        self
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar range covered by the linear ramp.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Always false; tables have at least one entry.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries.
    pub fn entries(&self) -> &[[f32; 4]] {
        &self.table
    }

    /// Modification time.
    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    /// Maps `value` linearly across `range` to the nearest entry.
    pub fn map_scalar(&self, value: f64) -> [f32; 4] {
        let last = self.table.len() - 1;
        let (lo, hi) = self.range;
        let t = if hi <= lo { 0.0 } else { saturate(inverse_lerp(lo, hi, value)) };
        self.table[(t * last as f64).round() as usize]
    }

    /// Maps an integer label to its entry; unknown labels are transparent.
    pub fn map_label(&self, value: f32) -> [f32; 4] {
        if !value.is_finite() || value < 0.0 {
            return TRANSPARENT;
        }
        self.table
            .get(value.round() as usize)
            .copied()
            .unwrap_or(TRANSPARENT)
    }
}

/// HSV in `[0, 1]` to RGB in `[0, 1]`.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h6 = (h.rem_euclid(1.0)) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
