//! Lazily memoised layer compositing.
//!
//! Two cached products:
//!
//! ```text
//! blended   rebuilt when any layer output or opacity differs from last time
//! image     the published composite, deep-copied from `blended` only when
//!           blended is newer than it
//! ```
//!
//! Holders of a previously published image keep their copy untouched.

use crate::traits::{CompositeInputs, CompositeStrategy, Compositor};
use crate::LogicResult;
use slice_core::{Image2D, TimeStamp};
use slice_ops::composite::{clamp_opacity, composite_layers};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
struct BlendKey {
    layers: [Option<TimeStamp>; 3],
    foreground_opacity: f32,
    label_opacity: f32,
    strategy: CompositeStrategy,
}

impl BlendKey {
    fn new(inputs: &CompositeInputs<'_>) -> Self {
        Self {
            layers: [inputs.background, inputs.foreground, inputs.label].map(|l| l.map(Image2D::mtime)),
            foreground_opacity: clamp_opacity(inputs.foreground_opacity),
            label_opacity: clamp_opacity(inputs.label_opacity),
            strategy: inputs.strategy,
        }
    }
}

/// Default [`Compositor`].
#[derive(Debug, Clone, Default)]
pub struct SliceCompositor {
    key: Option<BlendKey>,
    blended: Option<Image2D>,
    image: Option<Image2D>,
    warned: Option<CompositeStrategy>,
}

impl SliceCompositor {
    /// Empty compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Modification time of the published image.
    pub fn image_mtime(&self) -> Option<TimeStamp> {
        self.image.as_ref().map(Image2D::mtime)
    }

    fn blend(&mut self, inputs: &CompositeInputs<'_>) -> LogicResult<()> {
        if let CompositeStrategy::Unsupported(mode) = inputs.strategy {
            if self.warned != Some(inputs.strategy) {
                warn!(?mode, "compositing mode not implemented, using opacity blending");
                self.warned = Some(inputs.strategy);
            }
        }
        self.blended = composite_layers(
            inputs.background,
            inputs.foreground,
            inputs.foreground_opacity,
            inputs.label,
            inputs.label_opacity,
        )?;
        Ok(())
    }
}

impl Compositor for SliceCompositor {
    fn update(&mut self, inputs: &CompositeInputs<'_>) -> LogicResult<bool> {
        let key = BlendKey::new(inputs);
        if self.key != Some(key) {
            debug!(
                background = inputs.background.is_some(),
                foreground = inputs.foreground.is_some(),
                label = inputs.label.is_some(),
                "reblend"
            );
            self.blend(inputs)?;
            self.key = Some(key);
        }

        match &self.blended {
            None => {
                let had = self.image.take().is_some();
                if had {
                    debug!("composite cleared");
                }
                Ok(had)
            }
            Some(blended) => {
                let stale = self
                    .image
                    .as_ref()
                    .is_none_or(|img| blended.mtime() > img.mtime());
                if stale {
                    self.image = Some(blended.deep_copy());
                    debug!(width = blended.width(), height = blended.height(), "composite published");
                } else {
                    trace!("composite up to date");
                }
                Ok(stale)
            }
        }
    }

    fn image(&self) -> Option<&Image2D> {
        self.image.as_ref()
    }
}
