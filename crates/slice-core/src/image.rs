//! 2D float image buffers.
//!
//! [`Image2D`] is the currency between pipeline stages: the reslicer
//! produces single-channel scalar slices, colour mapping turns them into
//! RGBA layer images and the compositor blends those into the final
//! displayable image.
//!
//! # Memory Layout
//!
//! Samples are stored in **row-major** order, one interleaved pixel after
//! another. Row 0 is the first row of the slice pixel grid (`y = 0`):
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//! ```
//!
//! # Value semantics
//!
//! The sample buffer lives behind an [`Arc`] and is never mutated after
//! construction. Cloning an image shares the buffer; a holder of an old
//! image is unaffected when a pipeline stage produces a new one.
//! [`Image2D::deep_copy`] forces a fresh buffer and a fresh [`TimeStamp`].

use crate::error::checked_len;
use crate::{Error, Result, TimeStamp};
use std::sync::Arc;

/// Number of channels of a colour-mapped layer or composite image.
pub const RGBA: u32 = 4;

/// Immutable 2D image with interleaved `f32` samples.
///
/// # Example
///
/// ```rust
/// use slice_core::Image2D;
///
/// let img = Image2D::filled(4, 2, &[0.0, 0.0, 0.0, 1.0]).unwrap();
/// assert_eq!(img.width(), 4);
/// assert_eq!(img.pixel(3, 1), &[0.0, 0.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Image2D {
    data: Arc<Vec<f32>>,
    width: u32,
    height: u32,
    channels: u32,
    mtime: TimeStamp,
}

impl Image2D {
    /// Creates an image from existing sample data.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] for a zero extent and
    /// [`Error::DataLength`] if `data` does not hold `width * height * channels` samples.
    pub fn from_data(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Result<Self> {
        let expected = checked_len(&[width as usize, height as usize], channels as usize)?;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            channels,
            mtime: TimeStamp::now(),
        })
    }

    /// Creates an image with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: &[f32]) -> Result<Self> {
        let channels = pixel.len() as u32;
        let count = checked_len(&[width as usize, height as usize], 1)?;
        let mut data = Vec::with_capacity(count * pixel.len());
        for _ in 0..count {
            data.extend_from_slice(pixel);
        }
        Self::from_data(width, height, channels, data)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// All samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Samples of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[f32] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let c = self.channels as usize;
        let idx = (y as usize * self.width as usize + x as usize) * c;
        &self.data[idx..idx + c]
    }

    /// Modification time of this image.
    #[inline]
    pub fn mtime(&self) -> TimeStamp {
        self.mtime
    }

    /// Copies the samples into a new buffer with a new modification time.
    pub fn deep_copy(&self) -> Self {
        Self {
            data: Arc::new(self.data.as_ref().clone()),
            width: self.width,
            height: self.height,
            channels: self.channels,
            mtime: TimeStamp::now(),
        }
    }

    /// True when both images share one sample buffer.
    #[inline]
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// True for identical shape and bit-identical samples.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self.channels == other.channels
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Fails unless both images have the same size.
    pub fn ensure_same_size(&self, other: &Self) -> Result<()> {
        if self.size() != other.size() {
            return Err(Error::dimension_mismatch(self.size(), other.size()));
        }
        Ok(())
    }
}

/// Shape and samples are compared; the modification time is not.
impl PartialEq for Image2D {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.channels == other.channels && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_length() {
        assert!(Image2D::from_data(2, 2, 1, vec![0.0; 4]).is_ok());
        assert!(matches!(
            Image2D::from_data(2, 2, 1, vec![0.0; 5]),
            Err(Error::DataLength { expected: 4, got: 5 })
        ));
        assert!(Image2D::from_data(0, 2, 1, vec![]).is_err());
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let a = Image2D::filled(2, 2, &[1.0, 0.0, 0.0, 1.0]).unwrap();
        let shared = a.clone();
        let copy = a.deep_copy();
        assert!(shared.shares_buffer(&a));
        assert!(!copy.shares_buffer(&a));
        assert_eq!(copy, a);
        assert!(copy.mtime() > a.mtime());
    }

    #[test]
    fn test_pixel_access() {
        let img = Image2D::from_data(2, 1, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(img.pixel(1, 0), &[3.0, 4.0]);
    }

    #[test]
    fn test_bit_eq() {
        let a = Image2D::filled(3, 3, &[0.25]).unwrap();
        let b = Image2D::filled(3, 3, &[0.25]).unwrap();
        assert!(a.bit_eq(&b));
        let c = Image2D::filled(3, 3, &[0.5]).unwrap();
        assert!(!a.bit_eq(&c));
    }

    #[test]
    fn test_ensure_same_size() {
        let a = Image2D::filled(3, 3, &[0.0]).unwrap();
        assert!(a.ensure_same_size(&Image2D::filled(3, 3, &[1.0]).unwrap()).is_ok());
        let err = a.ensure_same_size(&Image2D::filled(4, 3, &[0.0]).unwrap()).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { b_width: 4, .. }));
    }
}
