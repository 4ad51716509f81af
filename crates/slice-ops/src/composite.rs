//! Back-to-front layer compositing.
//!
//! The slice view stacks three RGBA layers in a fixed order:
//!
//! ```text
//! background  (base, drawn as is)
//!   foreground  over, alpha * foreground_opacity
//!     label     over, alpha * label_opacity
//! ```
//!
//! Blending uses the Porter-Duff `over` operator on straight (not
//! premultiplied) RGBA.
//!
//! # Example
//!
//! ```rust
//! use slice_ops::composite::over_pixel;
//!
//! let fg = [1.0, 0.0, 0.0, 0.5]; // Semi-transparent red
//! let bg = [0.0, 0.0, 1.0, 1.0]; // Opaque blue
//!
//! let result = over_pixel(fg, bg);
//! assert_eq!(result[3], 1.0);
//! ```

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};
use slice_core::{Image2D, RGBA};
use slice_math::saturate_f32;
use tracing::{debug, trace};

/// Composites foreground over background (Porter-Duff over).
///
/// Result = FG + BG * (1 - FG.alpha), with straight alpha.
#[inline]
pub fn over_pixel(fg: [f32; 4], bg: [f32; 4]) -> [f32; 4] {
    let fg_a = fg[3];
    let bg_a = bg[3];
    let out_a = fg_a + bg_a * (1.0 - fg_a);

    if out_a < 1e-8 {
        return [0.0, 0.0, 0.0, 0.0];
    }

    let inv_out_a = 1.0 / out_a;
    [
        (fg[0] * fg_a + bg[0] * bg_a * (1.0 - fg_a)) * inv_out_a,
        (fg[1] * fg_a + bg[1] * bg_a * (1.0 - fg_a)) * inv_out_a,
        (fg[2] * fg_a + bg[2] * bg_a * (1.0 - fg_a)) * inv_out_a,
        out_a,
    ]
}

/// Clamps a layer opacity into `[0, 1]`; NaN becomes 0.
#[inline]
pub fn clamp_opacity(opacity: f32) -> f32 {
    saturate_f32(opacity)
}

fn ensure_rgba(img: &Image2D, role: &str) -> OpsResult<()> {
    if img.channels() != RGBA {
        return Err(OpsError::InvalidParameter(format!(
            "{} layer must be RGBA, got {} channels",
            role,
            img.channels()
        )));
    }
    Ok(())
}

fn ensure_size(a: &Image2D, b: &Image2D, role: &str) -> OpsResult<()> {
    a.ensure_same_size(b)
        .map_err(|e| OpsError::SizeMismatch(format!("{} layer: {}", role, e)))
}

/// Blends `layer` over `canvas` in place with its alpha scaled by `opacity`.
///
/// Pixels whose effective alpha is zero leave the canvas untouched.
fn over_layer(canvas: &mut [f32], width: usize, layer: &Image2D, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let src = layer.data();
    let row_len = width * 4;
    for_each_row(canvas, row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for (dst, px) in row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let a = px[3] * opacity;
            if a <= 0.0 {
                continue;
            }
            let out = over_pixel(
                [px[0], px[1], px[2], a],
                [dst[0], dst[1], dst[2], dst[3]],
            );
            dst.copy_from_slice(&out);
        }
    });
}

/// Composites the three slice layers back to front.
///
/// Returns `Ok(None)` iff all three layers are absent. Present layers must
/// be RGBA and share one size. The canvas starts as a copy of the background
/// (transparent black without one), so a background-only stack reproduces the
/// background exactly. Pixels outside the background volume keep its zero
/// coverage alpha and stay transparent unless another layer covers them, so
/// renderers should draw that area blank.
pub fn composite_layers(
    background: Option<&Image2D>,
    foreground: Option<&Image2D>,
    foreground_opacity: f32,
    label: Option<&Image2D>,
    label_opacity: f32,
) -> OpsResult<Option<Image2D>> {
    let layers = [
        ("background", background),
        ("foreground", foreground),
        ("label", label),
    ];
    let Some(first) = layers.iter().find_map(|(_, l)| *l) else {
        trace!("composite: no layers");
        return Ok(None);
    };
    for (role, layer) in layers.iter() {
        if let Some(img) = layer {
            ensure_rgba(img, role)?;
            ensure_size(first, img, role)?;
        }
    }

    let (w, h) = first.size();
    let fg_op = clamp_opacity(foreground_opacity);
    let lbl_op = clamp_opacity(label_opacity);
    debug!(
        width = w,
        height = h,
        background = background.is_some(),
        foreground = foreground.is_some(),
        label = label.is_some(),
        foreground_opacity = fg_op,
        label_opacity = lbl_op,
        "composite"
    );

    let mut canvas = match background {
        Some(bg) => bg.data().to_vec(),
        None => vec![0.0f32; first.pixel_count() * 4],
    };
    if let Some(fg) = foreground {
        over_layer(&mut canvas, w as usize, fg, fg_op);
    }
    if let Some(lbl) = label {
        over_layer(&mut canvas, w as usize, lbl, lbl_op);
    }

    Ok(Some(Image2D::from_data(w, h, RGBA, canvas)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid(rgba: [f32; 4]) -> Image2D {
        Image2D::filled(3, 2, &rgba).unwrap()
    }

    #[test]
    fn test_over_opaque() {
        let fg = [1.0, 0.0, 0.0, 1.0]; // Opaque red
        let bg = [0.0, 0.0, 1.0, 1.0]; // Opaque blue
        let result = over_pixel(fg, bg);

        // Opaque foreground completely covers
        assert_relative_eq!(result[0], 1.0);
        assert_relative_eq!(result[2], 0.0);
        assert_relative_eq!(result[3], 1.0);
    }

    #[test]
    fn test_over_transparent() {
        let fg = [1.0, 0.0, 0.0, 0.0];
        let bg = [0.0, 0.0, 1.0, 1.0];
        let result = over_pixel(fg, bg);
        assert_relative_eq!(result[0], 0.0);
        assert_relative_eq!(result[2], 1.0);
    }

    #[test]
    fn test_all_absent() {
        assert!(composite_layers(None, None, 0.5, None, 0.5).unwrap().is_none());
    }

    #[test]
    fn test_absent_iff_all_absent() {
        let img = solid([0.2, 0.4, 0.6, 1.0]);
        for mask in 1..8u8 {
            let pick = |bit: u8| ((mask & bit) != 0).then_some(&img);
            for (f, l) in [(0.0, 0.0), (0.5, 1.0), (1.0, 0.3)] {
                let out = composite_layers(pick(1), pick(2), f, pick(4), l).unwrap();
                assert!(out.is_some(), "mask {mask}");
            }
        }
    }

    #[test]
    fn test_background_only_is_identity() {
        let bg = Image2D::from_data(
            2,
            1,
            4,
            vec![0.1, 0.2, 0.3, 1.0, 0.7, 0.11, 0.13, 0.0],
        )
        .unwrap();
        let out = composite_layers(Some(&bg), None, 0.0, None, 1.0).unwrap().unwrap();
        assert!(out.bit_eq(&bg));
        assert!(!out.shares_buffer(&bg));
    }

    #[test]
    fn test_zero_opacity_foreground_ignored() {
        let bg = solid([0.3, 0.3, 0.3, 1.0]);
        let fg = solid([1.0, 0.0, 0.0, 1.0]);
        let out = composite_layers(Some(&bg), Some(&fg), 0.0, None, 1.0).unwrap().unwrap();
        assert!(out.bit_eq(&bg));
    }

    #[test]
    fn test_order_label_on_top() {
        let bg = solid([0.0, 0.0, 0.0, 1.0]);
        let fg = solid([1.0, 0.0, 0.0, 1.0]);
        let lbl = solid([0.0, 1.0, 0.0, 1.0]);
        let out = composite_layers(Some(&bg), Some(&fg), 1.0, Some(&lbl), 1.0).unwrap().unwrap();
        assert_eq!(out.pixel(1, 1), &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_half_opacity() {
        let bg = solid([0.0, 0.0, 1.0, 1.0]);
        let fg = solid([1.0, 0.0, 0.0, 1.0]);
        let out = composite_layers(Some(&bg), Some(&fg), 0.5, None, 0.0).unwrap().unwrap();
        let px = out.pixel(0, 0);
        assert_relative_eq!(px[0], 0.5);
        assert_relative_eq!(px[2], 0.5);
        assert_relative_eq!(px[3], 1.0);
    }

    #[test]
    fn test_opacity_clamped() {
        assert_eq!(clamp_opacity(2.0), 1.0);
        assert_eq!(clamp_opacity(-1.0), 0.0);
        assert_eq!(clamp_opacity(f32::NAN), 0.0);
    }

    #[test]
    fn test_size_mismatch() {
        let a = solid([0.0; 4]);
        let b = Image2D::filled(5, 5, &[0.0; 4]).unwrap();
        match composite_layers(Some(&a), Some(&b), 1.0, None, 1.0) {
            Err(OpsError::SizeMismatch(msg)) => assert!(msg.contains("foreground"), "{}", msg),
            other => panic!("expected size mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_outside_background_stays_transparent() {
        // left pixel inside the background volume, right pixel outside it
        let bg = Image2D::from_data(2, 1, RGBA, vec![0.5, 0.5, 0.5, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let out = composite_layers(Some(&bg), None, 0.0, None, 1.0).unwrap().unwrap();
        assert_eq!(out.data()[3], 1.0);
        assert_eq!(out.data()[7], 0.0);
    }

    #[test]
    fn test_rejects_non_rgba() {
        let a = Image2D::filled(3, 2, &[0.0, 1.0]).unwrap();
        assert!(composite_layers(Some(&a), None, 1.0, None, 1.0).is_err());
    }
}
