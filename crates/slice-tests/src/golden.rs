//! Golden hashes of resliced output.
//!
//! Reslice results are quantised and hashed with SHA-256, then compared
//! against hashes of independently constructed expected data. Equal hashes
//! mean bit-identical output after quantisation.

use sha2::{Digest, Sha256};
use slice_core::{Image2D, Volume};
use slice_math::{Mat4, Vec3};
use slice_ops::colormap::window_level;
use slice_ops::reslice::{reslice, Interpolation, ResliceGrid};
use slice_ops::WindowLevel;

/// Decimal places kept before hashing.
const HASH_PRECISION: i32 = 5;

// ---------------------------------------------------------------------------
// Hash utilities
// ---------------------------------------------------------------------------

/// SHA-256 of `data` quantised to [`HASH_PRECISION`] decimals.
fn compute_hash_f32(data: &[f32]) -> String {
    let factor = 10f64.powi(HASH_PRECISION);
    let bytes: Vec<u8> = data
        .iter()
        .map(|&v| (v as f64 * factor).round() as i64)
        .flat_map(|v| v.to_le_bytes())
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

fn hash_image(image: &Image2D) -> String {
    compute_hash_f32(image.data())
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

fn value(i: usize, j: usize, k: usize) -> f32 {
    (i + 10 * j + 100 * k) as f32
}

/// 8 x 4 x 3 index ramp.
fn ramp() -> Volume {
    Volume::from_fn([8, 4, 3], 1, |i, j, k, _| value(i, j, k)).unwrap()
}

/// Samples `[value, coverage]` of pixel `(x, y)` on the identity grid at slice `k`.
fn expected_identity(k: usize, width: usize, height: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(width * height * 2);
    for y in 0..height {
        for x in 0..width {
            if x < 8 && y < 4 {
                out.extend([value(x, y, k), 1.0]);
            } else {
                out.extend([0.0, 0.0]);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_identity_grid_golden() {
    let vol = ramp();
    for k in 0..3 {
        let grid = ResliceGrid::new(Mat4::from_axes(Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.0, 0.0, k as f64)), 10, 5)
            .unwrap();
        let expected = compute_hash_f32(&expected_identity(k, 10, 5));
        for interp in [Interpolation::Nearest, Interpolation::Linear] {
            let out = reslice(&vol, &grid, interp).unwrap();
            assert_eq!(hash_image(&out), expected, "slice {k} {interp:?}");
        }
    }
}

#[test]
fn test_half_voxel_linear_golden() {
    // Between k = 0 and k = 1, every sample is the mean of two slices
    let vol = ramp();
    let grid = ResliceGrid::new(Mat4::from_axes(Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.0, 0.0, 0.5)), 8, 4).unwrap();
    let expected: Vec<f32> = (0..4)
        .flat_map(|y| (0..8).flat_map(move |x| [(value(x, y, 0) + value(x, y, 1)) * 0.5, 1.0]))
        .collect();
    let out = reslice(&vol, &grid, Interpolation::Linear).unwrap();
    assert_eq!(hash_image(&out), compute_hash_f32(&expected));
}

#[test]
fn test_transposed_grid_golden() {
    // x walks J, y walks I
    let vol = ramp();
    let grid = ResliceGrid::new(Mat4::from_axes(Vec3::Y, Vec3::X, Vec3::Z, Vec3::new(0.0, 0.0, 2.0)), 4, 8).unwrap();
    let expected: Vec<f32> = (0..8)
        .flat_map(|y| (0..4).flat_map(move |x| [value(y, x, 2), 1.0]))
        .collect();
    let out = reslice(&vol, &grid, Interpolation::Nearest).unwrap();
    assert_eq!(hash_image(&out), compute_hash_f32(&expected));
}

#[test]
fn test_window_level_golden() {
    let vol = ramp();
    let grid = ResliceGrid::new(Mat4::IDENTITY, 8, 4).unwrap();
    let sampled = reslice(&vol, &grid, Interpolation::Nearest).unwrap();
    // values 0..=37 on slice 0; window [0, 40]
    let rgba = window_level(&sampled, WindowLevel::new(40.0, 20.0).unwrap()).unwrap();
    let expected: Vec<f32> = (0..4)
        .flat_map(|y| {
            (0..8).flat_map(move |x| {
                let g = value(x, y, 0) / 40.0;
                [g, g, g, 1.0]
            })
        })
        .collect();
    assert_eq!(hash_image(&rgba), compute_hash_f32(&expected));
}

#[test]
fn test_equal_volumes_equal_hash() {
    let a = ramp();
    let b = Volume::new([8, 4, 3], 1, a.scalars().to_vec()).unwrap();
    let oblique = Mat4::from_axes(
        Vec3::new(0.6, 0.2, 0.1),
        Vec3::new(-0.2, 0.6, 0.1),
        Vec3::Z,
        Vec3::new(0.3, 0.2, 0.7),
    );
    let grid = ResliceGrid::new(oblique, 16, 8).unwrap();
    let ha = hash_image(&reslice(&a, &grid, Interpolation::Linear).unwrap());
    let hb = hash_image(&reslice(&b, &grid, Interpolation::Linear).unwrap());
    assert_eq!(ha, hb);

    let shifted = ResliceGrid::new(oblique.with_translation(Vec3::new(0.3, 0.2, 1.2)), 16, 8).unwrap();
    assert_ne!(hash_image(&reslice(&a, &shifted, Interpolation::Linear).unwrap()), ha);
}
