//! Row dispatch shared by the per-pixel operations.
//!
//! With the `parallel` feature rows are handed to rayon, otherwise they are
//! processed in order. Each row is computed independently, so both paths
//! produce identical output.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Calls `f(y, row)` for every `row_len`-sample row of `dst`.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_row<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Calls `f(y, row)` for every `row_len`-sample row of `dst` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_row<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]),
{
    for (y, row) in dst.chunks_mut(row_len).enumerate() {
        f(y, row);
    }
}
