//! Integration tests for the slice view crates.
//!
//! End-to-end scenarios that drive a [`slice_logic::SliceLogic`] through a
//! [`slice_scene::Scene`], plus golden hashes of resliced output in
//! [`golden`].

#[cfg(test)]
mod golden;
