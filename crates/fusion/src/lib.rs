//! Hybrid fusion of the collaborative and content signals.
//!
//! This crate sits between the signal generators and the orchestrating
//! engine: it takes the two independently-scored lists, applies the caller's
//! weights, de-duplicates by movie id and re-ranks deterministically.
//!
//! Raw scores from the two signals live on different scales (predicted
//! rating vs. cosine similarity); the declared weights are the only way
//! they are ever combined.

pub mod fuse;

pub use fuse::HybridFusionEngine;
