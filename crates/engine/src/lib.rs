//! Orchestration layer: trained state plus the request surface.

pub mod engine;

pub use engine::{RankedMovie, RecommendRequest, RecommendationEngine};
