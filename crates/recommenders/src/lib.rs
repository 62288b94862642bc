//! # Recommenders Crate
//!
//! The two independent recommendation signals plus the evaluator.
//!
//! ## Components
//!
//! ### Latent-factor collaborative filtering
//! Learns user and movie factor matrices with bias terms from the rating
//! history (SGD over squared error with L2 regularization), predicts unseen
//! (user, movie) ratings, and produces top-N lists that never include a
//! movie the user already rated.
//!
//! ### Content similarity
//! TF-IDF vectors over movie descriptions with cosine ranking against a
//! reference movie. A catalog without usable text trains to an explicit
//! unavailable state instead of an error.
//!
//! ### Evaluator
//! Seeded train/test splitting and held-out RMSE/MAE.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommenders::{ContentSimilarityRecommender, LatentFactorRecommender};
//!
//! let model = LatentFactorRecommender::new()
//!     .with_factors(32)
//!     .train(&store)?;
//! let picks = model.recommend(&store, user_id, 10)?;
//!
//! if let Some(space) = ContentSimilarityRecommender::new().train(&catalog) {
//!     let neighbors = space.similar(reference_movie, 10)?;
//! }
//! ```
//!
//! Trained models and vector spaces are immutable, so concurrent readers
//! can share them freely; retraining always builds a new instance.

// Public modules
pub mod content;
pub mod error;
pub mod evaluator;
pub mod latent;
pub mod types;

// Re-export commonly used types
pub use content::{ContentSimilarityRecommender, ContentVectorSpace};
pub use error::{RecommendError, Result};
pub use evaluator::{evaluate, split_ratings, EvaluationMetrics};
pub use latent::{ColdStartPolicy, LatentFactorModel, LatentFactorRecommender};
pub use types::{rank, ScoredMovie, SignalSource};
