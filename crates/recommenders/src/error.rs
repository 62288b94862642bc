//! Error types shared by the recommenders and the fusion engine.
//!
//! Every variant is recoverable: a failed call fails that call only and
//! never invalidates an already-trained model or vector space.

use data_loader::{MovieId, UserId};
use thiserror::Error;

/// Errors produced by training, querying, fusing and evaluating models.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Training was called on an empty ratings collection
    #[error("training requires at least one rating")]
    InsufficientData,

    /// The user has no representation in the trained model and the
    /// configured policy asked for an error instead of a fallback
    #[error("user {0} is not part of the trained model")]
    UnknownUser(UserId),

    /// The movie has no content vector (absent from the vectorized catalog)
    #[error("movie {0} has no content vector")]
    UnknownMovie(MovieId),

    /// A fusion weight was negative or not a finite number
    #[error("fusion weight must be a non-negative finite number, got {0}")]
    InvalidWeight(f32),

    /// Evaluation was called on an empty held-out set
    #[error("evaluation requires a non-empty test set")]
    EmptyTestSet,

    /// The requested train/test fraction is outside (0, 1)
    #[error("test fraction must be inside (0, 1), got {0}")]
    InvalidTestFraction(f32),
}

/// Convenience type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, RecommendError>;
