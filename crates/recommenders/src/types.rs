//! Shared types for scored recommendation output.

use data_loader::MovieId;
use serde::Serialize;
use std::cmp::Ordering;

/// Which signal produced a score.
///
/// Scores are NOT comparable across sources without explicit weighting: a
/// collaborative score is a predicted rating on the observed scale, a
/// content score is a cosine similarity, and a hybrid score is a declared
/// weighted sum of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalSource {
    Collaborative,
    Content,
    Hybrid,
}

/// One scored movie in a recommendation list.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
    pub source: SignalSource,
}

impl ScoredMovie {
    pub fn new(movie_id: MovieId, score: f32, source: SignalSource) -> Self {
        Self {
            movie_id,
            score,
            source,
        }
    }
}

/// Sort a scored list into its final order: descending by score, ties broken
/// by ascending movie id so equal scores always come out in the same order.
pub fn rank(list: &mut [ScoredMovie]) {
    list.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
}

/// Whether a list is in ranked order (descending score, ascending id ties).
pub fn is_ranked(list: &[ScoredMovie]) -> bool {
    list.windows(2).all(|w| {
        match w[0].score.total_cmp(&w[1].score) {
            Ordering::Greater => true,
            Ordering::Equal => w[0].movie_id < w[1].movie_id,
            Ordering::Less => false,
        }
    })
}
