//! Weighted-sum fusion of the two recommendation signals.

use data_loader::MovieId;
use recommenders::{rank, RecommendError, Result, ScoredMovie, SignalSource};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Merges collaborative and content score lists into one ranked list.
///
/// Accumulation is keyed by movie id, which is also the de-duplication
/// mechanism: a movie recommended by both signals ends up as a single entry
/// carrying the combined weighted score.
///
/// ## Usage
/// ```ignore
/// let engine = HybridFusionEngine::new();
/// let ranked = engine.fuse(&collab, &content, 0.6, 0.4, 10)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct HybridFusionEngine;

impl HybridFusionEngine {
    /// Create a new fusion engine.
    pub fn new() -> Self {
        Self
    }

    /// Fuse two scored lists with the given weights and return the top n.
    ///
    /// For every movie in either list the fused score is
    /// `collab_weight * collab_score + content_weight * content_score`,
    /// a missing entry contributing 0 to its term. An empty list therefore
    /// degrades fusion to a single-signal ranking instead of failing.
    ///
    /// Weights do not need to sum to 1, but each must be non-negative and
    /// finite. Output order is deterministic: descending fused score, ties
    /// broken by ascending movie id.
    #[instrument(skip(self, collaborative, content))]
    pub fn fuse(
        &self,
        collaborative: &[ScoredMovie],
        content: &[ScoredMovie],
        collab_weight: f32,
        content_weight: f32,
        top_n: usize,
    ) -> Result<Vec<ScoredMovie>> {
        check_weight(collab_weight)?;
        check_weight(content_weight)?;

        // (fused score, seen in collaborative, seen in content)
        let mut accumulated: HashMap<MovieId, (f32, bool, bool)> = HashMap::new();

        for scored in collaborative {
            let entry = accumulated
                .entry(scored.movie_id)
                .or_insert((0.0, false, false));
            entry.0 += collab_weight * scored.score;
            entry.1 = true;
        }
        for scored in content {
            let entry = accumulated
                .entry(scored.movie_id)
                .or_insert((0.0, false, false));
            entry.0 += content_weight * scored.score;
            entry.2 = true;
        }

        let mut fused: Vec<ScoredMovie> = accumulated
            .into_iter()
            .map(|(movie_id, (score, from_collab, from_content))| {
                let source = match (from_collab, from_content) {
                    (true, true) => SignalSource::Hybrid,
                    (true, false) => SignalSource::Collaborative,
                    _ => SignalSource::Content,
                };
                ScoredMovie::new(movie_id, score, source)
            })
            .collect();

        rank(&mut fused);
        fused.truncate(top_n);

        debug!(
            collaborative = collaborative.len(),
            content = content.len(),
            fused = fused.len(),
            "signals fused"
        );
        Ok(fused)
    }
}

fn check_weight(weight: f32) -> Result<()> {
    if weight < 0.0 || !weight.is_finite() {
        return Err(RecommendError::InvalidWeight(weight));
    }
    Ok(())
}
