//! # Recommendation Engine
//!
//! This module coordinates the whole recommendation flow:
//! 1. Train both models from the loaded stores (in parallel)
//! 2. Per request, generate the collaborative and/or content signal lists
//! 3. Fuse them with the caller's weights
//! 4. Resolve titles and return the ranked list
//!
//! The engine owns only immutable trained state behind `Arc`, so any number
//! of requests can read it concurrently. Retraining means building a new
//! engine value; readers of the old one are never affected.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use data_loader::{MovieCatalog, MovieId, RatingStore, UserId};
use fusion::HybridFusionEngine;
use recommenders::{
    ContentSimilarityRecommender, ContentVectorSpace, LatentFactorModel,
    LatentFactorRecommender, RecommendError, ScoredMovie, SignalSource,
};

/// How many candidates each signal contributes per requested slot, so a
/// movie ranked just below one signal's cut can still surface after
/// weighting.
const CANDIDATE_POOL_FACTOR: usize = 3;

/// One recommendation request.
#[derive(Debug, Clone)]
pub struct RecommendRequest {
    pub user_id: UserId,
    /// Reference movie for the content signal; without one, content scoring
    /// is skipped
    pub reference_movie: Option<MovieId>,
    pub use_collaborative: bool,
    pub use_content: bool,
    pub top_n: usize,
    pub collab_weight: f32,
    pub content_weight: f32,
}

impl RecommendRequest {
    /// A request with both signals enabled and the default weighting.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            reference_movie: None,
            use_collaborative: true,
            use_content: true,
            top_n: 10,
            collab_weight: 0.7,
            content_weight: 0.3,
        }
    }
}

/// Final recommendation returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
    pub source: SignalSource,
}

/// Trained, immutable recommendation state plus the fusion step.
#[derive(Clone)]
pub struct RecommendationEngine {
    rating_store: Arc<RatingStore>,
    catalog: Arc<MovieCatalog>,
    model: Arc<LatentFactorModel>,
    content_space: Option<Arc<ContentVectorSpace>>,
    fusion: HybridFusionEngine,
}

impl RecommendationEngine {
    /// Train both models from the loaded stores and assemble the engine.
    ///
    /// The two trainings are independent CPU-bound jobs, so they run on
    /// blocking threads in parallel. A catalog without usable description
    /// text simply disables the content signal.
    pub async fn train(
        rating_store: Arc<RatingStore>,
        catalog: Arc<MovieCatalog>,
        latent: LatentFactorRecommender,
        content: ContentSimilarityRecommender,
    ) -> Result<Self> {
        let start = Instant::now();

        let (model_result, space_result) = tokio::join!(
            tokio::task::spawn_blocking({
                let store = rating_store.clone();
                move || latent.train(&store)
            }),
            tokio::task::spawn_blocking({
                let catalog = catalog.clone();
                move || content.train(&catalog)
            })
        );

        let model = model_result.context("latent-factor training task panicked")??;
        let content_space = space_result.context("content training task panicked")?;
        if content_space.is_none() {
            warn!("catalog has no usable description text, content signal disabled");
        }

        info!(elapsed = ?start.elapsed(), "models trained");
        Ok(Self {
            rating_store,
            catalog,
            model: Arc::new(model),
            content_space: content_space.map(Arc::new),
            fusion: HybridFusionEngine::new(),
        })
    }

    /// Main entry point: a ranked, de-duplicated list for one request.
    ///
    /// Returns a populated list or a typed error — a request that fails
    /// never comes back as a silently empty list, and never disturbs the
    /// trained state.
    pub fn get_recommendations(
        &self,
        request: &RecommendRequest,
    ) -> std::result::Result<Vec<RankedMovie>, RecommendError> {
        let start = Instant::now();

        if !request.use_collaborative && !request.use_content {
            info!(user_id = request.user_id, "both signals disabled");
            return Ok(Vec::new());
        }

        let pool = request.top_n.saturating_mul(CANDIDATE_POOL_FACTOR);

        let collab_list = if request.use_collaborative {
            self.model
                .recommend(&self.rating_store, request.user_id, pool)?
        } else {
            Vec::new()
        };
        let content_list = self.content_candidates(request, pool)?;
        info!(
            user_id = request.user_id,
            collaborative = collab_list.len(),
            content = content_list.len(),
            "signal lists generated"
        );

        let fused = self.fusion.fuse(
            &collab_list,
            &content_list,
            request.collab_weight,
            request.content_weight,
            request.top_n,
        )?;

        let recommendations = self.resolve_titles(fused);
        info!(
            user_id = request.user_id,
            returned = recommendations.len(),
            elapsed = ?start.elapsed(),
            "request served"
        );
        Ok(recommendations)
    }

    /// Content-signal candidates for a request, or an empty list when the
    /// signal degrades (disabled, no reference movie, or no trained space).
    ///
    /// Similarity always comes from the precomputed vector space — the same
    /// definition the standalone `similar` operation uses. Movies the user
    /// already rated are dropped here so the content signal cannot
    /// reintroduce them into the fused list.
    fn content_candidates(
        &self,
        request: &RecommendRequest,
        pool: usize,
    ) -> std::result::Result<Vec<ScoredMovie>, RecommendError> {
        if !request.use_content {
            return Ok(Vec::new());
        }
        let Some(reference) = request.reference_movie else {
            info!("content signal requested without a reference movie, skipping");
            return Ok(Vec::new());
        };
        let Some(space) = &self.content_space else {
            info!("content space unavailable, skipping content signal");
            return Ok(Vec::new());
        };

        let rated = self.rating_store.rated_movies(request.user_id);
        let candidates = space
            .similar(reference, pool)?
            .into_iter()
            .filter(|s| !rated.contains(&s.movie_id))
            .collect();
        Ok(candidates)
    }

    fn resolve_titles(&self, scored: Vec<ScoredMovie>) -> Vec<RankedMovie> {
        scored
            .into_iter()
            .map(|s| RankedMovie {
                movie_id: s.movie_id,
                title: self
                    .catalog
                    .movie(s.movie_id)
                    .map(|m| m.title.clone())
                    .unwrap_or_else(|| format!("movie {}", s.movie_id)),
                score: s.score,
                source: s.source,
            })
            .collect()
    }

    pub fn model(&self) -> &LatentFactorModel {
        &self.model
    }

    pub fn content_available(&self) -> bool {
        self.content_space.is_some()
    }

    pub fn rating_store(&self) -> &RatingStore {
        &self.rating_store
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }
}
