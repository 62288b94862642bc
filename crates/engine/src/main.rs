//! Simple test harness for the recommendation engine.
//!
//! Loads the data directory, trains both models, and prints one hybrid
//! request end to end.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use data_loader::load_from_files;
use engine::{RecommendRequest, RecommendationEngine};
use recommenders::{ContentSimilarityRecommender, LatentFactorRecommender};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info,engine=debug,recommenders=debug,fusion=debug")
        .init();

    info!("Starting engine test harness");

    info!("Loading data...");
    let (store, catalog) = load_from_files(Path::new("data"))?;
    let store = Arc::new(store);
    let catalog = Arc::new(catalog);

    info!("Training models...");
    let engine = RecommendationEngine::train(
        store,
        catalog,
        LatentFactorRecommender::new().with_factors(32).with_epochs(15),
        ContentSimilarityRecommender::new(),
    )
    .await?;

    let mut request = RecommendRequest::new(1);
    request.top_n = 20;

    info!("Requesting recommendations for user {}", request.user_id);
    let recommendations = engine.get_recommendations(&request)?;

    info!("Received {} recommendations:", recommendations.len());
    for (i, rec) in recommendations.iter().enumerate() {
        info!(
            "{}. {} - Score: {:.3} [{:?}]",
            i + 1,
            rec.title,
            rec.score,
            rec.source
        );
    }

    Ok(())
}
