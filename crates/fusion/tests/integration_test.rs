//! Integration tests for fusion over real recommender output.
//!
//! These tests verify that the fusion engine behaves correctly when fed
//! lists produced by actually-trained models rather than hand-built ones.

use data_loader::{Movie, MovieCatalog, Rating, RatingStore};
use fusion::HybridFusionEngine;
use recommenders::{ContentSimilarityRecommender, LatentFactorRecommender, SignalSource};

fn create_test_setup() -> (RatingStore, MovieCatalog) {
    let mut store = RatingStore::new();

    // Users 1-4 like the space movies (1-3), users 5-8 like the romance
    // movies (4-6); user 1 has not yet seen movies 3 and 6
    for user_id in 1..=4u32 {
        for movie_id in 1..=3u32 {
            if user_id == 1 && movie_id == 3 {
                continue;
            }
            store.insert_rating(Rating {
                user_id,
                movie_id,
                value: 5.0,
            });
        }
        store.insert_rating(Rating {
            user_id,
            movie_id: 4,
            value: 1.5,
        });
    }
    for user_id in 5..=8u32 {
        for movie_id in 4..=6u32 {
            store.insert_rating(Rating {
                user_id,
                movie_id,
                value: 4.5,
            });
        }
        store.insert_rating(Rating {
            user_id,
            movie_id: 1,
            value: 2.0,
        });
    }

    let catalog = MovieCatalog::from_movies(vec![
        Movie {
            id: 1,
            title: "Star Voyage (1998)".to_string(),
            description: Some("space crew explores distant galaxy".to_string()),
        },
        Movie {
            id: 2,
            title: "Galaxy Rim (2001)".to_string(),
            description: Some("space battle at the galaxy rim".to_string()),
        },
        Movie {
            id: 3,
            title: "Cold Orbit (2003)".to_string(),
            description: Some("stranded space crew fights for survival".to_string()),
        },
        Movie {
            id: 4,
            title: "Letters Home (1999)".to_string(),
            description: Some("long distance romance told in letters".to_string()),
        },
        Movie {
            id: 5,
            title: "Second Spring (2002)".to_string(),
            description: Some("late romance in a small town".to_string()),
        },
        Movie {
            id: 6,
            title: "Harbor Lights (2004)".to_string(),
            description: Some("romance between two lighthouse keepers".to_string()),
        },
    ]);

    (store, catalog)
}

#[test]
fn test_fused_output_is_deduplicated_and_ranked() {
    let (store, catalog) = create_test_setup();

    let model = LatentFactorRecommender::new()
        .with_factors(8)
        .with_epochs(40)
        .with_seed(11)
        .train(&store)
        .unwrap();
    let space = ContentSimilarityRecommender::new().train(&catalog).unwrap();

    let collab = model.recommend(&store, 1, 6).unwrap();
    let content = space.similar(1, 6).unwrap();

    let fused = HybridFusionEngine::new()
        .fuse(&collab, &content, 0.7, 0.3, 6)
        .unwrap();

    assert!(!fused.is_empty());

    let mut seen = std::collections::HashSet::new();
    for entry in &fused {
        assert!(seen.insert(entry.movie_id), "duplicate movie after fusion");
    }
    for pair in fused.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_shared_movies_carry_hybrid_provenance() {
    let (store, catalog) = create_test_setup();

    let model = LatentFactorRecommender::new()
        .with_factors(8)
        .with_epochs(40)
        .with_seed(11)
        .train(&store)
        .unwrap();
    let space = ContentSimilarityRecommender::new().train(&catalog).unwrap();

    // Both signals can see every movie user 1 hasn't rated, so any movie in
    // both lists must come out tagged Hybrid
    let collab = model.recommend(&store, 1, 6).unwrap();
    let content = space.similar(1, 6).unwrap();
    let fused = HybridFusionEngine::new()
        .fuse(&collab, &content, 0.5, 0.5, 10)
        .unwrap();

    let collab_ids: std::collections::HashSet<_> = collab.iter().map(|s| s.movie_id).collect();
    let content_ids: std::collections::HashSet<_> = content.iter().map(|s| s.movie_id).collect();
    for entry in &fused {
        if collab_ids.contains(&entry.movie_id) && content_ids.contains(&entry.movie_id) {
            assert_eq!(entry.source, SignalSource::Hybrid);
        }
    }
}

#[test]
fn test_collaborative_only_fusion_matches_collaborative_ranking() {
    let (store, _catalog) = create_test_setup();

    let model = LatentFactorRecommender::new()
        .with_factors(8)
        .with_epochs(40)
        .with_seed(11)
        .train(&store)
        .unwrap();

    let collab = model.recommend(&store, 1, 6).unwrap();
    let fused = HybridFusionEngine::new()
        .fuse(&collab, &[], 1.0, 0.0, 6)
        .unwrap();

    let collab_ids: Vec<_> = collab.iter().map(|s| s.movie_id).collect();
    let fused_ids: Vec<_> = fused.iter().map(|s| s.movie_id).collect();
    assert_eq!(collab_ids, fused_ids);
}

#[test]
fn test_content_signal_boosts_similar_movie() {
    let (store, catalog) = create_test_setup();

    let model = LatentFactorRecommender::new()
        .with_factors(8)
        .with_epochs(40)
        .with_seed(11)
        .train(&store)
        .unwrap();
    let space = ContentSimilarityRecommender::new().train(&catalog).unwrap();

    let collab = model.recommend(&store, 1, 6).unwrap();
    let content = space.similar(1, 6).unwrap();

    // With all the weight on content, the space movies (sharing vocabulary
    // with the reference) must outrank the romance movies
    let fused = HybridFusionEngine::new()
        .fuse(&collab, &content, 0.0, 1.0, 2)
        .unwrap();
    for entry in &fused {
        assert!(
            entry.movie_id == 2 || entry.movie_id == 3,
            "expected a space movie at the top, got {}",
            entry.movie_id
        );
    }
}
