//! Loading and validating the two stores from a data directory.
//!
//! This is the boundary between files on disk and the in-memory tables the
//! recommendation core works against: parse both files in parallel, build
//! the owned stores, then check referential integrity so the core can rely
//! on every rating pointing at a cataloged movie.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{MovieCatalog, RatingStore};
use std::path::Path;
use tracing::info;

/// Load `ratings.dat` and `movies.dat` from a directory.
///
/// Steps:
/// 1. Parse both files in parallel
/// 2. Build RatingStore and MovieCatalog
/// 3. Validate that every rating references a cataloged movie
pub fn load_from_files(data_dir: &Path) -> Result<(RatingStore, MovieCatalog)> {
    let ratings_path = data_dir.join("ratings.dat");
    let movies_path = data_dir.join("movies.dat");

    // Rayon's `join` runs the two parsers in parallel
    let (ratings, movies) = rayon::join(
        || parser::parse_ratings(&ratings_path),
        || parser::parse_movies(&movies_path),
    );
    let ratings = ratings?;
    let movies = movies?;

    info!(
        ratings = ratings.len(),
        movies = movies.len(),
        "parsed data files"
    );

    let store = RatingStore::from_ratings(ratings);
    let catalog = MovieCatalog::from_movies(movies);

    validate(&store, &catalog)?;

    let (users, rated_movies, total) = store.counts();
    info!(
        users,
        rated_movies,
        total,
        catalog = catalog.len(),
        "stores built and validated"
    );

    Ok((store, catalog))
}

/// Check that every rating references a movie present in the catalog.
pub fn validate(store: &RatingStore, catalog: &MovieCatalog) -> Result<()> {
    for rating in store.ratings() {
        if !catalog.contains(rating.movie_id) {
            return Err(DataLoadError::MissingReference {
                entity: "Movie".to_string(),
                id: rating.movie_id,
            });
        }
    }
    Ok(())
}
