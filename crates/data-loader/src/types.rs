//! Core domain types for the ratings and movie tables.
//!
//! This module defines the fundamental data structures used throughout the
//! system: the raw `Rating` and `Movie` rows, and the two owned, read-only
//! stores built from them (`RatingStore`, `MovieCatalog`). The stores are
//! loaded once per session; everything downstream borrows from them.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Row Types
// =============================================================================

/// A single rating a user gave a movie.
///
/// The value is a bounded real number; the bound is whatever the loaded data
/// exhibits (see [`RatingStore::value_bounds`]), never a hardcoded scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub value: f32,
}

/// A movie in the catalog.
///
/// The free-text description feeds the content-similarity model. It may be
/// absent; a missing description is treated as empty text, never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub description: Option<String>,
}

impl Movie {
    /// The description as text, empty string when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

// =============================================================================
// RatingStore - the normalized ratings table
// =============================================================================

/// Owns all loaded ratings plus per-user and per-movie indices.
///
/// Immutable once loading finishes: training reads from it, nothing writes.
/// Provides O(1) per-user and per-movie rating lookups through HashMap
/// indices, plus the observed value bounds and global mean that the
/// factorization model needs.
#[derive(Debug, Default)]
pub struct RatingStore {
    ratings: Vec<Rating>,
    user_ratings: HashMap<UserId, Vec<Rating>>,
    movie_ratings: HashMap<MovieId, Vec<Rating>>,
    value_sum: f64,
    value_bounds: Option<(f32, f32)>,
}

impl RatingStore {
    /// Creates a new, empty RatingStore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-parsed rating rows.
    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        let mut store = Self::new();
        for rating in ratings {
            store.insert_rating(rating);
        }
        store
    }

    /// Insert a rating and update both indices and the running statistics.
    pub fn insert_rating(&mut self, rating: Rating) {
        self.value_sum += f64::from(rating.value);
        self.value_bounds = match self.value_bounds {
            None => Some((rating.value, rating.value)),
            Some((lo, hi)) => Some((lo.min(rating.value), hi.max(rating.value))),
        };

        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);
        self.movie_ratings
            .entry(rating.movie_id)
            .or_default()
            .push(rating);
        self.ratings.push(rating);
    }

    /// All ratings in load order.
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// All ratings made by a user; empty slice if the user is unknown.
    pub fn user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All ratings received by a movie; empty slice if the movie is unknown.
    pub fn movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The set of movies a user has already rated.
    pub fn rated_movies(&self, user_id: UserId) -> HashSet<MovieId> {
        self.user_ratings(user_id)
            .iter()
            .map(|r| r.movie_id)
            .collect()
    }

    /// Whether the store has seen any rating from this user.
    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_ratings.contains_key(&user_id)
    }

    /// Observed (min, max) rating value, None for an empty store.
    pub fn value_bounds(&self) -> Option<(f32, f32)> {
        self.value_bounds
    }

    /// Mean over every loaded rating value, None for an empty store.
    pub fn global_mean(&self) -> Option<f32> {
        if self.ratings.is_empty() {
            None
        } else {
            Some((self.value_sum / self.ratings.len() as f64) as f32)
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Get counts for debugging/validation: (users, movies, ratings).
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.user_ratings.len(),
            self.movie_ratings.len(),
            self.ratings.len(),
        )
    }
}

// =============================================================================
// MovieCatalog - the item table
// =============================================================================

/// Owns the movie table, keyed by id.
///
/// The catalog is what the content-similarity model vectorizes and what the
/// final ranking resolves titles from.
#[derive(Debug, Default)]
pub struct MovieCatalog {
    movies: HashMap<MovieId, Movie>,
}

impl MovieCatalog {
    /// Creates a new, empty MovieCatalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from already-parsed movie rows. Later rows win on
    /// duplicate ids.
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let mut catalog = Self::new();
        for movie in movies {
            catalog.insert_movie(movie);
        }
        catalog
    }

    /// Insert a movie into the catalog.
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Get a movie by ID.
    pub fn movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.movies.contains_key(&id)
    }

    /// Iterate over all movies in unspecified order.
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// All movie ids, ascending. Sorted so iteration order is deterministic.
    pub fn movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
