//! Latent-factor collaborative filtering.
//!
//! Learns a low-rank factorization of the user-movie rating matrix with
//! per-user and per-movie bias terms, trained by stochastic gradient descent
//! on squared prediction error plus L2 regularization.
//!
//! ## Algorithm
//! 1. Index every user and movie seen in the training ratings
//! 2. Initialize factor matrices from a seeded RNG, biases at zero
//! 3. For each epoch, sweep the ratings in load order and apply the
//!    bias/factor gradient updates
//! 4. Predictions are `mean + user bias + movie bias + dot(factors)`,
//!    clipped to the observed rating range
//!
//! Training is deterministic for a fixed seed and input order. The trained
//! model is immutable; retraining builds a new one.

use crate::error::{RecommendError, Result};
use crate::types::{rank, ScoredMovie, SignalSource};
use data_loader::{MovieId, RatingStore, UserId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// What `recommend` does for a user the model has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColdStartPolicy {
    /// Rank through the global-mean prediction fallback (default)
    MeanFallback,
    /// Fail with `RecommendError::UnknownUser`
    Strict,
}

/// Trains latent-factor models from a rating store.
#[derive(Debug, Clone)]
pub struct LatentFactorRecommender {
    factors: usize,
    learning_rate: f32,
    regularization: f32,
    epochs: usize,
    seed: u64,
    cold_start: ColdStartPolicy,
}

impl Default for LatentFactorRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl LatentFactorRecommender {
    pub fn new() -> Self {
        Self {
            factors: 100,
            learning_rate: 0.005,
            regularization: 0.02,
            epochs: 20,
            seed: 7,
            cold_start: ColdStartPolicy::MeanFallback,
        }
    }

    /// Configure the number of latent factors (default: 100)
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors.max(1);
        self
    }

    /// Configure the SGD learning rate (default: 0.005)
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Configure the L2 regularization strength (default: 0.02)
    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    /// Configure the number of training epochs (default: 20)
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs.max(1);
        self
    }

    /// Configure the factor-initialization seed (default: 7)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Configure the unknown-user policy (default: MeanFallback)
    pub fn with_cold_start(mut self, policy: ColdStartPolicy) -> Self {
        self.cold_start = policy;
        self
    }

    /// Fit a model to every rating in the store.
    #[instrument(skip(self, store), fields(ratings = store.len(), factors = self.factors))]
    pub fn train(&self, store: &RatingStore) -> Result<LatentFactorModel> {
        if store.is_empty() {
            return Err(RecommendError::InsufficientData);
        }

        // Index users and movies in first-seen order so training is
        // reproducible for the same input
        let mut user_index: HashMap<UserId, usize> = HashMap::new();
        let mut movie_index: HashMap<MovieId, usize> = HashMap::new();
        let mut movie_ids: Vec<MovieId> = Vec::new();
        for rating in store.ratings() {
            let next_user = user_index.len();
            user_index.entry(rating.user_id).or_insert(next_user);
            if !movie_index.contains_key(&rating.movie_id) {
                movie_index.insert(rating.movie_id, movie_ids.len());
                movie_ids.push(rating.movie_id);
            }
        }

        let n_users = user_index.len();
        let n_movies = movie_ids.len();
        let k = self.factors;
        let global_mean = store.global_mean().ok_or(RecommendError::InsufficientData)?;
        let value_bounds = store
            .value_bounds()
            .ok_or(RecommendError::InsufficientData)?;

        // Small random factors around zero; biases start flat
        let mut rng = StdRng::seed_from_u64(self.seed);
        let scale = 0.1 / (k as f32).sqrt();
        let mut user_factors: Vec<f32> = (0..n_users * k)
            .map(|_| (rng.random::<f32>() - 0.5) * scale)
            .collect();
        let mut movie_factors: Vec<f32> = (0..n_movies * k)
            .map(|_| (rng.random::<f32>() - 0.5) * scale)
            .collect();
        let mut user_bias = vec![0.0f32; n_users];
        let mut movie_bias = vec![0.0f32; n_movies];

        let lr = self.learning_rate;
        let reg = self.regularization;

        for epoch in 0..self.epochs {
            let mut squared_error = 0.0f64;
            for rating in store.ratings() {
                let u = user_index[&rating.user_id];
                let m = movie_index[&rating.movie_id];
                let uf = &user_factors[u * k..(u + 1) * k];
                let mf = &movie_factors[m * k..(m + 1) * k];
                let predicted = global_mean + user_bias[u] + movie_bias[m] + dot(uf, mf);
                let err = rating.value - predicted;
                squared_error += f64::from(err * err);

                user_bias[u] += lr * (err - reg * user_bias[u]);
                movie_bias[m] += lr * (err - reg * movie_bias[m]);
                for f in 0..k {
                    let uf = user_factors[u * k + f];
                    let mf = movie_factors[m * k + f];
                    user_factors[u * k + f] += lr * (err * mf - reg * uf);
                    movie_factors[m * k + f] += lr * (err * uf - reg * mf);
                }
            }
            debug!(
                epoch,
                train_rmse = (squared_error / store.len() as f64).sqrt(),
                "epoch complete"
            );
        }

        Ok(LatentFactorModel {
            user_index,
            movie_index,
            movie_ids,
            factors: k,
            user_factors,
            movie_factors,
            user_bias,
            movie_bias,
            global_mean,
            value_bounds,
            cold_start: self.cold_start,
        })
    }
}

/// An immutable trained factorization model.
///
/// Only users and movies present in the training ratings have factor rows;
/// any other id falls back to the global mean instead of failing.
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
    movie_ids: Vec<MovieId>,
    factors: usize,
    user_factors: Vec<f32>,
    movie_factors: Vec<f32>,
    user_bias: Vec<f32>,
    movie_bias: Vec<f32>,
    global_mean: f32,
    value_bounds: (f32, f32),
    cold_start: ColdStartPolicy,
}

impl LatentFactorModel {
    /// Predicted rating for a (user, movie) pair, clipped to the observed
    /// rating range. An unseen user or movie gets the global mean.
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        let (Some(&u), Some(&m)) = (
            self.user_index.get(&user_id),
            self.movie_index.get(&movie_id),
        ) else {
            return self.global_mean;
        };

        let k = self.factors;
        let uf = &self.user_factors[u * k..(u + 1) * k];
        let mf = &self.movie_factors[m * k..(m + 1) * k];
        let raw = self.global_mean + self.user_bias[u] + self.movie_bias[m] + dot(uf, mf);
        raw.clamp(self.value_bounds.0, self.value_bounds.1)
    }

    /// Top-n recommendations for a user over every trained movie the user
    /// has not already rated, descending by predicted rating, ties broken by
    /// ascending movie id.
    #[instrument(skip(self, store))]
    pub fn recommend(
        &self,
        store: &RatingStore,
        user_id: UserId,
        n: usize,
    ) -> Result<Vec<ScoredMovie>> {
        if !self.user_index.contains_key(&user_id) {
            match self.cold_start {
                ColdStartPolicy::Strict => return Err(RecommendError::UnknownUser(user_id)),
                ColdStartPolicy::MeanFallback => {
                    debug!(user_id, "unknown user, ranking through mean fallback")
                }
            }
        }

        let rated = store.rated_movies(user_id);
        let mut scored: Vec<ScoredMovie> = self
            .movie_ids
            .par_iter()
            .filter(|id| !rated.contains(*id))
            .map(|&id| {
                ScoredMovie::new(id, self.predict(user_id, id), SignalSource::Collaborative)
            })
            .collect();

        rank(&mut scored);
        scored.truncate(n);
        debug!(user_id, returned = scored.len(), "recommendations ready");
        Ok(scored)
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn knows_movie(&self, movie_id: MovieId) -> bool {
        self.movie_index.contains_key(&movie_id)
    }

    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    pub fn factors(&self) -> usize {
        self.factors
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
