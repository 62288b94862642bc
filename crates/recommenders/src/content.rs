//! Content similarity over movie descriptions.
//!
//! Builds a term-weighted vector space from the catalog's free-text
//! descriptions and ranks movies by cosine similarity to a reference movie.
//!
//! ## Algorithm
//! 1. Tokenize each description (lowercase, alphanumeric words), drop stop
//!    words and too-short tokens
//! 2. Weight each (movie, term) with smoothed TF-IDF:
//!    `tf * (ln((1 + docs) / (1 + doc_freq)) + 1)`
//! 3. L2-normalize each movie vector, so cosine similarity is a sparse dot
//!    product
//!
//! A movie without description text gets a zero vector: all of its
//! similarities are 0 and it simply never ranks highly. A catalog with no
//! usable text at all trains to `None` so callers can skip content scoring
//! instead of handling an error.

use crate::error::{RecommendError, Result};
use crate::types::{rank, ScoredMovie, SignalSource};
use data_loader::{MovieCatalog, MovieId};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument};

/// Stop words stripped before weighting. Overridable per recommender.
const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "he", "her",
    "his", "in", "is", "it", "its", "of", "on", "or", "she", "that", "the", "their", "them",
    "they", "this", "to", "was", "were", "when", "who", "will", "with",
];

/// Builds content vector spaces from a movie catalog.
#[derive(Debug, Clone)]
pub struct ContentSimilarityRecommender {
    stop_words: HashSet<String>,
    min_token_len: usize,
}

impl Default for ContentSimilarityRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSimilarityRecommender {
    pub fn new() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_token_len: 2,
        }
    }

    /// Replace the stop-word set.
    pub fn with_stop_words(mut self, stop_words: impl IntoIterator<Item = String>) -> Self {
        self.stop_words = stop_words.into_iter().collect();
        self
    }

    /// Configure the minimum token length (default: 2)
    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = min_token_len.max(1);
        self
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() >= self.min_token_len)
            .filter(|t| !self.stop_words.contains(*t))
            .map(|t| t.to_string())
            .collect()
    }

    /// Vectorize every movie description in the catalog.
    ///
    /// Returns `None` when not a single movie has usable text, the explicit
    /// "content signal unavailable" state.
    #[instrument(skip(self, catalog), fields(movies = catalog.len()))]
    pub fn train(&self, catalog: &MovieCatalog) -> Option<ContentVectorSpace> {
        // Ascending ids keep vocabulary and vector construction deterministic
        let movie_ids = catalog.movie_ids();
        let documents: Vec<(MovieId, Vec<String>)> = movie_ids
            .iter()
            .map(|&id| {
                let text = catalog.movie(id).map(|m| m.description_text()).unwrap_or("");
                (id, self.tokenize(text))
            })
            .collect();

        if documents.iter().all(|(_, tokens)| tokens.is_empty()) {
            debug!("no movie has usable description text");
            return None;
        }

        // Vocabulary: every distinct term, dimension-indexed in sorted order
        let terms: BTreeSet<&str> = documents
            .iter()
            .flat_map(|(_, tokens)| tokens.iter().map(|t| t.as_str()))
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(dim, term)| (term.to_string(), dim))
            .collect();

        // Document frequency per dimension
        let mut doc_freq = vec![0usize; vocabulary.len()];
        for (_, tokens) in &documents {
            let distinct: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();
            for term in distinct {
                if let Some(&dim) = vocabulary.get(term) {
                    doc_freq[dim] += 1;
                }
            }
        }

        let n_docs = documents.len() as f32;
        let mut vectors: HashMap<MovieId, Vec<(usize, f32)>> = HashMap::new();
        for (movie_id, tokens) in &documents {
            vectors.insert(*movie_id, weigh(tokens, &vocabulary, &doc_freq, n_docs));
        }

        debug!(
            vocabulary = vocabulary.len(),
            vectors = vectors.len(),
            "content vector space built"
        );
        Some(ContentVectorSpace {
            vocabulary,
            vectors,
            movie_ids,
        })
    }
}

/// Smoothed TF-IDF weights for one token stream, L2-normalized, sparse and
/// sorted by dimension.
fn weigh(
    tokens: &[String],
    vocabulary: &HashMap<String, usize>,
    doc_freq: &[usize],
    n_docs: f32,
) -> Vec<(usize, f32)> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for token in tokens {
        if let Some(&dim) = vocabulary.get(token) {
            *counts.entry(dim).or_insert(0) += 1;
        }
    }

    let doc_len = tokens.len() as f32;
    let mut weights: Vec<(usize, f32)> = counts
        .into_iter()
        .map(|(dim, count)| {
            let tf = count as f32 / doc_len;
            let idf = ((1.0 + n_docs) / (1.0 + doc_freq[dim] as f32)).ln() + 1.0;
            (dim, tf * idf)
        })
        .collect();
    weights.sort_unstable_by_key(|(dim, _)| *dim);

    let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut weights {
            *w /= norm;
        }
    }
    weights
}

/// Dot product of two sparse vectors sorted by dimension.
fn sparse_dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let mut sum = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// An immutable trained vector space: one weighted vector per movie over a
/// shared vocabulary.
#[derive(Debug, Clone)]
pub struct ContentVectorSpace {
    vocabulary: HashMap<String, usize>,
    vectors: HashMap<MovieId, Vec<(usize, f32)>>,
    movie_ids: Vec<MovieId>,
}

impl ContentVectorSpace {
    /// Number of dimensions, which equals the vocabulary size.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether a movie was vectorized (true even for zero vectors).
    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.vectors.contains_key(&movie_id)
    }

    /// Cosine similarity between two vectorized movies.
    pub fn similarity(&self, a: MovieId, b: MovieId) -> Result<f32> {
        let va = self
            .vectors
            .get(&a)
            .ok_or(RecommendError::UnknownMovie(a))?;
        let vb = self
            .vectors
            .get(&b)
            .ok_or(RecommendError::UnknownMovie(b))?;
        Ok(sparse_dot(va, vb))
    }

    /// Top-n movies most similar to the reference, descending by cosine
    /// similarity, ties broken by ascending id. The reference itself is
    /// never part of the output.
    #[instrument(skip(self))]
    pub fn similar(&self, reference: MovieId, n: usize) -> Result<Vec<ScoredMovie>> {
        let reference_vec = self
            .vectors
            .get(&reference)
            .ok_or(RecommendError::UnknownMovie(reference))?;

        let mut scored: Vec<ScoredMovie> = self
            .movie_ids
            .iter()
            .filter(|&&id| id != reference)
            .map(|&id| {
                let score = self
                    .vectors
                    .get(&id)
                    .map(|v| sparse_dot(reference_vec, v))
                    .unwrap_or(0.0);
                ScoredMovie::new(id, score, SignalSource::Content)
            })
            .collect();

        rank(&mut scored);
        scored.truncate(n);
        debug!(reference, returned = scored.len(), "similar movies ranked");
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;

    fn movie(id: MovieId, description: &str) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        }
    }

    fn space_of(movies: Vec<Movie>) -> ContentVectorSpace {
        ContentSimilarityRecommender::new()
            .train(&MovieCatalog::from_movies(movies))
            .expect("catalog has usable text")
    }

    #[test]
    fn test_identical_descriptions_rank_first() {
        let space = space_of(vec![
            movie(1, "space adventure robots"),
            movie(2, "space adventure robots"),
            movie(3, "romantic comedy"),
        ]);

        let similar = space.similar(1, 2).unwrap();
        assert_eq!(similar[0].movie_id, 2);
        assert!((similar[0].score - 1.0).abs() < 1e-5);
        assert!(similar[0].score > similar[1].score);
    }

    #[test]
    fn test_reference_is_never_in_output() {
        let space = space_of(vec![
            movie(1, "heist thriller in space"),
            movie(2, "space heist gone wrong"),
            movie(3, "quiet countryside drama"),
        ]);

        for reference in [1, 2, 3] {
            let similar = space.similar(reference, 10).unwrap();
            assert!(similar.iter().all(|s| s.movie_id != reference));
        }
    }

    #[test]
    fn test_unknown_reference_fails() {
        let space = space_of(vec![movie(1, "some text"), movie(2, "other text")]);
        let err = space.similar(99, 3).unwrap_err();
        assert!(matches!(err, RecommendError::UnknownMovie(99)));
    }

    #[test]
    fn test_empty_description_gets_zero_vector() {
        let space = space_of(vec![
            movie(1, "silent film about machines"),
            movie(2, ""),
            movie(3, "machines take over the world"),
        ]);

        // Movie 2 is vectorized, scores 0 against everything, and sits at
        // the bottom of the ranking
        assert!(space.contains(2));
        assert_eq!(space.similarity(1, 2).unwrap(), 0.0);

        let similar = space.similar(1, 2).unwrap();
        assert_eq!(similar[0].movie_id, 3);
        assert_eq!(similar[1].movie_id, 2);
        assert_eq!(similar[1].score, 0.0);
    }

    #[test]
    fn test_no_usable_text_is_unavailable_not_an_error() {
        let catalog = MovieCatalog::from_movies(vec![movie(1, ""), movie(2, "")]);
        assert!(ContentSimilarityRecommender::new().train(&catalog).is_none());
    }

    #[test]
    fn test_stop_words_do_not_create_similarity() {
        let space = space_of(vec![
            movie(1, "the and of in that"),
            movie(2, "the and of in this"),
            movie(3, "volcanic expedition documentary"),
        ]);

        // Stop-word-only descriptions tokenize to nothing, so the two
        // "matching" movies share no signal at all
        assert_eq!(space.similarity(1, 2).unwrap(), 0.0);
    }

    #[test]
    fn test_vector_dimensionality_matches_vocabulary() {
        let space = space_of(vec![
            movie(1, "alpha beta gamma"),
            movie(2, "beta gamma delta"),
        ]);
        assert_eq!(space.vocabulary_size(), 4);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let space = space_of(vec![
            movie(1, "deep sea exploration"),
            movie(2, "sea creatures of the deep"),
        ]);
        let ab = space.similarity(1, 2).unwrap();
        let ba = space.similarity(2, 1).unwrap();
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab > 0.0);
    }
}
