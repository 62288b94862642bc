//! # Data Loader Crate
//!
//! This crate is the external collaborator that turns raw data files into
//! the two validated in-memory tables the recommendation core consumes.
//! The core itself never touches files or raw lines.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Rating, Movie, RatingStore, MovieCatalog)
//! - **parser**: Parse `::`-separated .dat files into typed rows
//! - **store**: Parallel loading plus referential validation
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::load_from_files;
//! use std::path::Path;
//!
//! let (store, catalog) = load_from_files(Path::new("data"))?;
//!
//! let ratings = store.user_ratings(1);
//! let movie = catalog.movie(1193).unwrap();
//! println!("{} has {} ratings loaded", movie.title, ratings.len());
//! ```

// Public modules
pub mod error;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use store::load_from_files;
pub use types::{Movie, MovieCatalog, MovieId, Rating, RatingStore, UserId};
