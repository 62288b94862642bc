use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{load_from_files, MovieCatalog, MovieId, RatingStore, UserId};
use engine::{RankedMovie, RecommendRequest, RecommendationEngine};
use recommenders::{
    evaluate, split_ratings, ContentSimilarityRecommender, LatentFactorRecommender,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Hybrid movie recommendation engine
#[derive(Parser)]
#[command(name = "hybrid-recs")]
#[command(
    about = "Movie recommendations fusing collaborative filtering with content similarity",
    long_about = None
)]
struct Cli {
    /// Path to the data directory holding ratings.dat and movies.dat
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Number of latent factors for model training
    #[arg(long, default_value = "32")]
    factors: usize,

    /// Number of training epochs
    #[arg(long, default_value = "20")]
    epochs: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get hybrid recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Reference movie feeding the content signal
        #[arg(long)]
        reference: Option<MovieId>,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Weight of the collaborative signal
        #[arg(long, default_value = "0.7")]
        collab_weight: f32,

        /// Weight of the content signal
        #[arg(long, default_value = "0.3")]
        content_weight: f32,

        /// Disable the collaborative signal
        #[arg(long)]
        no_collaborative: bool,

        /// Disable the content signal
        #[arg(long)]
        no_content: bool,

        /// Print the list as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Rank the movies most similar to a reference movie
    Similar {
        /// Reference movie ID
        #[arg(long)]
        movie_id: MovieId,

        /// Number of similar movies to return
        #[arg(long, default_value = "10")]
        top_n: usize,
    },

    /// Train on a random split and report held-out prediction error
    Evaluate {
        /// Fraction of ratings held out for testing
        #[arg(long, default_value = "0.2")]
        test_fraction: f32,

        /// Seed for the reproducible split
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show a user's rating history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading data from {}...", cli.data_dir.display());
    let start = Instant::now();
    let (store, catalog) =
        load_from_files(&cli.data_dir).context("Failed to load data directory")?;
    let store = Arc::new(store);
    let catalog = Arc::new(catalog);
    println!(
        "{} Loaded {} ratings and {} movies in {:?}",
        "✓".green(),
        store.len(),
        catalog.len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            user_id,
            reference,
            top_n,
            collab_weight,
            content_weight,
            no_collaborative,
            no_content,
            json,
        } => {
            let request = RecommendRequest {
                user_id,
                reference_movie: reference,
                use_collaborative: !no_collaborative,
                use_content: !no_content,
                top_n,
                collab_weight,
                content_weight,
            };
            handle_recommend(store, catalog, cli.factors, cli.epochs, request, json).await?
        }
        Commands::Similar { movie_id, top_n } => handle_similar(&catalog, movie_id, top_n)?,
        Commands::Evaluate { test_fraction, seed } => {
            handle_evaluate(&store, cli.factors, cli.epochs, test_fraction, seed)?
        }
        Commands::User { user_id } => handle_user(&store, &catalog, user_id)?,
        Commands::Search { title } => handle_search(&store, &catalog, title)?,
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    store: Arc<RatingStore>,
    catalog: Arc<MovieCatalog>,
    factors: usize,
    epochs: usize,
    request: RecommendRequest,
    json: bool,
) -> Result<()> {
    println!("Training models...");
    let start = Instant::now();
    let engine = RecommendationEngine::train(
        store,
        catalog,
        LatentFactorRecommender::new()
            .with_factors(factors)
            .with_epochs(epochs),
        ContentSimilarityRecommender::new(),
    )
    .await?;
    println!("{} Trained in {:?}", "✓".green(), start.elapsed());

    let recommendations = engine.get_recommendations(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(&recommendations);
    }
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(catalog: &MovieCatalog, movie_id: MovieId, top_n: usize) -> Result<()> {
    let reference = catalog
        .movie(movie_id)
        .ok_or_else(|| anyhow!("Movie {} not found", movie_id))?;

    let space = ContentSimilarityRecommender::new()
        .train(catalog)
        .ok_or_else(|| anyhow!("No movie has usable description text"))?;

    let similar = space.similar(movie_id, top_n)?;

    println!(
        "{}",
        format!("Movies similar to '{}':", reference.title).bold().blue()
    );
    for (i, entry) in similar.iter().enumerate() {
        let title = catalog
            .movie(entry.movie_id)
            .map(|m| m.title.as_str())
            .unwrap_or("<unknown>");
        println!(
            "{}. {} - similarity {:.3}",
            (i + 1).to_string().green(),
            title,
            entry.score
        );
    }
    Ok(())
}

/// Handle the 'evaluate' command
fn handle_evaluate(
    store: &RatingStore,
    factors: usize,
    epochs: usize,
    test_fraction: f32,
    seed: u64,
) -> Result<()> {
    let (train, test) = split_ratings(store.ratings(), test_fraction, seed)?;
    println!(
        "Split into {} train / {} test ratings (seed {})",
        train.len(),
        test.len(),
        seed
    );

    let start = Instant::now();
    let model = LatentFactorRecommender::new()
        .with_factors(factors)
        .with_epochs(epochs)
        .train(&RatingStore::from_ratings(train))?;
    println!("{} Trained in {:?}", "✓".green(), start.elapsed());

    let metrics = evaluate(&model, &test)?;
    println!("{}", "Held-out prediction error:".bold().blue());
    println!("{}RMSE: {:.4}", "• ".cyan(), metrics.rmse);
    println!("{}MAE:  {:.4}", "• ".cyan(), metrics.mae);
    println!("{}Test ratings: {}", "• ".cyan(), metrics.sample_count);
    Ok(())
}

/// Handle the 'user' command
fn handle_user(store: &RatingStore, catalog: &MovieCatalog, user_id: UserId) -> Result<()> {
    if !store.knows_user(user_id) {
        return Err(anyhow!("User {} not found", user_id));
    }

    let ratings = store.user_ratings(user_id);
    let avg_rating = ratings.iter().map(|r| r.value).sum::<f32>() / ratings.len() as f32;

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    let mut top_rated: Vec<_> = ratings.iter().collect();
    top_rated.sort_by(|a, b| b.value.total_cmp(&a.value));
    println!("Top rated movies:");
    for rating in top_rated.iter().take(5) {
        let title = catalog
            .movie(rating.movie_id)
            .map(|m| m.title.as_str())
            .unwrap_or("<unknown>");
        println!("  - {} (Rating: {})", title, rating.value);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(store: &RatingStore, catalog: &MovieCatalog, title: String) -> Result<()> {
    let title_lower = title.to_lowercase();
    // (id, title, avg rating, exact-match rank, rating count)
    let mut matches: Vec<(MovieId, &str, f32, usize, usize)> = Vec::new();

    for movie_id in catalog.movie_ids() {
        let Some(movie) = catalog.movie(movie_id) else {
            continue;
        };
        let movie_title_lower = movie.title.to_lowercase();

        let rank = if movie_title_lower == title_lower {
            0 // Exact match
        } else if movie_title_lower.contains(&title_lower) {
            1 // Substring match
        } else {
            continue;
        };

        let ratings = store.movie_ratings(movie_id);
        let avg_rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| r.value).sum::<f32>() / ratings.len() as f32
        };
        matches.push((movie_id, movie.title.as_str(), avg_rating, rank, ratings.len()));
    }

    // Exact matches first, then by average rating
    matches.sort_by(|a, b| a.3.cmp(&b.3).then_with(|| b.2.total_cmp(&a.2)));

    println!(
        "{}",
        format!("Search results for '{}':", title).bold().blue()
    );
    for (movie_id, movie_title, avg_rating, _, rating_count) in matches.iter().take(20) {
        println!(
            "{}: {} - avg {:.2} ({} ratings)",
            movie_id, movie_title, avg_rating, rating_count
        );
    }
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[RankedMovie]) {
    println!("{}", "Movie Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  (no signals enabled, nothing to recommend)");
        return;
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.3} [{:?}]",
            (rank + 1).to_string().green(),
            rec.title,
            rec.score,
            rec.source
        );
    }
}
