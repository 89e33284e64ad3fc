use anyhow::{Context, Result, anyhow, bail};
use catalog::{Movie, MovieId, load_catalog, sample_movies};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use server::ServerConfig;
use server::config::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_HOST, DEFAULT_PORT};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use title_index::{DEFAULT_AUTOCOMPLETE_LIMIT, DEFAULT_SEARCH_LIMIT, TitleIndex, normalize};

/// Movie Explorer - prefix search over a movie catalog
#[derive(Parser)]
#[command(name = "movie-explorer")]
#[command(about = "Title search and autocomplete over a movie catalog", long_about = None)]
struct Cli {
    /// Catalog file (.dat or .json). Uses the built-in sample movies when omitted.
    #[arg(short, long, env = "MOVIE_EXPLORER_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "MOVIE_EXPLORER_HOST", default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, env = "MOVIE_EXPLORER_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Origin allowed by CORS, `*` for any
        #[arg(long, env = "MOVIE_EXPLORER_ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
        allowed_origin: String,

        /// Maximum number of movies a search ranks before paginating
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        search_cap: usize,

        /// Directory served for paths outside /api (e.g. the web front end)
        #[arg(long, env = "MOVIE_EXPLORER_STATIC_DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Search movies whose title starts with a prefix
    Search {
        /// Title prefix (case-insensitive); empty lists the most popular movies
        query: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Complete a title prefix
    Suggest {
        prefix: String,

        #[arg(long, default_value_t = DEFAULT_AUTOCOMPLETE_LIMIT)]
        limit: usize,
    },

    /// Show one movie by id
    Show { id: MovieId },

    /// Show index statistics and the most common prefixes
    Stats {
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Dump the prefix tree
    Tree,

    /// Time random prefix searches against the loaded index
    Bench {
        /// Number of searches to run
        #[arg(long, default_value = "1000")]
        queries: usize,

        /// Seed for picking prefixes
        #[arg(long, default_value = "42")]
        seed: u64,
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
    let index = load_index(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            allowed_origin,
            search_cap,
            static_dir,
        } => {
            let mut config = ServerConfig::default()
                .with_host(host)
                .with_port(port)
                .with_allowed_origin(allowed_origin)
                .with_search_cap(search_cap);
            if let Some(dir) = static_dir {
                config = config.with_static_dir(dir);
            }
            server::serve(index, config).await?
        }
        Commands::Search { query, limit } => handle_search(&index, &query, limit)?,
        Commands::Suggest { prefix, limit } => handle_suggest(&index, &prefix, limit)?,
        Commands::Show { id } => handle_show(&index, id)?,
        Commands::Stats { top } => handle_stats(&index, top)?,
        Commands::Tree => print!("{}", index.render_tree()?),
        Commands::Bench { queries, seed } => handle_bench(&index, queries, seed)?,
    }

    Ok(())
}

/// Build the index from a catalog file, or from the sample movies
fn load_index(path: Option<&Path>) -> Result<TitleIndex> {
    let start = Instant::now();
    let movies = match path {
        Some(path) => {
            println!("Loading catalog from {}...", path.display());
            load_catalog(path)
                .with_context(|| format!("Failed to load catalog {}", path.display()))?
        }
        None => {
            println!("No catalog given, using the built-in sample movies");
            sample_movies()
        }
    };

    let (index, report) = TitleIndex::from_catalog(movies);
    println!(
        "{} Indexed {} movies in {:?}",
        "✓".green(),
        report.inserted,
        start.elapsed()
    );
    if report.skipped > 0 {
        println!("{} Skipped {} catalog records", "!".yellow(), report.skipped);
    }
    Ok(index)
}

/// Handle the 'search' command
fn handle_search(index: &TitleIndex, query: &str, limit: usize) -> Result<()> {
    let start = Instant::now();
    let results = index.search(query, limit)?;
    let elapsed = start.elapsed();

    println!(
        "{}",
        format!("Search results for '{}':", query.trim()).bold().blue()
    );
    if results.is_empty() {
        println!("  No titles start with '{}'", normalize(query));
        return Ok(());
    }
    print_movies(&results);
    println!("{} results in {:?}", results.len(), elapsed);
    Ok(())
}

/// Handle the 'suggest' command
fn handle_suggest(index: &TitleIndex, prefix: &str, limit: usize) -> Result<()> {
    let suggestions = index.autocomplete(prefix, limit)?;

    println!(
        "{}",
        format!("Suggestions for '{}':", prefix.trim()).bold().blue()
    );
    for suggestion in &suggestions {
        println!("{}{}", "• ".green(), suggestion);
    }
    Ok(())
}

/// Handle the 'show' command
fn handle_show(index: &TitleIndex, id: MovieId) -> Result<()> {
    let movie = index
        .lookup(id)?
        .ok_or_else(|| anyhow!("Movie {} not found", id))?;

    println!("{}", format!("{} ({})", movie.title, movie.year).bold().blue());
    println!(
        "{}Rating: {:.1} {}",
        "• ".green(),
        movie.rating,
        movie.star_rating().yellow()
    );
    println!("{}Runtime: {}", "• ".green(), movie.formatted_runtime());
    println!("{}Genres: {}", "• ".green(), movie.genres_string());
    println!("{}Language: {}", "• ".green(), movie.language);
    if let Some(poster) = &movie.poster {
        println!("{}Poster: {}", "• ".green(), poster);
    }
    println!();
    println!("{}", movie.short_description(280));
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(index: &TitleIndex, top: usize) -> Result<()> {
    let stats = index.stats()?;

    println!("{}", "Title index statistics:".bold().blue());
    println!("{}Movies: {}", "• ".cyan(), stats.total_movies);
    println!("{}Unique titles: {}", "• ".cyan(), stats.unique_titles);
    println!("{}Nodes: {}", "• ".cyan(), stats.total_nodes);
    println!(
        "{}Average title depth: {:.2}",
        "• ".cyan(),
        stats.average_terminal_depth
    );
    println!("{}Estimated memory: {}", "• ".cyan(), stats.memory_estimate);

    let prefixes = index.most_common_prefixes(top)?;
    if !prefixes.is_empty() {
        println!("Most common prefixes:");
        for prefix in prefixes {
            println!("  - '{}' ({} titles)", prefix.prefix, prefix.weight);
        }
    }
    Ok(())
}

/// Handle the 'bench' command
fn handle_bench(index: &TitleIndex, queries: usize, seed: u64) -> Result<()> {
    let titles: Vec<Vec<char>> = index
        .all_movies()?
        .map(|movie| normalize(&movie.title).chars().collect())
        .collect();
    if titles.is_empty() || queries == 0 {
        bail!("Nothing to benchmark: the index is empty or no queries were requested");
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut timings: Vec<Duration> = Vec::with_capacity(queries);
    let mut total_results = 0;
    for _ in 0..queries {
        let title = &titles[rng.random_range(0..titles.len())];
        let len = rng.random_range(1..=title.len());
        let prefix: String = title[..len].iter().collect();

        let start = Instant::now();
        total_results += index.search(&prefix, DEFAULT_SEARCH_LIMIT)?.len();
        timings.push(start.elapsed());
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / timings.len() as u32;
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = queries as f64 / total_time.as_secs_f64().max(f64::EPSILON);

    println!("{}", "Benchmark results:".bold().blue());
    println!("Queries: {} ({} results)", queries, total_results);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} searches/second", throughput);
    Ok(())
}

/// Print a ranked list of movies
fn print_movies(movies: &[&Movie]) {
    for (rank, movie) in movies.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] {} {:.1}",
            (rank + 1).to_string().green(),
            movie.title,
            movie.year,
            movie.genres_string(),
            movie.star_rating().yellow(),
            movie.rating
        );
    }
}
