//! Site-Sift main entry point
//!
//! This is the command-line interface for the Site-Sift crawl, index and
//! search pipeline.

use clap::Parser;
use site_sift::config::{load_config_with_hash, validate, Config};
use site_sift::crawler::{Coordinator, CrawlMode};
use site_sift::index::InvertedIndex;
use site_sift::output::{
    print_summary, save_hosts, save_index, write_search_report, CrawlSummary, PageStore,
    TIMESTAMP_FORMAT,
};
use site_sift::search::rank;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the data directory
const DATA_DIR_ENV: &str = "CRAWLER_DATA_DIR";

/// Site-Sift: crawl one site, index it, and search it
///
/// Site-Sift crawls every page of a single domain reachable from the seed
/// URL within the given depth, builds an inverted index of the stored pages,
/// and ranks them against a query with TF-IDF.
#[derive(Parser, Debug)]
#[command(name = "site-sift")]
#[command(version = "1.0.0")]
#[command(about = "A single-domain crawler and search engine", long_about = None)]
struct Cli {
    /// Seed URL; its host defines the crawled domain
    #[arg(value_name = "SEED", default_value = "https://example.com")]
    seed: String,

    /// Levels of links to follow (values below 1 fall back to 1)
    #[arg(value_name = "DEPTH", default_value_t = 1, allow_negative_numbers = true)]
    depth: i32,

    /// Crawl mode: s (sequential) or m / multi / mt (concurrent)
    #[arg(value_name = "MODE", default_value = "s")]
    mode: String,

    /// Query to run against the index
    #[arg(value_name = "QUERY", default_value = "example")]
    query: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Worker count for concurrent mode (overrides the configuration)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let depth = if cli.depth < 1 {
        tracing::warn!("Depth {} is below 1, using 1", cli.depth);
        1
    } else {
        cli.depth
    };
    let mode = CrawlMode::from_arg(&cli.mode);

    if cli.dry_run {
        handle_dry_run(&config, &cli.seed, depth, mode, &cli.query);
        return Ok(());
    }

    handle_run(config, &cli.seed, depth, mode, &cli.query).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_sift=info,warn"),
            1 => EnvFilter::new("site_sift=debug,info"),
            2 => EnvFilter::new("site_sift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies CLI/env overrides
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(threads) = cli.threads {
        config.crawler.workers = threads;
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            config.output.data_dir = dir;
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, seed: &str, depth: i32, mode: CrawlMode, query: &str) {
    println!("=== Site-Sift Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", seed);
    println!("  Depth: {}", depth);
    println!("  Mode: {}", mode);
    println!("  Query: {}", query);

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Workers: {}", config.crawler.effective_workers());
    println!("  Shutdown grace: {}s", config.crawler.shutdown_grace_secs);
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  Top results: {}", config.output.top_k);
}

/// Runs crawl, indexing and search, then prints the summary
async fn handle_run(
    config: Config,
    seed: &str,
    depth: i32,
    mode: CrawlMode,
    query: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let run_id = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let data_dir = PathBuf::from(&config.output.data_dir);
    let pages_dir = data_dir.join("pages").join(&run_id);
    let index_dir = data_dir.join("index").join(&run_id);
    if let Err(e) = std::fs::create_dir_all(&index_dir) {
        tracing::error!("Failed to create {}: {}", index_dir.display(), e);
    }
    let top_k = config.output.top_k;

    tracing::info!("Run {}: pages in {}", run_id, pages_dir.display());

    let store = PageStore::open(&pages_dir);
    let coordinator = Coordinator::new(config, mode, store.sink())?;
    let report = coordinator.crawl(seed, depth).await?;

    if let Err(e) = save_hosts(&index_dir.join("hosts.txt"), &report.discovered_hosts) {
        tracing::error!("Failed to save discovered hosts: {}", e);
    }

    let index = build_index(&store);
    if let Err(e) = save_index(&index_dir.join("index.txt"), &index) {
        tracing::error!("Failed to save index: {}", e);
    }

    let ranked = rank(query, &index);
    tracing::info!("Query '{}' matched {} documents", query, ranked.len());
    for (i, doc) in ranked.iter().take(top_k).enumerate() {
        tracing::info!("{}. {}", i + 1, doc);
    }
    if let Err(e) = write_search_report(&index_dir, query, &ranked, top_k) {
        tracing::error!("Failed to write search report: {}", e);
    }

    print_summary(&CrawlSummary::new(&report, &index));

    println!("\nTop results for '{}':", query);
    if ranked.is_empty() {
        println!("  (no matches)");
    }
    for (i, doc) in ranked.iter().take(top_k).enumerate() {
        println!("  {}. {}", i + 1, doc);
    }

    Ok(())
}

/// Indexes every stored page of the run
fn build_index(store: &PageStore) -> InvertedIndex {
    let mut index = InvertedIndex::new();

    match store.pages() {
        Ok(pages) => {
            for (name, content) in &pages {
                index.add_document(name, content);
            }
            tracing::info!(
                "Indexed {} documents, {} terms",
                index.total_documents(),
                index.len()
            );
        }
        Err(e) => tracing::error!("Failed to read stored pages: {}", e),
    }

    index
}
