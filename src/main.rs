//! Insight-Miner main entry point
//!
//! Command-line interface for crawling a site into page records and turning
//! page records into insight candidates.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use insight_miner::config::{
    load_config_with_hash, validate_crawl, validate_extract, Config, CrawlConfig, ExtractConfig,
    SectionStrategy,
};
use insight_miner::extract::extract_insights;
use insight_miner::output::{print_statistics, JsonlWriter};
use insight_miner::Coordinator;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Insight-Miner: polite site ingestion for insight extraction
///
/// Crawls a single site breadth-first while respecting robots.txt and a
/// global rate limit, then extracts short, scored statements from the
/// collected page text.
#[derive(Parser, Debug)]
#[command(name = "insight-miner")]
#[command(version)]
#[command(about = "Polite site ingestion for insight extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and write page records as JSON Lines
    Crawl(CrawlArgs),

    /// Extract insight candidates from page records
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL (overrides the config file)
    #[arg(long, required_unless_present = "config")]
    url: Option<String>,

    /// Path to TOML configuration file with a [crawl] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON Lines file
    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    max_depth: Option<u32>,

    #[arg(long)]
    max_pages: Option<usize>,

    /// Requests per second
    #[arg(long)]
    rps: Option<f64>,

    /// Stop the crawl after this many seconds
    #[arg(long)]
    max_duration: Option<u64>,

    /// Treat unreachable or broken robots.txt as allow-all
    #[arg(long)]
    robots_fallback_allow: bool,

    /// Keep pages whose text duplicates an earlier page
    #[arg(long)]
    no_content_dedupe: bool,

    /// Send browser-like Accept headers
    #[arg(long)]
    browser_headers: bool,

    /// Also print each record to stdout
    #[arg(long)]
    echo: bool,

    /// Print crawl statistics as JSON to stderr
    #[arg(long)]
    stats: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Input JSON Lines file of page records
    #[arg(long)]
    pages: PathBuf,

    /// Output JSON Lines file of insight candidates
    #[arg(long)]
    out: PathBuf,

    /// Path to TOML configuration file with an [extract] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the extraction summary as JSON to this file
    #[arg(long)]
    stats_out: Option<PathBuf>,

    #[arg(long)]
    max_insights: Option<usize>,

    #[arg(long)]
    min_len: Option<usize>,

    #[arg(long)]
    baseline_neutral_len: Option<usize>,

    /// Collapse near-duplicates by pairwise Jaccard similarity
    #[arg(long)]
    fuzzy_dedupe: bool,

    /// Collapse near-duplicates with MinHash/LSH
    #[arg(long)]
    minhash_dedupe: bool,

    /// How the section field is derived
    #[arg(long, value_enum)]
    section: Option<SectionStrategy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args, cli.quiet).await,
        Command::Extract(args) => handle_extract(args),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that records echoed to stdout stay parseable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("insight_miner=info,warn"),
            1 => EnvFilter::new("insight_miner=debug,info"),
            2 => EnvFilter::new("insight_miner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads a config file, logging its hash
fn load_file_config(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn build_crawl_config(args: &CrawlArgs) -> anyhow::Result<CrawlConfig> {
    let mut config = match &args.config {
        Some(path) => load_file_config(path)?.crawl.unwrap_or_default(),
        None => CrawlConfig::default(),
    };

    if let Some(url) = &args.url {
        config.seed = url.clone();
    }
    if config.seed.is_empty() {
        bail!("no seed URL given; pass --url or set seed in the [crawl] table");
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    if let Some(pages) = args.max_pages {
        config.max_pages = pages;
    }
    if let Some(rps) = args.rps {
        config.rps = rps;
    }
    if args.max_duration.is_some() {
        config.max_duration = args.max_duration;
    }
    if args.robots_fallback_allow {
        config.robots_fallback_allow = true;
    }
    if args.no_content_dedupe {
        config.enable_content_dedupe = false;
    }
    if args.browser_headers {
        config.browser_headers = true;
    }

    validate_crawl(&config)?;
    Ok(config)
}

/// Handles the crawl subcommand
async fn handle_crawl(args: CrawlArgs, quiet: bool) -> anyhow::Result<()> {
    let config = build_crawl_config(&args)?;
    tracing::info!(
        "Crawling {} (max depth {}, max pages {}, {} req/s)",
        config.seed,
        config.max_depth,
        config.max_pages,
        config.rps
    );

    let coordinator = Coordinator::new(config)?;
    let mut handle = coordinator.spawn();

    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            token.cancel();
        }
    });

    let mut writer = JsonlWriter::create(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;

    while let Some(record) = handle.next().await {
        writer.write(&record)?;
        if args.echo {
            println!("{}", serde_json::to_string(&record)?);
        }
    }

    let written = writer.written();
    writer.finish()?;
    let stats = handle.finish().await?;

    tracing::info!("Wrote {} records to {}", written, args.out.display());

    if !quiet {
        print_statistics(&stats);
    }
    if args.stats {
        eprintln!("{}", serde_json::to_string(&stats)?);
    }

    Ok(())
}

fn build_extract_config(args: &ExtractArgs) -> anyhow::Result<ExtractConfig> {
    let mut config = match &args.config {
        Some(path) => load_file_config(path)?.extract,
        None => ExtractConfig::default(),
    };

    if let Some(max) = args.max_insights {
        config.max_insights = max;
    }
    if let Some(min_len) = args.min_len {
        config.min_len = min_len;
    }
    if let Some(len) = args.baseline_neutral_len {
        config.baseline_neutral_len = len;
    }
    if args.fuzzy_dedupe {
        config.fuzzy_dedupe = true;
    }
    if args.minhash_dedupe {
        config.minhash_dedupe = true;
    }
    if let Some(section) = args.section {
        config.section = section;
    }

    validate_extract(&config)?;
    Ok(config)
}

/// Handles the extract subcommand
fn handle_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = build_extract_config(&args)?;

    let summary = extract_insights(&args.pages, &args.out, &config)
        .with_context(|| format!("failed to extract insights from {}", args.pages.display()))?;

    if let Some(path) = &args.stats_out {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
        tracing::info!("Extraction summary written to {}", path.display());
    }

    Ok(())
}
