//! Scrapemark main entry point
//!
//! This is the command-line interface for turning websites into Markdown.

use anyhow::Context;
use clap::{Parser, Subcommand};
use scrapemark::config::{load_config_with_hash, validate, Config};
use scrapemark::output::{format_document, print_statistics, write_documents};
use scrapemark::render::RenderEngine;
use scrapemark::{Coordinator, CrawlJob};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Scrapemark: turns websites into LLM-ready Markdown
///
/// Pages are rendered in a headless browser (or fetched statically when the
/// browser fails), split into chunks and rewritten as Markdown by a
/// text-generation backend.
#[derive(Parser, Debug)]
#[command(name = "scrapemark")]
#[command(version = "1.0.0")]
#[command(about = "Turns websites into LLM-ready Markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would run without fetching anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Skip the headless browser and use static fetching only
    #[arg(long, global = true)]
    no_browser: bool,

    /// Override the output directory from the config
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single page and print it to stdout
    Scrape {
        /// Page to convert
        url: String,

        /// Also write the document to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Crawl a site breadth-first and write one file per page
    Crawl {
        /// Start URL; only links under its origin are followed
        url: String,

        /// Override the page budget from the config
        #[arg(long)]
        max_pages: Option<usize>,

        /// Override the number of parallel page loads
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }
    if let Command::Crawl {
        max_pages,
        concurrency,
        ..
    } = &cli.command
    {
        if let Some(max_pages) = max_pages {
            config.crawler.max_pages = *max_pages;
        }
        if let Some(concurrency) = concurrency {
            config.crawler.concurrency = *concurrency;
        }
        validate(&config).context("invalid command-line override")?;
    }

    if cli.dry_run {
        return handle_dry_run(&config, &cli.command);
    }

    let engine = if cli.no_browser {
        None
    } else {
        launch_engine(&config).await
    };
    let coordinator = Coordinator::from_config(&config, engine.clone())
        .context("failed to set up the conversion pipeline")?;

    let result = match &cli.command {
        Command::Scrape { url, save } => handle_scrape(&coordinator, &config, url, *save).await,
        Command::Crawl { url, .. } => handle_crawl(&coordinator, &config, url).await,
    };

    if let Some(engine) = engine {
        if let Err(e) = engine.shutdown().await {
            tracing::warn!("Browser shutdown failed: {}", e);
        }
    }

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrapemark=info,warn"),
            1 => EnvFilter::new("scrapemark=debug,info"),
            2 => EnvFilter::new("scrapemark=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "chromium")]
async fn launch_engine(config: &Config) -> Option<Arc<dyn RenderEngine>> {
    use scrapemark::render::ChromiumEngine;

    match ChromiumEngine::launch(config.crawler.headless, &config.user_agent.value).await {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            tracing::warn!("Headless browser unavailable: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "chromium"))]
async fn launch_engine(_config: &Config) -> Option<Arc<dyn RenderEngine>> {
    tracing::info!("Built without the chromium feature");
    None
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, command: &Command) -> anyhow::Result<()> {
    println!("=== Scrapemark Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!(
        "  Navigation timeout: {}s",
        config.crawler.navigation_timeout_secs
    );
    println!(
        "  Auto-scroll: {}px every {}ms (max {} steps)",
        config.crawler.scroll_step_px, config.crawler.scroll_delay_ms, config.crawler.max_scroll_steps
    );
    println!("  Headless: {}", config.crawler.headless);

    println!("\nChunker:");
    println!("  Max bytes per chunk: {}", config.chunker.max_bytes);

    println!("\nBackend:");
    println!("  Endpoint: {}", config.backend.endpoint);
    println!("  Model: {}", config.backend.model);
    println!("  Retries per chunk: {}", config.backend.max_retries);
    match config.backend.resolve_keys() {
        Ok(keys) => println!("  Credentials available: {}", keys.len()),
        Err(e) => println!("  Credentials: {}", e),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\n✓ Configuration is valid");
    match command {
        Command::Scrape { url, .. } => println!("✓ Would convert {}", url),
        Command::Crawl { url, .. } => println!(
            "✓ Would crawl {} (up to {} pages)",
            url, config.crawler.max_pages
        ),
    }

    Ok(())
}

/// Handles `scrape`: converts one page and prints it
async fn handle_scrape(
    coordinator: &Coordinator,
    config: &Config,
    url: &str,
    save: bool,
) -> anyhow::Result<()> {
    let document = coordinator
        .scrape_one(url)
        .await
        .with_context(|| format!("failed to convert {}", url))?;

    print!("{}", format_document(&document));

    if save {
        let written = write_documents(
            std::slice::from_ref(&document),
            Path::new(&config.output.directory),
        )?;
        for path in written {
            tracing::info!("Saved {}", path.display());
        }
    }

    Ok(())
}

/// Handles `crawl`: crawls a site and writes every converted page
async fn handle_crawl(coordinator: &Coordinator, config: &Config, url: &str) -> anyhow::Result<()> {
    let job = CrawlJob::new(url, config.crawler.max_pages, config.crawler.concurrency);

    let outcome = coordinator
        .crawl(&job)
        .await
        .with_context(|| format!("crawl of {} failed", url))?;

    let written = write_documents(&outcome.documents, Path::new(&config.output.directory))?;
    println!(
        "✓ Wrote {} document(s) to {}\n",
        written.len(),
        config.output.directory
    );

    for failure in &outcome.failures {
        println!("  skipped {} ({}): {}", failure.url, failure.outcome, failure.reason);
    }
    if !outcome.failures.is_empty() {
        println!();
    }

    print_statistics(&outcome.stats);

    Ok(())
}
