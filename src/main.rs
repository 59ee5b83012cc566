//! VK Graph - command line entry point
//!
//! Crawls a VK account's follower neighbourhood into Neo4j and reports on it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use social_graph_crawler::analytics::OutputFormat;
use social_graph_crawler::crawler::Crawler;
use social_graph_crawler::orchestrator::Orchestrator;
use social_graph_crawler::vk::snapshot::{fetch_snapshot, write_snapshot};
use social_graph_crawler::vk::Identity;
use social_graph_crawler::{AppState, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vk-graph")]
#[command(about = "VK social graph crawler with Neo4j storage and analytics")]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format for results printed to stdout
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Seed account (overrides VK_USER_ID)
    #[arg(long, global = true)]
    seed: Option<Identity>,

    /// Crawl depth (overrides DEPTH)
    #[arg(short, long, global = true)]
    depth: Option<u32>,

    /// Size of the top-K lists (overrides TOP_N)
    #[arg(short = 'n', long = "top", global = true)]
    top: Option<usize>,

    /// Also ingest the seed account itself
    #[arg(long, global = true)]
    include_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl, ingest into Neo4j, then print the report
    Run,

    /// Crawl only and print what was found
    Crawl,

    /// Print the report for the graph already stored
    Report,

    /// Dump the seed account's profile, followers, subscriptions and groups
    Snapshot {
        /// Output file
        #[arg(short, long, default_value = "vk_data.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    // Load configuration, then apply command line overrides
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(depth) = cli.depth {
        config.depth = depth;
    }
    if let Some(top) = cli.top {
        config.top_k = top;
    }
    if cli.include_seed {
        config.include_seed = true;
    }
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Run => run(config, cli.format).await,
        Commands::Crawl => crawl(config, cli.format).await,
        Commands::Report => report(config, cli.format).await,
        Commands::Snapshot { output } => snapshot(config, output).await,
    }
}

/// Logs go to stderr so stdout carries only results.
/// LOG_FORMAT=json switches to structured JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,social_graph_crawler=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(config: Config, format: OutputFormat) -> Result<()> {
    config.validate_for_crawl()?;

    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    let summary = Orchestrator::new(state).run().await?;
    tracing::info!(
        run_id = %summary.run_id,
        users_written = summary.ingest.users_written,
        users_failed = summary.ingest.users_failed,
        "Run complete"
    );

    match format {
        OutputFormat::Text => print!("{}", summary.report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

async fn crawl(config: Config, format: OutputFormat) -> Result<()> {
    config.validate_for_crawl()?;
    let seed = config.seed()?;

    let client = AppState::vk_client(&config)?;
    let result = Crawler::new(client)
        .with_followers_limit(config.followers_limit)
        .with_concurrency(config.crawl_concurrency)
        .crawl(seed, config.depth)
        .await;

    match format {
        OutputFormat::Text => {
            println!("Seed: {}", seed);
            println!("Expanded: {}", result.expanded);
            println!("Followers found: {}", result.followers.len());
            println!("Subscriptions found: {}", result.subscriptions.len());
            println!("Follow edges: {}", result.follow_edges.len());
            println!("Fetch failures: {}", result.fetch_failures);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

async fn report(config: Config, format: OutputFormat) -> Result<()> {
    config.validate()?;

    let state = AppState::new(config).await?;
    let report = Orchestrator::new(state).report().await?;
    print!("{}", report.render(format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

async fn snapshot(config: Config, output: PathBuf) -> Result<()> {
    config.validate_for_crawl()?;
    let seed = config.seed()?;

    let client = AppState::vk_client(&config)?;
    let snapshot = fetch_snapshot(client.as_ref(), seed, config.followers_limit).await?;
    write_snapshot(&snapshot, &output)?;

    println!(
        "Saved {} followers, {} subscriptions and {} groups of {} to {}",
        snapshot.followers.len(),
        snapshot.subscriptions.len(),
        snapshot.groups.len(),
        seed,
        output.display()
    );
    Ok(())
}
