mod crawl;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "placecrawl-cli")]
#[command(about = "Search Google Places and save the filtered results as JSON")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one crawl and write `<query>.json` to the output directory.
    Crawl(CrawlArgs),
}

#[derive(Debug, Args)]
struct CrawlArgs {
    /// Free-text search query, e.g. "pizza in haifa".
    #[arg(required_unless_present = "request")]
    query: Option<String>,

    /// Keep only places with at least this many ratings.
    #[arg(long)]
    min_ratings: Option<u32>,

    /// Lower bound of the rating range (inclusive).
    #[arg(long, requires = "rating_to")]
    rating_from: Option<f64>,

    /// Upper bound of the rating range (inclusive).
    #[arg(long, requires = "rating_from")]
    rating_to: Option<f64>,

    /// Weekday the place must be open on (0 = Sunday ... 6 = Saturday).
    #[arg(long)]
    day: Option<u8>,

    /// Earliest acceptable opening time on `--day`, as HHMM.
    #[arg(long = "from", requires = "day")]
    open_from: Option<String>,

    /// Latest acceptable closing time on `--day`, as HHMM.
    #[arg(long = "to", requires = "day")]
    open_to: Option<String>,

    /// Read the whole search request from a JSON file instead of flags.
    #[arg(
        long,
        conflicts_with_all = ["query", "min_ratings", "rating_from", "rating_to", "day"]
    )]
    request: Option<PathBuf>,

    /// Directory to write the result into (defaults to `PLACECRAWL_OUTPUT_DIR`).
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("placecrawl-cli: nothing to do, try `placecrawl-cli crawl --help`");
        return ExitCode::SUCCESS;
    };

    let directive = log_directive(|var| std::env::var(var).ok());
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let outcome = match placecrawl_core::load_app_config() {
        Ok(config) => match command {
            Commands::Crawl(args) => crawl::run_crawl(&config, args).await,
        },
        Err(e) => Err(anyhow::Error::new(e).context("failed to load configuration")),
    };

    match outcome {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "crawl failed, no output written");
            ExitCode::FAILURE
        }
    }
}

/// Log filter directive: `RUST_LOG`, then `PLACECRAWL_LOG_LEVEL`, then `info`.
///
/// Resolved before the configuration loads so configuration failures are
/// logged too.
fn log_directive(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["RUST_LOG", "PLACECRAWL_LOG_LEVEL"]
        .into_iter()
        .filter_map(&lookup)
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "info".to_owned())
}
