//! `crawl` command handler.

use std::path::{Path, PathBuf};

use anyhow::Context;
use placecrawl_core::{AppConfig, FilterSpec, OpeningHoursFilter, RatingRange, SearchRequest};
use placecrawl_places::{write_result_file, Crawler, PlacesClient, RetryPolicy};
use tokio_util::sync::CancellationToken;

use crate::CrawlArgs;

/// Runs one crawl and writes the result file. Returns the path written.
///
/// Ctrl-C cancels the crawl; nothing is written in that case.
///
/// # Errors
///
/// Returns an error if the request cannot be built, the crawl fails or is
/// cancelled, or the result file cannot be written.
pub(crate) async fn run_crawl(config: &AppConfig, args: CrawlArgs) -> anyhow::Result<PathBuf> {
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let request = match args.request.clone() {
        Some(path) => load_request(&path).await?,
        None => request_from_args(args)?,
    };

    let client = PlacesClient::from_config(config).context("failed to build Places client")?;
    let crawler = Crawler::new(client).with_retry(RetryPolicy::from_config(config));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling crawl");
            on_interrupt.cancel();
        }
    });

    let result = crawler.run(request, &cancel).await?;
    let path = write_result_file(&out_dir, &result).await?;
    Ok(path)
}

/// Builds a [`SearchRequest`] from command-line flags.
pub(crate) fn request_from_args(args: CrawlArgs) -> anyhow::Result<SearchRequest> {
    let query = args
        .query
        .ok_or_else(|| anyhow::anyhow!("a search query is required"))?;

    let rating_range = match (args.rating_from, args.rating_to) {
        (Some(from), Some(to)) => Some(RatingRange { from, to }),
        (None, None) => None,
        _ => anyhow::bail!("--rating-from and --rating-to must be given together"),
    };

    let opening_hours = args.day.map(|day| OpeningHoursFilter {
        day,
        from: args.open_from,
        to: args.open_to,
    });

    let filters = FilterSpec {
        min_rating_count: args.min_ratings,
        rating_range,
        opening_hours,
    };
    Ok(SearchRequest::new(query, filters))
}

/// Reads a [`SearchRequest`] from a JSON file in the service wire format.
pub(crate) async fn load_request(path: &Path) -> anyhow::Result<SearchRequest> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid search request in {}", path.display()))
}
