//! File sink for standalone crawls.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use placecrawl_core::CrawlResult;
use tempfile::NamedTempFile;
use thiserror::Error;

const FALLBACK_STEM: &str = "places";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize crawl result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File name for a crawl of `query`: the query made filesystem-safe, plus a
/// `.json` extension.
#[must_use]
pub fn result_file_name(query: &str) -> String {
    let stem = sanitize_filename::sanitize(query.trim());
    let stem = stem.trim();
    if stem.is_empty() {
        format!("{FALLBACK_STEM}.json")
    } else {
        format!("{stem}.json")
    }
}

/// Writes `result` as pretty-printed JSON into `dir`, creating the directory
/// if needed, and returns the path written. An existing file for the same
/// query is overwritten.
///
/// The body goes to a temporary file in `dir` that is renamed over the final
/// path, so readers never see a partially written result.
///
/// # Errors
///
/// Returns [`OutputError::Serialize`] if the result cannot be encoded, or
/// [`OutputError::Io`] if the directory or file cannot be written.
pub async fn write_result_file(dir: &Path, result: &CrawlResult) -> Result<PathBuf, OutputError> {
    let body = serde_json::to_vec_pretty(result)?;
    let dir = dir.to_path_buf();
    let path = dir.join(result_file_name(&result.request().query));

    let target = path.clone();
    tokio::task::spawn_blocking(move || persist_atomically(&dir, &target, &body))
        .await
        .map_err(|join| OutputError::Io {
            path: path.clone(),
            source: std::io::Error::other(join),
        })??;

    tracing::info!(path = %path.display(), count = result.count(), "crawl result written");
    Ok(path)
}

fn io_err(at: &Path) -> impl FnOnce(std::io::Error) -> OutputError {
    let at = at.to_path_buf();
    move |source| OutputError::Io { path: at, source }
}

fn persist_atomically(dir: &Path, path: &Path, body: &[u8]) -> Result<(), OutputError> {
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let mut staged = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    staged.write_all(body).map_err(io_err(path))?;
    staged.as_file().sync_all().map_err(io_err(path))?;
    staged.persist(path).map_err(|e| io_err(path)(e.error))?;
    Ok(())
}
