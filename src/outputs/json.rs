//! JSON export of search results.
//!
//! Serializes a [`SearchResult`] back to the same camelCase envelope the
//! API returns, so the file can be fed to anything that understands the
//! NewsAPI format.

use crate::models::SearchResult;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `result` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_result(
    result: &SearchResult,
    path: &Path,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let json = serde_json::to_string_pretty(result)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(articles = result.articles.len(), "Wrote JSON result file");
    Ok(())
}
