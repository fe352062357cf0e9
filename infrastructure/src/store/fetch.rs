//! Sample database download.
//!
//! The Chinook database is not shipped; on first run it is fetched over HTTP
//! and written next to the configured path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Every SQLite 3 file starts with this header.
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Database {0} does not exist and no download URL is configured")]
    Missing(PathBuf),

    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed: HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Downloaded file from {0} is not a SQLite database")]
    NotSqlite(String),

    #[error("Could not write database: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP client for [`ensure_database`]; `timeout` bounds the whole download.
pub fn download_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Make sure `path` exists, downloading it from `download_url` if needed.
///
/// Returns `true` when a download happened.
pub async fn ensure_database(
    client: &reqwest::Client,
    path: &Path,
    download_url: Option<&str>,
) -> Result<bool, FetchError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    let Some(url) = download_url else {
        return Err(FetchError::Missing(path.to_path_buf()));
    };

    info!("Downloading {} to {}", url, path.display());
    let response = client
        .get(url)
        .header("User-Agent", "sql-agent/0.1")
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await?;
    if !bytes.starts_with(SQLITE_HEADER) {
        return Err(FetchError::NotSqlite(url.to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    // Write aside, then rename, so an interrupted download never looks complete.
    let partial = partial_path(path);
    let written = match tokio::fs::write(&partial, &bytes).await {
        Ok(()) => tokio::fs::rename(&partial, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }

    info!("Downloaded {} bytes", bytes.len());
    Ok(true)
}

/// `<file>.partial` next to `path`.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
