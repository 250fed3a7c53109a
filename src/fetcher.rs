//! Dataset fetcher
//!
//! Downloads the raw trip dataset to local storage when it is absent. The
//! body is streamed to a sibling `.part` file and renamed into place only
//! after the whole transfer succeeded. The partial file is removed when the
//! transfer fails or the fetch is cancelled, and a stale one left by an
//! earlier process is cleared before the next attempt.

use crate::constants::PARTIAL_DOWNLOAD_SUFFIX;
use crate::error::{ExplorerError, Result};

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Result of a fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was already on disk; no request was made
    AlreadyPresent(PathBuf),
    /// The file was downloaded
    Downloaded { path: PathBuf, bytes: u64 },
}

/// Downloader for the raw trip dataset
#[derive(Debug)]
pub struct DatasetFetcher {
    client: reqwest::Client,
    url: String,
    dest: PathBuf,
    show_progress: bool,
}

impl DatasetFetcher {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            dest: dest.into(),
            show_progress: true,
        }
    }

    /// Suppress the terminal progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }

    /// Download the dataset unless it already exists
    pub async fn fetch(&self) -> Result<FetchOutcome> {
        if self.dest.exists() {
            info!("File already exists at {}", self.dest.display());
            return Ok(FetchOutcome::AlreadyPresent(self.dest.clone()));
        }

        if let Some(parent) = self.dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let partial = PartialDownload::new(partial_path(&self.dest));
        partial.clear_stale().await?;
        info!("Downloading {} to {}", self.url, self.dest.display());

        let bytes = self.stream_to(partial.path()).await?;
        fs::rename(partial.path(), &self.dest).await?;
        partial.complete();
        debug!("Download complete: {} bytes", bytes);
        Ok(FetchOutcome::Downloaded {
            path: self.dest.clone(),
            bytes,
        })
    }

    /// Stream the response body into `target`, returning the byte count
    async fn stream_to(&self, target: &Path) -> Result<u64> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ExplorerError::transfer(&self.url, e))?
            .error_for_status()
            .map_err(|e| ExplorerError::transfer(&self.url, e))?;

        let progress = self.progress_bar(response.content_length());
        let mut response = response;
        let mut file = fs::File::create(target).await?;
        let mut written = 0u64;

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    progress.abandon_with_message("Transfer failed");
                    return Err(ExplorerError::transfer(&self.url, e));
                }
            };

            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.set_position(written);
        }

        file.flush().await?;
        progress.finish_with_message("Download complete");
        Ok(written)
    }

    fn progress_bar(&self, content_length: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match content_length {
            Some(total) => {
                let pb = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar().template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                ) {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("{spinner:.green} {bytes} {msg}")
                {
                    pb.set_style(style);
                }
                pb.set_message("Downloading...");
                pb
            }
        }
    }
}

/// In-flight download file, removed on drop unless the transfer completed
#[derive(Debug)]
struct PartialDownload {
    path: PathBuf,
    completed: bool,
}

impl PartialDownload {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            completed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn clear_stale(&self) -> Result<()> {
        if fs::try_exists(&self.path).await? {
            warn!("Removing stale partial download {}", self.path.display());
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    /// The file has been renamed into place
    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for PartialDownload {
    fn drop(&mut self) {
        if self.completed || !self.path.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "Failed to remove partial download {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Fetch `url` to `dest` without a progress bar
pub async fn fetch_dataset(url: &str, dest: &Path) -> Result<FetchOutcome> {
    DatasetFetcher::new(url, dest).without_progress().fetch().await
}

/// Sibling path used while a download is in flight
pub fn partial_path(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    dest.with_file_name(format!("{}.{}", file_name, PARTIAL_DOWNLOAD_SUFFIX))
}
