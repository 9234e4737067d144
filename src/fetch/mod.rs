//! File fetching.
//!
//! Streams a remote file to local disk. A non-success status means no file
//! is written and `Ok(false)` is returned; the caller must check before
//! assuming the file exists.

use std::path::Path;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result};

/// Minimum file size to show a progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Stream `url` into `dest`, overwriting any existing file.
///
/// Returns `Ok(false)` without touching the filesystem when the remote
/// answers with a non-success status.
pub async fn fetch_to_file(http: &Client, url: &Url, dest: &Path) -> Result<bool> {
    let response = http.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        tracing::info!("Skipping {} (HTTP {})", url, status);
        return Ok(false);
    }

    let content_length = response.content_length();
    let progress = content_length
        .filter(|len| *len > PROGRESS_THRESHOLD)
        .map(|len| {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        });

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(ref pb) = progress {
            pb.set_position(downloaded);
        }
    }

    file.flush().await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    tracing::debug!("Downloaded {} bytes to {}", downloaded, dest.display());
    Ok(true)
}

/// The file name component of a URL path.
pub fn file_name_for(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
