//! VOD Uploader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use vod_uploader::{
    api::YouTubeClient,
    auth::CredentialProvider,
    cli::Args,
    config::{self, AuthConfig},
    discover::{DiscoveredItem, LinkDiscoverer},
    error::{exit_codes, Error, Result},
    fetch::{fetch_to_file, file_name_for},
    output::{print_banner, print_error, print_info, print_success, print_warning},
    upload::{ResumableUpload, RetryPolicy, UploadEngine, UploadRequest, VideoId},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::MissingConfig(_) | Error::UrlParse(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::Authentication(_) => ExitCode::from(exit_codes::AUTH_ERROR as u8),
                Error::Upload(_)
                | Error::UnexpectedResponse(_)
                | Error::RetriesExhausted { .. }
                | Error::Download(_) => ExitCode::from(exit_codes::UPLOAD_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Print banner
    print_banner();

    // A local untracked .env may define the read-only Data API key.
    dotenvy::dotenv().ok();
    if config::google_api_key().is_some() {
        tracing::debug!("Data API key present in environment");
    }

    let base_url = normalize_base_url(&args.url)?;

    // Discover session videos
    print_info(&format!("Discovering session videos under {}", base_url));
    let discoverer = LinkDiscoverer::new()?;
    let items = discoverer.discover(&base_url).await?;

    if items.is_empty() {
        print_warning("No session videos found");
        return Ok(());
    }
    print_info(&format!("Found {} video(s)", items.len()));

    tokio::fs::create_dir_all(&args.download_directory).await?;

    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
    let auth_config = AuthConfig::default();

    // Process items one at a time, in discovery order. An unexpected upload
    // response or an exhausted retry budget ends the whole run; anything
    // else only fails the current item.
    let mut failed: usize = 0;
    for item in &items {
        match process_item(&http, &auth_config, &args, item).await {
            Ok(Some(video_id)) => {
                print_success(&format!("{} uploaded as {}", item.session_label, video_id));
            }
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                print_error(&format!("Failed to process {}: {}", item.file_url, e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        print_warning(&format!("{} item(s) failed", failed));
    }

    Ok(())
}

/// Download, upload, and clean up a single discovered item.
///
/// Returns `Ok(None)` when the item was skipped because the download was
/// refused by the remote.
async fn process_item(
    http: &reqwest::Client,
    auth_config: &AuthConfig,
    args: &Args,
    item: &DiscoveredItem,
) -> Result<Option<VideoId>> {
    let file_name = file_name_for(&item.file_url)
        .ok_or_else(|| Error::Download(format!("no file name in {}", item.file_url)))?;
    let local_path = args.download_directory.join(&file_name);

    tracing::info!("Downloading {}", item.file_url);
    if !fetch_to_file(http, &item.file_url, &local_path).await? {
        return Ok(None);
    }

    tracing::info!("Uploading {}", file_name);
    // Re-authenticated per item; credentials are cheap to refresh and the
    // items can take long enough for an access token to expire.
    let provider = CredentialProvider::new(auth_config.clone())?;
    let credential = provider.authenticate().await?;
    let client = YouTubeClient::new(&credential)?;

    let title = format!("{} {}", args.title, item.session_label);
    let request = UploadRequest::new(local_path.clone(), title);
    let file_size = tokio::fs::metadata(&request.file_path).await?.len();

    let engine = UploadEngine::new(RetryPolicy::default());
    let mut transfer = ResumableUpload::new(&client, &request, file_size);
    let video_id = engine
        .run(&mut transfer, &mut StdRng::from_entropy())
        .await?;

    tokio::fs::remove_file(&local_path).await?;
    Ok(Some(video_id))
}

/// Parse the listing URL, ensuring it ends with a slash so session links
/// join underneath it.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
