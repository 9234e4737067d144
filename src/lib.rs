//! VOD Uploader - crawl a session VOD listing and upload the videos to YouTube.
//!
//! The pipeline per discovered video: download the file, authenticate,
//! upload it over the resumable-upload protocol (retrying transient failures
//! with exponential backoff and full jitter), then delete the local copy.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use vod_uploader::api::YouTubeClient;
//! use vod_uploader::auth::CredentialProvider;
//! use vod_uploader::config::AuthConfig;
//! use vod_uploader::upload::{ResumableUpload, RetryPolicy, UploadEngine, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = CredentialProvider::new(AuthConfig::default())?;
//!     let credential = provider.authenticate().await?;
//!     let client = YouTubeClient::new(&credential)?;
//!
//!     let request = UploadRequest::new(PathBuf::from("007.mp4"), "13-alpha".to_string());
//!     let file_size = tokio::fs::metadata(&request.file_path).await?.len();
//!
//!     let engine = UploadEngine::new(RetryPolicy::default());
//!     let mut transfer = ResumableUpload::new(&client, &request, file_size);
//!     let video_id = engine
//!         .run(&mut transfer, &mut StdRng::from_entropy())
//!         .await?;
//!     println!("uploaded as {}", video_id);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod output;
pub mod upload;

// Re-exports for convenience
pub use api::YouTubeClient;
pub use auth::{Credential, CredentialProvider};
pub use discover::{DiscoveredItem, LinkDiscoverer};
pub use error::{Error, Result};
pub use upload::{RetryPolicy, UploadEngine, UploadRequest, VideoId};
