//! Resumable transfer transport.
//!
//! `ResumableUpload` speaks the YouTube resumable-upload protocol: one POST
//! to open a session, then PUTs of the remaining file bytes. After a failed
//! attempt the server is asked for the last acknowledged byte offset so the
//! transfer resumes where it left off instead of restarting from zero.

use std::io::SeekFrom;

use async_trait::async_trait;
use reqwest::{header, Body, Method, Response};
use serde_json::Value;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tokio_util::io::ReaderStream;

use crate::api::client::UPLOAD_ENDPOINT;
use crate::api::YouTubeClient;
use crate::upload::request::UploadRequest;
use crate::upload::retry::AttemptError;

/// HTTP 308, used by the upload API to acknowledge a partial transfer.
const RESUME_INCOMPLETE: u16 = 308;

/// Result of advancing a transfer by one step.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The transfer moved forward but is not finished.
    Progress { bytes_acknowledged: u64 },
    /// Terminal response body from the remote service.
    Done(Value),
}

/// One step of a resumable transfer.
///
/// Implementations must be restartable: after returning an error, the next
/// `advance` call continues from the last acknowledged offset.
#[async_trait]
pub trait ResumableTransfer {
    async fn advance(&mut self) -> std::result::Result<ChunkOutcome, AttemptError>;
}

/// Resumable upload of a local file to the `videos.insert` endpoint.
pub struct ResumableUpload<'a> {
    client: &'a YouTubeClient,
    request: &'a UploadRequest,
    file_size: u64,
    session_uri: Option<String>,
    offset: u64,
    /// Set after a failed send; the next advance asks the server for the
    /// acknowledged offset before sending more bytes.
    probe_needed: bool,
}

impl<'a> ResumableUpload<'a> {
    pub fn new(client: &'a YouTubeClient, request: &'a UploadRequest, file_size: u64) -> Self {
        Self {
            client,
            request,
            file_size,
            session_uri: None,
            offset: 0,
            probe_needed: false,
        }
    }

    /// Open the resumable session and record its URI.
    async fn begin_session(&self) -> std::result::Result<String, AttemptError> {
        let response = self
            .client
            .request(Method::POST, UPLOAD_ENDPOINT)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", self.file_size)
            .json(&self.request.metadata())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), response).await);
        }

        let session_uri = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                AttemptError::Transport("resumable session response had no Location".into())
            })?;

        tracing::debug!("Resumable session opened: {}", session_uri);
        Ok(session_uri)
    }

    /// Send the remaining bytes from the current offset in one request.
    async fn send_from_offset(
        &mut self,
        session_uri: &str,
    ) -> std::result::Result<ChunkOutcome, AttemptError> {
        let mut file = File::open(&self.request.file_path)
            .await
            .map_err(transport_error)?;
        file.seek(SeekFrom::Start(self.offset))
            .await
            .map_err(transport_error)?;

        let remaining = self.file_size - self.offset;
        let mut builder = self
            .client
            .http()
            .put(session_uri)
            .header(header::CONTENT_LENGTH, remaining)
            .header(header::CONTENT_TYPE, "video/mp4")
            .body(Body::wrap_stream(ReaderStream::new(file)));

        if self.offset > 0 {
            builder = builder.header(
                header::CONTENT_RANGE,
                format!(
                    "bytes {}-{}/{}",
                    self.offset,
                    self.file_size - 1,
                    self.file_size
                ),
            );
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                self.probe_needed = true;
                return Err(transport_error(e));
            }
        };

        self.handle_put_response(response).await
    }

    /// Ask the server how many bytes it has persisted.
    async fn probe_status(
        &mut self,
        session_uri: &str,
    ) -> std::result::Result<ChunkOutcome, AttemptError> {
        let response = self
            .client
            .http()
            .put(session_uri)
            .header(header::CONTENT_LENGTH, 0u64)
            .header(header::CONTENT_RANGE, format!("bytes */{}", self.file_size))
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_put_response(response).await
    }

    async fn handle_put_response(
        &mut self,
        response: Response,
    ) -> std::result::Result<ChunkOutcome, AttemptError> {
        let status = response.status();

        if status.as_u16() == RESUME_INCOMPLETE {
            self.offset = response
                .headers()
                .get(header::RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(acknowledged_bytes)
                .unwrap_or(0);
            self.probe_needed = false;
            tracing::debug!("{}/{} bytes acknowledged", self.offset, self.file_size);
            return Ok(ChunkOutcome::Progress {
                bytes_acknowledged: self.offset,
            });
        }

        if status.is_success() {
            self.probe_needed = false;
            let body = response.json::<Value>().await.map_err(transport_error)?;
            return Ok(ChunkOutcome::Done(body));
        }

        self.probe_needed = true;
        Err(status_error(status.as_u16(), response).await)
    }
}

#[async_trait]
impl ResumableTransfer for ResumableUpload<'_> {
    async fn advance(&mut self) -> std::result::Result<ChunkOutcome, AttemptError> {
        let session_uri = match &self.session_uri {
            Some(uri) => uri.clone(),
            None => {
                let uri = self.begin_session().await?;
                self.session_uri = Some(uri);
                return Ok(ChunkOutcome::Progress {
                    bytes_acknowledged: 0,
                });
            }
        };

        if self.probe_needed {
            self.probe_status(&session_uri).await
        } else {
            self.send_from_offset(&session_uri).await
        }
    }
}

/// Parse the acknowledged byte count out of a `Range: bytes=0-N` header.
fn acknowledged_bytes(range: &str) -> Option<u64> {
    let (_, end) = range.trim().strip_prefix("bytes=")?.split_once('-')?;
    end.parse::<u64>().ok().map(|n| n + 1)
}

fn transport_error(e: impl std::fmt::Display) -> AttemptError {
    AttemptError::Transport(e.to_string())
}

async fn status_error(status: u16, response: Response) -> AttemptError {
    let body = response.text().await.unwrap_or_default();
    AttemptError::Status { status, body }
}
