//! Resumable upload engine.
//!
//! The engine drives a chunked, resumable transfer against the YouTube
//! upload API, retrying transient failures with exponential backoff and
//! full jitter until terminal success or the retry budget runs out.

pub mod engine;
pub mod request;
pub mod retry;
pub mod transport;

pub use engine::{UploadEngine, UploadSession};
pub use request::{PrivacyStatus, UploadRequest, VideoId};
pub use retry::{AttemptError, RetryDecision, RetryPolicy};
pub use transport::{ChunkOutcome, ResumableTransfer, ResumableUpload};
