//! Error types for the vod-uploader application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    // Upload errors
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Upload failed with an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("No longer attempting to retry after {attempts} attempts (last error: {last_error})")]
    RetriesExhausted { attempts: u32, last_error: String },

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error must end the whole run rather than just the
    /// current item (unexpected upload response or an exhausted retry
    /// budget).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedResponse(_) | Error::RetriesExhausted { .. }
        )
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 2;
    pub const AUTH_ERROR: i32 = 3;
    pub const UPLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
