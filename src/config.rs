//! Application configuration and fixed defaults.

use std::env;
use std::path::PathBuf;

/// Environment variable holding the read-only Data API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default prefix for uploaded video titles.
pub const DEFAULT_TITLE_PREFIX: &str = "Nethackathon VI:";

/// OAuth scope allowing uploads to the authenticated channel and nothing else.
pub const UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";

/// Credential provider configuration.
///
/// Paths and scopes are explicit here rather than module-level globals so
/// tests can point the provider at temporary files.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// OAuth client id/secret file, provisioned out-of-band from the
    /// Google API Console.
    pub client_secrets_path: PathBuf,

    /// Plain-text file holding the current refresh token. Read on startup
    /// and overwritten after every successful authentication.
    pub refresh_token_path: PathBuf,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secrets_path: PathBuf::from("client_secrets.json"),
            refresh_token_path: PathBuf::from("refresh_token"),
            scopes: vec![UPLOAD_SCOPE.to_string()],
        }
    }
}

/// Read the Data API key from the environment, if set.
///
/// The key is loaded from a local untracked `.env` file by `dotenvy` at
/// startup; it backs the read-only API client and is not needed for uploads.
pub fn google_api_key() -> Option<String> {
    env::var(API_KEY_ENV).ok()
}
