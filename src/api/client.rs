//! YouTube API HTTP client.

use reqwest::{Client, Method, RequestBuilder};

use crate::auth::Credential;
use crate::error::{Error, Result};

/// Resumable upload endpoint for `videos.insert`.
pub const UPLOAD_ENDPOINT: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Base URL for the read-only Data API.
pub const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

enum Auth {
    /// OAuth bearer token; required for uploads.
    Bearer(String),
    /// Developer API key; read-only access.
    ApiKey(String),
}

/// YouTube API client carrying its authentication method.
pub struct YouTubeClient {
    client: Client,
    auth: Auth,
}

impl YouTubeClient {
    /// Create a client authenticated with an OAuth credential.
    pub fn new(credential: &Credential) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            auth: Auth::Bearer(credential.access_token.clone()),
        })
    }

    /// Create a read-only client keyed by a developer API key.
    ///
    /// Key-based access cannot upload; this handle exists for Data API
    /// lookups against public resources.
    pub fn with_api_key(key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
            auth: Auth::ApiKey(key.into()),
        })
    }

    /// Build a request with authentication applied.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth {
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::ApiKey(key) => builder.query(&[("key", key.as_str())]),
        }
    }

    /// The underlying HTTP client, for requests against pre-authorized URLs
    /// such as a resumable session URI.
    pub fn http(&self) -> &Client {
        &self.client
    }
}

fn build_http_client() -> Result<Client> {
    Client::builder()
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}
