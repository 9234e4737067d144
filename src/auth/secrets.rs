//! OAuth client secrets file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Contents of the `client_secrets.json` file provisioned from the
/// Google API Console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub installed: InstalledApp,
}

/// The `installed` application entry.
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientSecrets {
    /// Load and parse the secrets file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|_| {
            Error::MissingConfig(format!(
                "OAuth client secrets file not found at {}. Create an OAuth 2.0 \
                 client id in the Google API Console and download it there.",
                path.display()
            ))
        })?;

        Ok(serde_json::from_str(&data)?)
    }
}
