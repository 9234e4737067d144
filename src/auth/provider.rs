//! Credential provider.

use reqwest::Client;

use crate::auth::flow;
use crate::auth::secrets::ClientSecrets;
use crate::auth::token::fetch_token;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// An OAuth credential usable against the upload API.
///
/// The access token is ephemeral and held only in memory; the refresh token
/// is persisted across runs.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

/// Obtains credentials, preferring the persisted refresh token and falling
/// back to the interactive browser flow.
pub struct CredentialProvider {
    config: AuthConfig,
    http: Client,
}

impl CredentialProvider {
    pub fn new(config: AuthConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Produce a usable credential.
    ///
    /// On every successful path the (possibly rotated) refresh token is
    /// written back to disk, overwriting the previous value. Fails with
    /// `Error::Authentication` only when the interactive flow itself cannot
    /// complete.
    pub async fn authenticate(&self) -> Result<Credential> {
        let secrets = ClientSecrets::load(&self.config.client_secrets_path)?;

        let credential = match self.refresh_from_disk(&secrets).await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(
                    "Refresh token at {} didn't work ({}), redoing auth",
                    self.config.refresh_token_path.display(),
                    e
                );
                flow::run_local_server(&self.http, &secrets, &self.config.scopes).await?
            }
        };

        tracing::info!(
            "Saving refresh token to {}",
            self.config.refresh_token_path.display()
        );
        tokio::fs::write(&self.config.refresh_token_path, &credential.refresh_token).await?;

        Ok(credential)
    }

    /// Exchange the persisted refresh token for a fresh access token.
    async fn refresh_from_disk(&self, secrets: &ClientSecrets) -> Result<Credential> {
        let stored = tokio::fs::read_to_string(&self.config.refresh_token_path).await?;
        let stored = stored.trim().to_string();
        if stored.is_empty() {
            return Err(Error::Authentication("stored refresh token is empty".into()));
        }

        let token = fetch_token(
            &self.http,
            &secrets.installed.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", &stored),
                ("client_id", &secrets.installed.client_id),
                ("client_secret", &secrets.installed.client_secret),
            ],
        )
        .await?;

        Ok(Credential {
            access_token: token.access_token,
            // The endpoint only returns a new refresh token when it rotates;
            // keep the stored one otherwise.
            refresh_token: token.refresh_token.unwrap_or(stored),
        })
    }
}
