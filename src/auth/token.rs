//! Token endpoint exchange.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Response body from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// POST a grant to the token endpoint and parse the token response.
pub(crate) async fn fetch_token(
    http: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http.post(token_uri).form(params).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Authentication(format!(
            "token endpoint rejected the request: HTTP {}: {}",
            status, body
        )));
    }

    Ok(response.json::<TokenResponse>().await?)
}
