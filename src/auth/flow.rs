//! Interactive local-server authorization flow.
//!
//! Binds a loopback listener, prints the authorization URL for the user to
//! open, and waits for the provider to redirect the browser back with an
//! authorization code.

use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::auth::provider::Credential;
use crate::auth::secrets::ClientSecrets;
use crate::auth::token::fetch_token;
use crate::error::{Error, Result};
use crate::output::print_info;

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
    <html><body>Authorization complete. You can close this tab.</body></html>";

/// Run the loopback authorization flow to completion.
pub async fn run_local_server(
    http: &Client,
    secrets: &ClientSecrets,
    scopes: &[String],
) -> Result<Credential> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(|e| Error::Authentication(format!("could not bind loopback listener: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::Authentication(e.to_string()))?
        .port();
    let redirect_uri = format!("http://127.0.0.1:{}", port);

    let auth_url = authorization_url(secrets, scopes, &redirect_uri)?;
    print_info("Open this URL in your browser to authorize uploads:");
    print_info(&format!("  {}", auth_url));

    let (mut stream, _) = listener
        .accept()
        .await
        .map_err(|e| Error::Authentication(format!("redirect never arrived: {}", e)))?;
    let code = read_auth_code(&mut stream).await?;

    let token = fetch_token(
        http,
        &secrets.installed.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", &code),
            ("client_id", &secrets.installed.client_id),
            ("client_secret", &secrets.installed.client_secret),
            ("redirect_uri", &redirect_uri),
        ],
    )
    .await
    .map_err(|e| Error::Authentication(e.to_string()))?;

    let refresh_token = token.refresh_token.ok_or_else(|| {
        Error::Authentication("authorization response contained no refresh token".into())
    })?;

    Ok(Credential {
        access_token: token.access_token,
        refresh_token,
    })
}

/// Build the user-facing authorization URL.
fn authorization_url(secrets: &ClientSecrets, scopes: &[String], redirect_uri: &str) -> Result<Url> {
    let mut url = Url::parse(&secrets.installed.auth_uri)?;
    url.query_pairs_mut()
        .append_pair("client_id", &secrets.installed.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scopes.join(" "))
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

/// Read the redirect request and pull the authorization code out of it.
async fn read_auth_code(stream: &mut TcpStream) -> Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    // The request line is all we need; read until it is complete.
    while !buf.windows(2).any(|w| w == b"\r\n") {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| Error::Authentication(format!("failed to read redirect: {}", e)))?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&buf);
    let code = extract_code(&request);

    // Tell the browser we are done either way.
    let _ = stream.write_all(SUCCESS_PAGE.as_bytes()).await;
    let _ = stream.shutdown().await;

    code
}

/// Extract the `code` query parameter from an HTTP request line.
fn extract_code(request: &str) -> Result<String> {
    let request_line = request
        .lines()
        .next()
        .ok_or_else(|| Error::Authentication("empty redirect request".into()))?;
    let path = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::Authentication("malformed redirect request".into()))?;

    // Any loopback base works; only the query matters.
    let url = Url::parse(&format!("http://127.0.0.1{}", path))
        .map_err(|e| Error::Authentication(format!("malformed redirect path: {}", e)))?;

    if let Some((_, error)) = url.query_pairs().find(|(k, _)| k == "error") {
        return Err(Error::Authentication(format!(
            "authorization was denied: {}",
            error
        )));
    }

    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| Error::Authentication("redirect carried no authorization code".into()))
}
