//! Link discovery.
//!
//! Walks a VOD listing page one level deep: session folders on the top page,
//! video files inside each folder. Pages that do not answer 200 are skipped
//! silently; the affected branch just yields nothing.

pub mod links;

use regex::Regex;
use reqwest::Client;
use url::Url;

use crate::error::{Error, Result};
use links::{matching_hrefs, SESSION_LINK_PATTERN, VIDEO_LINK_PATTERN};

/// One video found on a session sub-page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredItem {
    /// Folder label with the trailing slash stripped, e.g. `13-alpha`.
    pub session_label: String,
    /// Absolute URL of the video file.
    pub file_url: Url,
}

/// Discovers video links under a listing URL.
pub struct LinkDiscoverer {
    http: Client,
    session_pattern: Regex,
    video_pattern: Regex,
}

impl LinkDiscoverer {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            session_pattern: Regex::new(SESSION_LINK_PATTERN)
                .expect("static session link pattern"),
            video_pattern: Regex::new(VIDEO_LINK_PATTERN).expect("static video link pattern"),
        })
    }

    /// Crawl the listing and return the discovered items in document order.
    pub async fn discover(&self, base_url: &Url) -> Result<Vec<DiscoveredItem>> {
        let Some(listing) = self.fetch_page(base_url).await? else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for session_href in matching_hrefs(&listing, &self.session_pattern) {
            let session_url = base_url.join(&session_href)?;
            let Some(session_page) = self.fetch_page(&session_url).await? else {
                continue;
            };

            let session_label = session_href.trim_end_matches('/').to_string();
            for video_href in matching_hrefs(&session_page, &self.video_pattern) {
                items.push(DiscoveredItem {
                    session_label: session_label.clone(),
                    file_url: session_url.join(&video_href)?,
                });
            }
        }

        Ok(items)
    }

    /// GET a page; any non-200 answer drops the branch without error.
    async fn fetch_page(&self, url: &Url) -> Result<Option<String>> {
        let response = self.http.get(url.clone()).send().await?;
        if response.status() != 200 {
            tracing::debug!("Skipping {} (HTTP {})", url, response.status());
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    const LISTING: &str = r#"<html><body>
        <a href="13-alpha/">13-alpha/</a>
        <a href="19-skip/">19-skip/</a>
    </body></html>"#;

    const SESSION_PAGE: &str = r#"<html><body>
        <a href="007.mp4">007.mp4</a>
        <a href="notavideo.txt">notavideo.txt</a>
    </body></html>"#;

    /// Serve the fixture pages on a loopback port, recording every
    /// requested path.
    async fn serve_listing() -> (Url, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requested = Arc::new(Mutex::new(Vec::new()));
        let seen = requested.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 2048];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(path.clone());

                let (status, body) = match path.as_str() {
                    "/vods/" => ("200 OK", LISTING),
                    "/vods/13-alpha/" => ("200 OK", SESSION_PAGE),
                    _ => ("404 Not Found", ""),
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let base = Url::parse(&format!("http://127.0.0.1:{}/vods/", port)).unwrap();
        (base, requested)
    }

    #[tokio::test]
    async fn test_discover_yields_only_matching_videos() {
        let (base, requested) = serve_listing().await;

        let discoverer = LinkDiscoverer::new().unwrap();
        let items = discoverer.discover(&base).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].session_label, "13-alpha");
        assert!(items[0].file_url.as_str().ends_with("/vods/13-alpha/007.mp4"));

        let requested = requested.lock().unwrap();
        assert!(requested.iter().any(|p| p == "/vods/13-alpha/"));
        assert!(!requested.iter().any(|p| p.contains("19-skip")));
        assert!(!requested.iter().any(|p| p.contains("notavideo")));
    }

    #[tokio::test]
    async fn test_discover_non_200_listing_yields_nothing() {
        let (base, _) = serve_listing().await;
        let missing = base.join("../gone/").unwrap();

        let discoverer = LinkDiscoverer::new().unwrap();
        let items = discoverer.discover(&missing).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_url_joins_stay_under_the_listing() {
        let base = Url::parse("http://vods.example.net/fall-2023/").unwrap();
        let session = base.join("13-alpha/").unwrap();
        let file = session.join("007.mp4").unwrap();
        assert_eq!(
            file.as_str(),
            "http://vods.example.net/fall-2023/13-alpha/007.mp4"
        );
    }
}
