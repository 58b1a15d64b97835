use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::StatusCode;
use tracing::warn;

const USER_AGENT: &str = "seo-audit/0.1";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for retrieving raw page markup.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Fetcher { client })
    }

    /// Fetch raw markup for a URL, degrading to an empty string on failure.
    ///
    /// Any non-200 status, network error, or timeout yields `""` so the
    /// pipeline sees an empty document rather than an error. No retries.
    pub async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("fetch failed for {}: {}", url, e);
                String::new()
            }
        }
    }

    /// Single GET, erroring on anything but a 200 response.
    pub(crate) async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            bail!("unexpected status {}", status);
        }
        Ok(response.text().await?)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let mut seen = Vec::new();
            loop {
                let n = sock.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
                if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = sock.write_all(response.as_bytes()).await;
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn returns_body_on_200() {
        let url = serve_once("200 OK", "<html>hello</html>").await;
        let fetcher = Fetcher::new().unwrap();
        assert_eq!(fetcher.fetch(&url).await, "<html>hello</html>");
    }

    #[tokio::test]
    async fn non_success_status_degrades_to_empty() {
        let url = serve_once("404 Not Found", "missing").await;
        let fetcher = Fetcher::new().unwrap();
        assert_eq!(fetcher.fetch(&url).await, "");
    }

    #[tokio::test]
    async fn connection_refused_degrades_to_empty() {
        let fetcher = Fetcher::new().unwrap();
        assert_eq!(fetcher.fetch("http://127.0.0.1:9/").await, "");
    }

    #[tokio::test]
    async fn invalid_url_degrades_to_empty() {
        let fetcher = Fetcher::new().unwrap();
        assert_eq!(fetcher.fetch("not a url").await, "");
    }
}
