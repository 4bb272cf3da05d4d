//! News source adapters.
//!
//! Every source sits behind the [`SourceAdapter`] trait so the curator never
//! cares whether candidates came from a search API or a scraped page.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Naver News | [`naver`] | Search API | Requires client id/secret; sorted by date |
//! | Trade-press sites | [`site`] | HTML scraping | One listing page per [`site::SiteProfile`] |
//!
//! # Common Patterns
//!
//! Adapters:
//! - use a shared client with a bounded timeout (see [`build_client`])
//! - return raw, un-normalized candidates
//! - report failures as a tagged [`FetchError`] which the curator logs and
//!   swallows; nothing is retried within a run

pub mod naver;
pub mod site;

use crate::error::FetchError;
use crate::models::{RawCandidate, SourceQuery};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Browser-like User-Agent; several trade-press sites reject unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Uniform fetch contract implemented by every news source.
pub trait SourceAdapter {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Fetch raw candidates for one query.
    ///
    /// Implementations make a single attempt. On HTTP 429 they wait a short
    /// fixed backoff before returning [`FetchError::RateLimited`].
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawCandidate>, FetchError>;
}

/// Build an HTTP client with the given per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .build()
}

/// Send `request` and return the body text of a successful response.
///
/// A 429 answer sleeps for `rate_limit_backoff` before failing so the next
/// caller does not hit the limit again immediately.
pub async fn fetch_text(
    request: RequestBuilder,
    rate_limit_backoff: Duration,
) -> Result<String, FetchError> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(?rate_limit_backoff, "Rate limit reached; backing off");
        sleep(rate_limit_backoff).await;
        return Err(FetchError::RateLimited);
    }
    if !status.is_success() {
        return Err(FetchError::from_status(status));
    }

    let body = response.text().await?;
    debug!(bytes = body.len(), %status, "Fetched response body");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection on a local port, answer it with `response`
    /// after `stall`, and return the URL to request.
    async fn serve_once(response: &'static str, stall: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                sleep(stall).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/search")
    }

    fn client() -> Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text_success_returns_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
            Duration::ZERO,
        )
        .await;
        let body = fetch_text(client().get(&url), Duration::ZERO).await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_text_rate_limit_waits_for_backoff() {
        let url = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            Duration::ZERO,
        )
        .await;
        let backoff = Duration::from_millis(300);
        let started = Instant::now();
        let err = fetch_text(client().get(&url), backoff).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited));
        assert_eq!(err.reason(), "rate-limit");
        assert!(started.elapsed() >= backoff);
    }

    #[tokio::test]
    async fn test_fetch_text_server_error_is_status() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            Duration::ZERO,
        )
        .await;
        let err = fetch_text(client().get(&url), Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
        assert_eq!(err.reason(), "http-status");
    }

    #[tokio::test]
    async fn test_fetch_text_missing_page_is_not_found() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            Duration::ZERO,
        )
        .await;
        let err = fetch_text(client().get(&url), Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
    }

    #[tokio::test]
    async fn test_fetch_text_stalled_server_times_out() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            Duration::from_secs(5),
        )
        .await;
        let client = build_client(Duration::from_millis(200)).unwrap();
        let started = Instant::now();
        let err = fetch_text(client.get(&url), Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
        assert_eq!(err.reason(), "timeout");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
