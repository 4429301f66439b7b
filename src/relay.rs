// src/relay.rs
//! Fetch boundary. Upstream providers and feeds are reached through the
//! [`Relay`] trait so the pipeline can be exercised against canned payloads.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Failure taxonomy at the fetch boundary. The aggregator absorbs all of
/// these; nothing past it ever sees a fetch error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("network error: {0}")]
    Network(String),
    /// The upstream answered with a non-2xx status.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    /// No response within the bounded window.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Relay: Send + Sync {
    /// Fetch the raw body of an absolute URL, forwarding bytes verbatim.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production relay: a shared reqwest client with a bounded timeout.
/// Stateless passthrough, no retries. Retry policy belongs to callers.
pub struct HttpRelay {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpRelay {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("worldnews-aggregator/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        })
    }
}

/// Offline relay serving canned payloads by exact URL. URLs without a
/// payload answer 404, which lets tests exercise the partial-failure path.
#[derive(Default)]
pub struct StaticRelay {
    payloads: HashMap<String, String>,
}

impl StaticRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, payload: &str) -> Self {
        self.payloads.insert(url.to_string(), payload.to_string());
        self
    }
}

#[async_trait]
impl Relay for StaticRelay {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match self.payloads.get(url) {
            Some(p) => Ok(p.clone()),
            None => Err(FetchError::Upstream {
                status: 404,
                message: format!("no payload registered for {url}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_relay_serves_registered_payloads() {
        let relay = StaticRelay::new().with("https://a.example/feed.xml", "<rss/>");
        assert_eq!(
            relay.fetch("https://a.example/feed.xml").await.unwrap(),
            "<rss/>"
        );
        let err = relay.fetch("https://b.example/feed.xml").await.unwrap_err();
        assert!(matches!(err, FetchError::Upstream { status: 404, .. }));
    }
}
