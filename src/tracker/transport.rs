//! HTTP transport to the tracker API
//!
//! The poller never talks to the network directly; it goes through the
//! `TrackerTransport` trait so tests can substitute an in-memory transport.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::types::{Result, SidequestError};

/// Transport seam between the poller and the tracker API.
#[async_trait::async_trait]
pub trait TrackerTransport: Send + Sync {
    /// Fetch `url` with the given bearer token and return the parsed JSON
    /// payload. An HTML payload or a non-success status is an auth failure.
    async fn fetch_json(&self, url: &str, token: &str) -> Result<serde_json::Value>;
}

/// Production transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl TrackerTransport for HttpTransport {
    async fn fetch_json(&self, url: &str, token: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        // An HTML page instead of JSON is a login redirect
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if content_type.contains("text/html") {
            return Err(SidequestError::Auth(
                "received HTML instead of JSON".to_string(),
            ));
        }

        if !response.status().is_success() {
            return Err(SidequestError::Auth(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}
