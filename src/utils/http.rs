// src/utils/http.rs

//! HTTP feed retrieval.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::FetchConfig;

/// Where raw feed bytes come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Retrieve the document at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Feed source backed by a reqwest client, with optional retries.
pub struct HttpSource {
    client: reqwest::Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self::with_client(create_async_client(config)?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &FetchConfig) -> Self {
        Self {
            client,
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(url, describe(&e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(bytes) => {
                    log::debug!("Fetched {} bytes from {}", bytes.len(), url);
                    return Ok(bytes);
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!("{}; retrying ({}/{})", e, attempt, self.retries);
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timed out ({error})")
    } else {
        error.to_string()
    }
}
