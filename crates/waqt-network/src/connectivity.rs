use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use waqt_types::ports::Connectivity;
use waqt_types::{PortError, PortResult};

pub const DEFAULT_PROBE_URL: &str = "https://api.aladhan.com/v1/status";

/// Treats the device as online when a probe URL answers in time.
///
/// Any HTTP response counts, including error statuses: only a transport
/// failure or a timeout means offline.
#[derive(Debug, Clone)]
pub struct HttpConnectivity {
    client: reqwest::Client,
    url: String,
}

impl HttpConnectivity {
    pub fn new() -> PortResult<Self> {
        Self::with_url(DEFAULT_PROBE_URL, Duration::from_secs(3))
    }

    pub fn with_url(url: impl Into<String>, timeout: Duration) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Connectivity for HttpConnectivity {
    async fn is_connected(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connectivity probe to {} failed: {}", self.url, e);
                false
            }
        }
    }
}
