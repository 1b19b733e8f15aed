use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("unparseable response body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the upstream weather API. Every call carries a bounded timeout
/// so a slow provider can never block a request indefinitely. The response
/// document is returned as-is, without validation or transformation.
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }

    #[instrument(skip(self), fields(city = %city))]
    pub async fn fetch(&self, city: &str) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/{}?key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(city),
            self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(ProviderError::Network)?;
        let document: Value = serde_json::from_str(&text)?;

        info!(city = %city, "provider fetch successful");
        Ok(document)
    }
}
