//! Thin JSON-over-HTTP client

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::application::errors::FetchError;

/// GET-and-decode wrapper around `reqwest`.
///
/// No retries: any failure is returned to the caller.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET `url` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("GET {} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(format!("GET {}: {}", url, e)))
    }

    /// GET `url` as untyped JSON.
    pub async fn get(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        self.get_json(url).await
    }

    /// GET `url` and discard the body; used for liveness pings.
    pub async fn ping(&self, url: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        response
            .error_for_status()
            .map(|_| ())
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}
