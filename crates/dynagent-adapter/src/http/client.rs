/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::http::error::{DynagentError, Result};

/// Default base URL for a locally running backend
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for the Dynamic Agentic System backend
#[derive(Debug)]
pub struct DynagentClient {
    http_client: Client,
    base_url: Url,
}

impl DynagentClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client with custom configuration and base URL
    ///
    /// This is also the constructor tests use to point the client at a
    /// wiremock server.
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// The base URL this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build request builder for an endpoint path
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and decode the JSON body, mapping non-2xx statuses to
    /// [`DynagentError::Api`] with the backend's `detail` message when present.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_detail(&body).unwrap_or(body);
            tracing::debug!(status = status.as_u16(), %message, "API request failed");
            return Err(DynagentError::api_error(status, message));
        }

        match response.json::<T>().await {
            Ok(decoded) => Ok(decoded),
            Err(err) if err.is_decode() => Err(DynagentError::InvalidResponse(err.to_string())),
            Err(err) => Err(DynagentError::Http(err)),
        }
    }
}

/// Pull the `detail` field out of a FastAPI-style error body.
fn extract_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|detail| detail.as_str())
        .map(str::to_string)
}
