//! HTTP client for the image decode service.
//!
//! The service receives the URL of a photographed proof code and answers with
//! the text it could read from it:
//!
//! ```text
//! POST {endpoint}   {"url": "https://…/photo.jpg"}
//! 200 OK            {"text": "QB{kitchen}"}
//! ```
//!
//! An empty `text` means nothing readable was found.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trailhunt_core::error::DecodeError;
use trailhunt_core::ports::ImageDecoder;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct DecodeRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    text: String,
}

/// `ImageDecoder` backed by the remote decode service.
#[derive(Debug, Clone)]
pub struct HttpImageDecoder {
    client: Client,
    endpoint: String,
}

impl HttpImageDecoder {
    /// Creates a decoder posting to `endpoint`. Requests taking longer than
    /// `timeout` fail with `DecodeError::Unavailable`.
    #[must_use]
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_owned(),
        }
    }

    /// The URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageDecoder for HttpImageDecoder {
    async fn decode(&self, url: &str) -> Result<String, DecodeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&DecodeRequest { url })
            .send()
            .await
            .map_err(|e| DecodeError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DecodeError::Unavailable(format!("{status}: {body}")));
        }

        let decoded: DecodeResponse = response
            .json()
            .await
            .map_err(|e| DecodeError::InvalidResponse(e.to_string()))?;
        debug!(url, chars = decoded.text.len(), "image decoded");
        Ok(decoded.text)
    }
}
