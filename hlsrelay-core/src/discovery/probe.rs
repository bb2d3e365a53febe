//! Existence probes for candidate segment URLs.

use async_trait::async_trait;

use crate::RelayError;
use crate::config::RelayConfig;

/// Checks whether a segment URL is currently served by the origin.
///
/// Implementations resolve every failure mode (timeout, refused
/// connection, error status) to `false`; a probe never returns an error.
#[async_trait]
pub trait SegmentProbe: Send + Sync {
    /// Returns true if the origin answered the URL with a success status.
    async fn exists(&self, url: &str) -> bool;
}

/// Probe issuing `GET` requests and inspecting only the status line.
///
/// The response body is never read; dropping the response releases the
/// connection without transferring segment data.
#[derive(Debug, Clone)]
pub struct HttpSegmentProbe {
    client: reqwest::Client,
}

impl HttpSegmentProbe {
    /// Creates a probe using the origin user agent and probe timeout.
    ///
    /// # Errors
    /// - `RelayError::HttpClient` - The underlying HTTP client could not be built
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(config.discovery.probe_timeout)
            .user_agent(config.origin.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()?;

        Ok(Self { client })
    }

    /// Creates a probe around an existing client.
    ///
    /// Useful for sharing connection pools or custom proxy settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SegmentProbe for HttpSegmentProbe {
    async fn exists(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::debug!(url, status = status.as_u16(), "Probe rejected");
                }
                status.is_success()
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "Probe request failed");
                false
            }
        }
    }
}
