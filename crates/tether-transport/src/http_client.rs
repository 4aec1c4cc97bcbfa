//! `reqwest`-backed HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, trace};

use tether_core::{HttpTransport, TransportError, TransportResult};

/// Posts JSON to the platform API with a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: Value,
        token: Option<&str>,
    ) -> TransportResult<Value> {
        trace!(url = %url, "Posting API request");

        let mut req = self.client.post(url).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(url = %url, status = status.as_u16(), "API request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unreachable_host_is_io_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .post_json("http://127.0.0.1:1/chat.postMessage", json!({}), Some("xoxb"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
