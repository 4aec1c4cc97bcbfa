//! The outbound API client.
//!
//! Handlers that need to call the platform resolve an [`ApiClient`] from the
//! service provider. The client is deliberately thin: one method name, one
//! JSON argument object, one JSON response. Typed wrappers, pagination and
//! retries are left to the application.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::json::JsonSettings;
use super::transport::HttpTransport;
use super::url::UrlBuilder;
use crate::error::{ApiError, ApiResult};

/// Makes Web API calls.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Calls `method` with the JSON object `args`.
    ///
    /// A response with `"ok": false` is reported as [`ApiError::Api`].
    async fn call(&self, method: &str, args: Value) -> ApiResult<Value>;
}

impl dyn ApiClient + '_ {
    /// Calls `method` with serializable arguments and decodes the response.
    pub async fn post<A, R>(&self, method: &str, args: &A) -> ApiResult<R>
    where
        A: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let args = serde_json::to_value(args).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let response = self.call(method, args).await?;
        serde_json::from_value(response).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// The default client, composed from the provider's transport, URL builder
/// and JSON settings.
pub struct TransportApiClient {
    transport: Arc<dyn HttpTransport>,
    urls: Arc<dyn UrlBuilder>,
    json: Arc<JsonSettings>,
    token: Option<String>,
}

impl TransportApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        urls: Arc<dyn UrlBuilder>,
        json: Arc<JsonSettings>,
        token: Option<String>,
    ) -> Self {
        Self {
            transport,
            urls,
            json,
            token,
        }
    }
}

#[async_trait]
impl ApiClient for TransportApiClient {
    async fn call(&self, method: &str, args: Value) -> ApiResult<Value> {
        let body = self
            .json
            .to_value(&args)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let url = self.urls.url(method);
        debug!(method, %url, "Calling API");

        let response = self
            .transport
            .post_json(&url, body, self.token.as_deref())
            .await?;

        if response.get("ok").and_then(Value::as_bool) == Some(false) {
            let error = response
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error")
                .to_string();
            return Err(ApiError::Api {
                method: method.to_string(),
                error,
            });
        }
        Ok(response)
    }
}

impl std::fmt::Debug for TransportApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportApiClient")
            .field("json", &self.json)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, TransportResult};
    use crate::integration::url::BaseUrlBuilder;
    use parking_lot::Mutex;
    use serde_json::json;

    struct CannedTransport {
        response: Value,
        seen: Mutex<Vec<(String, Value, Option<String>)>>,
    }

    #[async_trait]
    impl HttpTransport for CannedTransport {
        async fn post_json(
            &self,
            url: &str,
            body: Value,
            token: Option<&str>,
        ) -> TransportResult<Value> {
            self.seen
                .lock()
                .push((url.to_string(), body, token.map(str::to_string)));
            Ok(self.response.clone())
        }
    }

    fn client(response: Value) -> (Arc<CannedTransport>, TransportApiClient) {
        let transport = Arc::new(CannedTransport {
            response,
            seen: Mutex::new(Vec::new()),
        });
        let client = TransportApiClient::new(
            transport.clone(),
            Arc::new(BaseUrlBuilder::default()),
            Arc::new(JsonSettings::default()),
            Some("xoxb-test".to_string()),
        );
        (transport, client)
    }

    #[tokio::test]
    async fn call_posts_to_method_url() {
        let (transport, client) = client(json!({ "ok": true, "ts": "1.0" }));
        let response = client
            .call("chat.postMessage", json!({ "channel": "C1", "thread_ts": null }))
            .await
            .unwrap();

        assert_eq!(response["ts"], "1.0");
        let seen = transport.seen.lock();
        assert_eq!(seen[0].0, "https://slack.com/api/chat.postMessage");
        assert_eq!(seen[0].1, json!({ "channel": "C1" }));
        assert_eq!(seen[0].2.as_deref(), Some("xoxb-test"));
    }

    #[tokio::test]
    async fn not_ok_maps_to_api_error() {
        let (_, client) = client(json!({ "ok": false, "error": "channel_not_found" }));
        let err = client.call("chat.postMessage", json!({})).await.unwrap_err();
        assert!(matches!(err, ApiError::Api { ref error, .. } if error == "channel_not_found"));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let client = TransportApiClient::new(
            Arc::new(crate::integration::transport::UnconfiguredTransport),
            Arc::new(BaseUrlBuilder::default()),
            Arc::new(JsonSettings::default()),
            None,
        );
        let err = client.call("auth.test", json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Transport(TransportError::NotAvailable { .. })
        ));
    }
}
