//! Outbound HTTP capability.
//!
//! The framework never speaks HTTP itself; an [`HttpTransport`] is plugged in
//! by the host (see the `http-client` feature of `tether-transport`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{TransportError, TransportResult};

/// Posts JSON documents to the platform API.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POSTs `body` to `url`, authenticating with `token` when given, and
    /// returns the decoded JSON response.
    async fn post_json(
        &self,
        url: &str,
        body: Value,
        token: Option<&str>,
    ) -> TransportResult<Value>;
}

/// The default transport: every call fails with
/// [`TransportError::NotAvailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredTransport;

#[async_trait]
impl HttpTransport for UnconfiguredTransport {
    async fn post_json(
        &self,
        _url: &str,
        _body: Value,
        _token: Option<&str>,
    ) -> TransportResult<Value> {
        Err(TransportError::NotAvailable {
            transport: "http-client",
        })
    }
}
