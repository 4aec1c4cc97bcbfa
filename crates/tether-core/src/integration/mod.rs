//! Integration layer - contracts for external collaborators.
//!
//! The dispatch core consumes these capabilities but does not implement the
//! systems behind them:
//! - outbound HTTP transport and the API client built on it
//! - API URL construction and JSON serialization settings
//! - classification of raw inbound JSON
//! - socket-mode envelope handling

pub mod api;
pub mod json;
pub mod socket;
pub mod transport;
pub mod types;
pub mod url;

pub use api::{ApiClient, TransportApiClient};
pub use json::JsonSettings;
pub use socket::{Acknowledgement, Envelope, EnvelopeType, SocketModeClient};
pub use transport::{HttpTransport, UnconfiguredTransport};
pub use types::{DefaultTypeResolver, TypeResolver};
pub use url::{BaseUrlBuilder, DEFAULT_API_BASE_URL, UrlBuilder};
