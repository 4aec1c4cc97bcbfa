//! # Tether Transport
//!
//! Concrete [`HttpTransport`](tether_core::HttpTransport) implementations
//! for the outbound API client.
//!
//! ## Features
//!
//! - `http-client`: [`ReqwestTransport`], backed by `reqwest`
//!
//! ```text
//! ┌─────────────────────┐
//! │  TransportApiClient │  (tether-core)
//! ├─────────────────────┤
//! │  HttpTransport      │  (capability trait)
//! ├─────────────────────┤
//! │  tether-transport   │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (HTTPS)    │
//! └─────────────────────┘
//! ```

#[cfg(feature = "http-client")]
pub mod http_client;

#[cfg(feature = "http-client")]
pub use http_client::ReqwestTransport;
