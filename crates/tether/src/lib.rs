//! # Tether
//!
//! Inbound event dispatch for chat platform apps, with handlers resolved
//! once per request.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────────────┐     ┌──────────────────────┐
//! │ HTTP / sock │────▶│ Dispatcher │────▶│ HandlerFactory   │────▶│ category handler     │
//! │   (host)    │     │            │     │ (per category)   │     │ keyed → generic      │
//! └─────────────┘     └────────────┘     └──────────────────┘     └──────────────────────┘
//!                           │                                               │
//!                           ▼                                               ▼
//!                     RequestContext ◄──────── one instance per slot ───────┘
//! ```
//!
//! - **ServiceConfiguration**: registers handlers and overrides services
//! - **ServiceProvider**: the built services, each created once on first use
//! - **RequestContext**: caches every handler resolved while serving one request
//! - **Category handlers**: route a payload to its keyed handler, then to the
//!   generic ones
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tether::prelude::*;
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl TypedEventHandler<AppMention> for Greeter {
//!     async fn handle(&self, mention: &AppMention) -> Result<(), BoxError> {
//!         info!(user = %mention.user, "Mentioned");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TetherRuntime::builder().build(|services| {
//!         services.register_typed_event_handler::<AppMention>(HandlerSource::instance(Greeter));
//!         Ok(())
//!     })?;
//!     let response = runtime.dispatcher().dispatch_json(body).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)* / `yaml-config`: configuration file formats
//! - `json-log`: JSON log output
//! - `http-client`: `reqwest` transport for the outbound API client

pub use tether_core as core;
pub use tether_framework as framework;
pub use tether_runtime as runtime;
pub use tether_transport as transport;

/// Commonly used types for building an app.
pub mod prelude {
    pub use tether_runtime::{TetherConfig, TetherRuntime};

    pub use tether_framework::{
        Dispatcher, HandlerSource, RequestContext, RequestListener, ServiceConfiguration,
        ServiceProvider, handler::*,
    };

    pub use tether_core::{
        ApiClient, BoxError, ConfigError, Container, DispatchError, DispatchResponse,
        DispatchResult, InboundRequest, Resolver, Responder, async_trait, model::*,
    };

    pub use tether_runtime::prelude::*;
}
