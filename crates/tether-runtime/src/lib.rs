//! # Tether Runtime
//!
//! Host-side glue around the framework:
//!
//! - [`config`]: layered `figment` configuration ([`TetherConfig`])
//! - [`logging`]: `tracing-subscriber` setup driven by [`LoggingConfig`](config::LoggingConfig)
//! - [`runtime`]: [`TetherRuntime`], which applies both to a service
//!   configuration and drives socket-mode frames
//!
//! ```rust,ignore
//! use tether_runtime::TetherRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TetherRuntime::builder().build(|services| {
//!         services.register_event_handler(HandlerSource::instance(Greeter));
//!         Ok(())
//!     })?;
//!     let response = runtime.dispatcher().dispatch_json(body).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, TetherConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, TetherRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for applications.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
