//! Application configuration.
//!
//! Settings are layered with `figment` (see [`loader`]), described by the
//! [`schema`] types and checked by [`validate_config`] before the runtime
//! applies them to a service configuration.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ApiConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SocketModeConfig,
    SpanEventConfig, TetherConfig,
};
pub use validation::validate_config;
