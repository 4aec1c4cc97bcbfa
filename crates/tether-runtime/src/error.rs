//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while building or running a [`TetherRuntime`](crate::TetherRuntime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A handler registration was rejected.
    #[error(transparent)]
    Registration(#[from] tether_core::ConfigError),

    /// The HTTP transport could not be created.
    #[error(transparent)]
    Transport(#[from] tether_core::TransportError),

    /// An acknowledgement could not be sent back over the socket.
    #[error("Failed to send acknowledgement: {0}")]
    Acknowledge(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
