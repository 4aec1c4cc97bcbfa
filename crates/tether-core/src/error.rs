//! Unified error types for the Tether framework.
//!
//! Errors fall into four groups:
//!
//! - [`ConfigError`]: raised synchronously while registering handlers.
//! - [`ResolveError`]: a handler or service could not be produced.
//! - [`DispatchError`]: what the caller of a dispatch entry point sees.
//! - [`TransportError`] / [`ApiError`]: the outbound API capability.
//!
//! Handler bodies return [`BoxError`] so applications can use `?` on their
//! own error types; the dispatcher hands that error back unchanged.

use thiserror::Error;

/// A type-erased, thread-safe error returned by handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors detected while configuring handlers and services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A registration argument was rejected.
    #[error("invalid argument `{param}`: {message}")]
    InvalidArgument {
        /// Name of the offending parameter.
        param: &'static str,
        /// Human-readable reason.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid-argument error for `param`.
    pub fn invalid_argument(param: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            message: message.into(),
        }
    }

    /// Returns the parameter name carried by this error.
    pub fn param(&self) -> &'static str {
        match self {
            Self::InvalidArgument { param, .. } => param,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Resolution Errors
// =============================================================================

/// Errors raised while producing a handler or service instance.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The resolver has no registration for the requested type.
    #[error("no registration for type `{type_name}`")]
    NotRegistered {
        /// Name of the requested type.
        type_name: &'static str,
    },

    /// A registered value could not be downcast to the requested type.
    #[error("registration for `{type_name}` produced a value of another type")]
    TypeMismatch {
        /// Name of the requested type.
        type_name: &'static str,
    },

    /// A factory callback failed.
    #[error("factory failed: {0}")]
    Factory(#[source] BoxError),

    /// A category handler outlived the request context it was created for.
    #[error("request context already dropped")]
    ContextDropped,
}

impl ResolveError {
    /// Wraps any error raised by a factory callback.
    pub fn factory(err: impl Into<BoxError>) -> Self {
        Self::Factory(err.into())
    }
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors returned to the caller of a dispatch entry point.
///
/// The framework never retries or aggregates: the first failure ends the
/// request and is reported here.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The category handler could not be constructed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A handler failed; the original error is carried unchanged.
    #[error(transparent)]
    Handler(BoxError),

    /// The inbound payload could not be classified or decoded.
    #[error("invalid payload: {0}")]
    Payload(String),
}

impl DispatchError {
    /// Creates a payload error.
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// Classifies an error surfaced by a handler call.
    ///
    /// Category handlers resolve keyed and generic handlers lazily, so a
    /// [`ResolveError`] can travel through a handler's `BoxError`; it is
    /// unwrapped back into [`DispatchError::Resolve`].
    pub fn from_handler(err: BoxError) -> Self {
        match err.downcast::<ResolveError>() {
            Ok(resolve) => Self::Resolve(*resolve),
            Err(other) => Self::Handler(other),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

// =============================================================================
// Transport / API Errors
// =============================================================================

/// Errors raised by an [`HttpTransport`](crate::integration::HttpTransport).
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No transport has been configured.
    #[error("transport '{transport}' not available")]
    NotAvailable {
        /// The transport that is missing.
        transport: &'static str,
    },

    /// The remote answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// I/O or connection failure.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised by an [`ApiClient`](crate::integration::ApiClient).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The platform rejected the call (`ok: false`).
    #[error("API call '{method}' failed: {error}")]
    Api {
        /// The API method that was called.
        method: String,
        /// The error code returned by the platform.
        error: String,
    },

    /// The arguments or the response could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_param() {
        let err = ConfigError::invalid_argument("command", "must start with '/'");
        assert_eq!(err.param(), "command");
        assert_eq!(
            err.to_string(),
            "invalid argument `command`: must start with '/'"
        );
    }

    #[test]
    fn resolve_error_is_recovered_from_handler_error() {
        let boxed: BoxError = Box::new(ResolveError::NotRegistered { type_name: "Foo" });
        assert!(matches!(
            DispatchError::from_handler(boxed),
            DispatchError::Resolve(ResolveError::NotRegistered { type_name: "Foo" })
        ));

        let other: BoxError = "boom".into();
        assert!(matches!(
            DispatchError::from_handler(other),
            DispatchError::Handler(_)
        ));
    }

    #[test]
    fn handler_error_is_transparent() {
        let inner: BoxError = "boom".into();
        let err = DispatchError::Handler(inner);
        assert_eq!(err.to_string(), "boom");
    }
}
