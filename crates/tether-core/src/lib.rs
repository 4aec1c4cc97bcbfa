//! # Tether Core
//!
//! Foundation types shared by every Tether crate.
//!
//! ## Layers
//!
//! ### Model
//!
//! Serde representations of everything the platform delivers
//! ([`EventCallback`], [`InteractionPayload`], [`SlashCommand`], ...) and of
//! the synchronous responses handlers produce ([`ViewSubmissionResponse`],
//! [`SlashCommandResponse`], ...). Routing keys are read from these types.
//!
//! ### Resolution
//!
//! The [`Resolver`] capability (resolve-by-type plus create-scope) through
//! which handlers are built from a dependency-injection container, and the
//! built-in [`Container`] implementing it.
//!
//! ### Integration
//!
//! Contracts for the collaborators the dispatch core consumes but does not
//! implement: [`HttpTransport`], [`ApiClient`], [`UrlBuilder`],
//! [`JsonSettings`], [`TypeResolver`] and [`SocketModeClient`].
//!
//! ## Error Handling
//!
//! Every fallible operation returns one of the result aliases in
//! [`error`]. Handler bodies return [`BoxError`] so that applications keep
//! their own error types.

pub mod error;
pub mod integration;
pub mod model;
pub mod resolver;
pub mod responder;

pub use error::{
    ApiError, ApiResult, BoxError, ConfigError, ConfigResult, DispatchError, DispatchResult,
    ResolveError, ResolveResult, TransportError, TransportResult,
};
pub use integration::{
    Acknowledgement, ApiClient, BaseUrlBuilder, DEFAULT_API_BASE_URL, DefaultTypeResolver,
    Envelope, EnvelopeType, HttpTransport, JsonSettings, SocketModeClient, TransportApiClient,
    TypeResolver, UnconfiguredTransport, UrlBuilder,
};
pub use model::*;
pub use resolver::{AnyArc, Container, ContainerBuilder, Lifetime, Resolver};
pub use responder::Responder;

/// Re-exported for handler implementations.
pub use async_trait::async_trait;
pub use futures::future::BoxFuture;
