//! # Tether Framework
//!
//! Handler registration, request-scoped resolution and dispatch.
//!
//! ```text
//!  ServiceConfiguration ──build──► ServiceProvider
//!        │ register_*                   │
//!        ▼                              ▼
//!  HandlerRegistry ──► HandlerIndex   Dispatcher ◄── DefaultSocketModeClient
//!                          │              │
//!                          ▼              ▼
//!                   category handler ◄── HandlerFactory ──► RequestContext
//! ```
//!
//! - [`service`]: the configuration surface and the built provider
//! - [`registry`] / [`index`]: registrations and their immutable, keyed view
//! - [`context`] / [`listener`]: per-request instance cache and lifecycle
//! - [`factory`]: one category handler per category and request
//! - [`dispatch`]: the default category handlers
//! - [`dispatcher`] / [`socket`]: inbound entry points

pub mod category;
pub mod context;
pub mod dispatch;
pub mod dispatcher;
pub mod factory;
pub mod handler;
pub mod index;
pub mod listener;
pub mod registry;
pub mod service;
pub mod socket;
pub mod source;

pub use category::{Flavor, HandlerCategory};
pub use context::{
    RequestContext, RequestContextFactory, RequestScope, RequestState, ScopedContextFactory,
    Slot, SlotKey, WeakRequestContext,
};
pub use dispatcher::Dispatcher;
pub use factory::{DefaultHandlerFactory, HandlerFactory, HandlerTable, Handling, Replacement};
pub use handler::*;
pub use index::{HandlerIndex, Resolved, SplitIndex};
pub use listener::{CompositeRequestListener, LoggingRequestListener, RequestListener};
pub use registry::{HandlerRegistry, Registration, SplitRegistry};
pub use service::{LazyService, ServiceConfiguration, ServiceProvider};
pub use socket::DefaultSocketModeClient;
pub use source::HandlerSource;
