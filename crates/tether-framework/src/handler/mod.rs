//! Handler contracts and the glue that erases them.
//!
//! - [`traits`]: one sync/async trait pair per payload category
//! - [`upcast`]: `Arc<T>` to `Arc<dyn Trait>` conversion used by sources
//! - [`adapters`]: typed and sync handlers wrapped into a category's trait

pub mod adapters;
pub mod traits;
pub mod upcast;

pub use traits::*;
pub use upcast::Upcast;
