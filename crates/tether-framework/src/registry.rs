//! Configuration-time handler registries.
//!
//! A registry is an append-only list of [`Registration`]s for one category
//! and flavor. At build time it is folded into an immutable
//! [`HandlerIndex`]: keyed and typed entries collapse to one source per slot
//! (the last registration wins) and generic entries keep their order.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::category::{Flavor, HandlerCategory};
use crate::index::{HandlerIndex, SplitIndex};
use crate::source::HandlerSource;

/// One registered handler and how it is matched.
pub enum Registration<H: ?Sized> {
    /// Receives every payload of the category.
    Generic(HandlerSource<H>),
    /// Receives payloads whose subtype tag equals the given one.
    Typed(&'static str, HandlerSource<H>),
    /// Receives payloads whose routing key equals the given one.
    Keyed(String, HandlerSource<H>),
}

impl<H: ?Sized> fmt::Debug for Registration<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(_) => f.write_str("Generic"),
            Self::Typed(tag, _) => f.debug_tuple("Typed").field(tag).finish(),
            Self::Keyed(key, _) => f.debug_tuple("Keyed").field(key).finish(),
        }
    }
}

/// Ordered registrations for one (category, flavor) pair.
pub struct HandlerRegistry<H: ?Sized> {
    registrations: Vec<Registration<H>>,
}

impl<H: ?Sized + Send + Sync + 'static> HandlerRegistry<H> {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }

    pub fn register(&mut self, registration: Registration<H>) -> &mut Self {
        self.registrations.push(registration);
        self
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Folds the registrations into an index.
    pub fn build_index(self, category: HandlerCategory, flavor: Flavor) -> HandlerIndex<H> {
        let mut keyed = HashMap::new();
        let mut typed = HashMap::new();
        let mut generic = Vec::new();

        for registration in self.registrations {
            match registration {
                Registration::Generic(source) => generic.push(source),
                Registration::Typed(tag, source) => {
                    if typed.insert(tag, source).is_some() {
                        debug!(%category, %flavor, tag, "Typed handler replaced");
                    }
                }
                Registration::Keyed(key, source) => {
                    if keyed.contains_key(&key) {
                        debug!(%category, %flavor, key = %key, "Keyed handler replaced");
                    }
                    keyed.insert(key, source);
                }
            }
        }

        HandlerIndex::new(category, flavor, keyed, typed, generic)
    }
}

impl<H: ?Sized + Send + Sync + 'static> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.registrations).finish()
    }
}

/// Sync and async registries of a fire-and-forget category.
pub struct SplitRegistry<S: ?Sized, A: ?Sized> {
    pub sync: HandlerRegistry<S>,
    pub async_: HandlerRegistry<A>,
}

impl<S, A> SplitRegistry<S, A>
where
    S: ?Sized + Send + Sync + 'static,
    A: ?Sized + Send + Sync + 'static,
{
    pub fn build_index(self, category: HandlerCategory) -> SplitIndex<S, A> {
        SplitIndex {
            sync: self.sync.build_index(category, Flavor::Sync),
            async_: self.async_.build_index(category, Flavor::Async),
        }
    }
}

impl<S, A> Default for SplitRegistry<S, A>
where
    S: ?Sized + Send + Sync + 'static,
    A: ?Sized + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            sync: HandlerRegistry::new(),
            async_: HandlerRegistry::new(),
        }
    }
}

impl<S: ?Sized, A: ?Sized> fmt::Debug for SplitRegistry<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitRegistry")
            .field("sync", &self.sync)
            .field("async", &self.async_)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tether_core::Container;

    use crate::context::RequestContext;

    fn label(name: &'static str) -> HandlerSource<str> {
        HandlerSource::try_from_fn(move |_| Ok(Arc::from(name)))
    }

    fn context() -> RequestContext {
        RequestContext::new(Arc::new(Container::empty()))
    }

    #[test]
    fn last_keyed_registration_wins() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(Registration::Keyed("/deploy".into(), label("first")))
            .register(Registration::Keyed("/deploy".into(), label("second")))
            .register(Registration::Typed("button", label("a")))
            .register(Registration::Typed("button", label("b")));
        assert_eq!(registry.len(), 4);

        let index = registry.build_index(HandlerCategory::SlashCommands, Flavor::Async);
        let ctx = context();
        assert_eq!(&*index.source("/deploy").unwrap().create(&ctx).unwrap(), "second");
        assert_eq!(&*index.typed_source("button").unwrap().create(&ctx).unwrap(), "b");
        assert_eq!(index.keys().count(), 1);
    }

    #[test]
    fn generics_keep_registration_order() {
        let mut registry = HandlerRegistry::new();
        for name in ["one", "two", "three"] {
            registry.register(Registration::Generic(label(name)));
        }

        let index = registry.build_index(HandlerCategory::Events, Flavor::Sync);
        let resolved = index.resolve_generic(&context()).unwrap();
        let names: Vec<&str> = resolved.iter().map(|h| &**h).collect();
        assert_eq!(names, ["one", "two", "three"]);
    }
}
