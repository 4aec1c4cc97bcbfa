//! Immutable handler lookup built from a registry.
//!
//! An index answers "which handler for this key / subtype" and resolves the
//! answer through a [`RequestContext`], so every slot is instantiated once
//! per request:
//!
//! ```text
//! resolve_claimed(key, tag)
//!   ├── key registered?  → Keyed(flavor, key) slot
//!   └── else tag known?  → Typed(flavor, tag) slot
//! resolve_generic()      → Generic(flavor) slot, the whole ordered list
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use tether_core::ResolveResult;

use crate::category::{Flavor, HandlerCategory};
use crate::context::{RequestContext, Slot, SlotKey};
use crate::source::HandlerSource;

/// Lookup for one (category, flavor) pair.
pub struct HandlerIndex<H: ?Sized> {
    category: HandlerCategory,
    flavor: Flavor,
    keyed: HashMap<String, HandlerSource<H>>,
    typed: HashMap<&'static str, HandlerSource<H>>,
    generic: Vec<HandlerSource<H>>,
}

impl<H: ?Sized + Send + Sync + 'static> HandlerIndex<H> {
    pub(crate) fn new(
        category: HandlerCategory,
        flavor: Flavor,
        keyed: HashMap<String, HandlerSource<H>>,
        typed: HashMap<&'static str, HandlerSource<H>>,
        generic: Vec<HandlerSource<H>>,
    ) -> Self {
        Self {
            category,
            flavor,
            keyed,
            typed,
            generic,
        }
    }

    /// An index with no registrations.
    pub fn empty(category: HandlerCategory, flavor: Flavor) -> Self {
        Self::new(category, flavor, HashMap::new(), HashMap::new(), Vec::new())
    }

    pub fn category(&self) -> HandlerCategory {
        self.category
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// The source registered for `key`, if any.
    pub fn source(&self, key: &str) -> Option<&HandlerSource<H>> {
        self.keyed.get(key)
    }

    /// The source registered for subtype `tag`, if any.
    pub fn typed_source(&self, tag: &str) -> Option<&HandlerSource<H>> {
        self.typed.get(tag)
    }

    /// Registered routing keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keyed.keys().map(String::as_str)
    }

    /// Registered subtype tags, in no particular order.
    pub fn subtypes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.typed.keys().copied()
    }

    pub fn generic_len(&self) -> usize {
        self.generic.len()
    }

    /// Resolves the handler registered for `key` in this request.
    pub fn resolve_keyed(&self, ctx: &RequestContext, key: &str) -> ResolveResult<Option<Arc<H>>> {
        let Some(source) = self.keyed.get(key) else {
            return Ok(None);
        };
        let slot = SlotKey::new(self.category, Slot::Keyed(self.flavor, key.to_owned()));
        ctx.get_or_create(slot, || source.create(ctx)).map(Some)
    }

    /// Resolves the handler registered for subtype `tag` in this request.
    pub fn resolve_typed(&self, ctx: &RequestContext, tag: &str) -> ResolveResult<Option<Arc<H>>> {
        let Some((&tag, source)) = self.typed.get_key_value(tag) else {
            return Ok(None);
        };
        let slot = SlotKey::new(self.category, Slot::Typed(self.flavor, tag));
        ctx.get_or_create(slot, || source.create(ctx)).map(Some)
    }

    /// Resolves the keyed handler for `key`, or the typed one for `tag`
    /// when no handler is registered under `key`.
    pub fn resolve_claimed(
        &self,
        ctx: &RequestContext,
        key: Option<&str>,
        tag: Option<&str>,
    ) -> ResolveResult<Option<Arc<H>>> {
        if let Some(key) = key
            && let Some(handler) = self.resolve_keyed(ctx, key)?
        {
            return Ok(Some(handler));
        }
        match tag {
            Some(tag) => self.resolve_typed(ctx, tag),
            None => Ok(None),
        }
    }

    /// Resolves every generic handler, in registration order.
    ///
    /// The list is built once per request; an empty list does not occupy a
    /// slot.
    pub fn resolve_generic(&self, ctx: &RequestContext) -> ResolveResult<Arc<[Arc<H>]>> {
        if self.generic.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }
        let slot = SlotKey::new(self.category, Slot::Generic(self.flavor));
        ctx.get_or_create(slot, || {
            trace!(
                category = %self.category,
                flavor = %self.flavor,
                count = self.generic.len(),
                "Resolving generic handlers"
            );
            self.generic
                .iter()
                .map(|source| source.create(ctx))
                .collect::<ResolveResult<Vec<_>>>()
                .map(Arc::from)
        })
    }
}

impl<H: ?Sized> fmt::Debug for HandlerIndex<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerIndex")
            .field("category", &self.category)
            .field("flavor", &self.flavor)
            .field("keys", &self.keyed.keys().collect::<Vec<_>>())
            .field("subtypes", &self.typed.keys().collect::<Vec<_>>())
            .field("generic", &self.generic.len())
            .finish()
    }
}

// =============================================================================
// SplitIndex
// =============================================================================

/// Handlers selected for one payload of a category with sync and async
/// registries.
pub struct Resolved<S: ?Sized, A: ?Sized> {
    pub sync: Option<Arc<S>>,
    pub async_: Option<Arc<A>>,
    pub generic_sync: Arc<[Arc<S>]>,
    pub generic_async: Arc<[Arc<A>]>,
}

impl<S: ?Sized, A: ?Sized> Resolved<S, A> {
    /// Number of handlers that will be invoked.
    pub fn len(&self) -> usize {
        usize::from(self.sync.is_some())
            + usize::from(self.async_.is_some())
            + self.generic_sync.len()
            + self.generic_async.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sync and async indexes of one category.
pub struct SplitIndex<S: ?Sized, A: ?Sized> {
    pub sync: HandlerIndex<S>,
    pub async_: HandlerIndex<A>,
}

impl<S, A> SplitIndex<S, A>
where
    S: ?Sized + Send + Sync + 'static,
    A: ?Sized + Send + Sync + 'static,
{
    pub fn empty(category: HandlerCategory) -> Self {
        Self {
            sync: HandlerIndex::empty(category, Flavor::Sync),
            async_: HandlerIndex::empty(category, Flavor::Async),
        }
    }

    /// Selects the handlers for a payload.
    ///
    /// A key registered in either flavor claims the payload: typed handlers
    /// of both flavors are then skipped.
    pub fn resolve(
        &self,
        ctx: &RequestContext,
        key: Option<&str>,
        tag: Option<&str>,
    ) -> ResolveResult<Resolved<S, A>> {
        let claimed = key.filter(|key| {
            self.sync.source(key).is_some() || self.async_.source(key).is_some()
        });

        let (sync, async_) = match (claimed, tag) {
            (Some(key), _) => (
                self.sync.resolve_keyed(ctx, key)?,
                self.async_.resolve_keyed(ctx, key)?,
            ),
            (None, Some(tag)) => (
                self.sync.resolve_typed(ctx, tag)?,
                self.async_.resolve_typed(ctx, tag)?,
            ),
            (None, None) => (None, None),
        };

        Ok(Resolved {
            sync,
            async_,
            generic_sync: self.sync.resolve_generic(ctx)?,
            generic_async: self.async_.resolve_generic(ctx)?,
        })
    }
}

impl<S: ?Sized, A: ?Sized> fmt::Debug for SplitIndex<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitIndex")
            .field("sync", &self.sync)
            .field("async", &self.async_)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tether_core::{Container, ResolveError};

    use crate::registry::{HandlerRegistry, Registration, SplitRegistry};

    fn context() -> RequestContext {
        RequestContext::new(Arc::new(Container::empty()))
    }

    fn counted(name: &'static str, calls: &Arc<AtomicUsize>) -> HandlerSource<str> {
        let calls = calls.clone();
        HandlerSource::try_from_fn(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::from(name))
        })
    }

    #[test]
    fn keyed_slot_is_per_request_singleton() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(Registration::Keyed("cb".into(), counted("h", &calls)));
        let index = registry.build_index(HandlerCategory::ViewSubmissions, Flavor::Async);

        let ctx = context();
        let a = index.resolve_keyed(&ctx, "cb").unwrap().unwrap();
        let b = index.resolve_keyed(&ctx, "cb").unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = index.resolve_keyed(&context(), "cb").unwrap().unwrap();
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(index.resolve_keyed(&ctx, "missing").unwrap().is_none());
    }

    #[test]
    fn claimed_prefers_key_over_tag() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry
            .register(Registration::Keyed("ok".into(), counted("keyed", &calls)))
            .register(Registration::Typed("button", counted("typed", &calls)));
        let index = registry.build_index(HandlerCategory::BlockActions, Flavor::Sync);
        let ctx = context();

        let claimed = index
            .resolve_claimed(&ctx, Some("ok"), Some("button"))
            .unwrap();
        assert_eq!(claimed.as_deref(), Some("keyed"));

        let fallback = index
            .resolve_claimed(&ctx, Some("other"), Some("button"))
            .unwrap();
        assert_eq!(fallback.as_deref(), Some("typed"));

        assert!(index.resolve_claimed(&ctx, None, None).unwrap().is_none());
    }

    #[test]
    fn generic_list_is_resolved_once_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry
            .register(Registration::Generic(counted("a", &calls)))
            .register(Registration::Generic(counted("b", &calls)));
        let index = registry.build_index(HandlerCategory::Events, Flavor::Sync);
        assert_eq!(index.generic_len(), 2);

        let ctx = context();
        let first = index.resolve_generic(&ctx).unwrap();
        let second = index.resolve_generic(&ctx).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_generic_list_takes_no_slot() {
        let index = HandlerIndex::<str>::empty(HandlerCategory::Events, Flavor::Sync);
        let ctx = context();
        assert!(index.resolve_generic(&ctx).unwrap().is_empty());
        assert_eq!(ctx.slot_count(), 0);
    }

    #[test]
    fn failing_source_surfaces_resolve_error() {
        let mut registry = HandlerRegistry::<str>::new();
        registry.register(Registration::Generic(HandlerSource::try_from_fn(|_| {
            Err(ResolveError::factory("database down"))
        })));
        let index = registry.build_index(HandlerCategory::Events, Flavor::Sync);

        let err = index.resolve_generic(&context()).unwrap_err();
        assert!(matches!(err, ResolveError::Factory(_)));
    }

    #[test]
    fn key_in_either_flavor_claims_payload() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = SplitRegistry::<str, str>::default();
        registry
            .async_
            .register(Registration::Keyed("ok".into(), counted("async keyed", &calls)));
        registry
            .sync
            .register(Registration::Typed("button", counted("sync typed", &calls)));
        registry
            .sync
            .register(Registration::Generic(counted("sync generic", &calls)));
        let index = registry.build_index(HandlerCategory::BlockActions);
        let ctx = context();

        let claimed = index.resolve(&ctx, Some("ok"), Some("button")).unwrap();
        assert!(claimed.sync.is_none());
        assert_eq!(claimed.async_.as_deref(), Some("async keyed"));
        assert_eq!(claimed.len(), 2);

        let typed = index.resolve(&ctx, Some("other"), Some("button")).unwrap();
        assert_eq!(typed.sync.as_deref(), Some("sync typed"));
        assert!(typed.async_.is_none());
        assert_eq!(typed.generic_sync.len(), 1);
    }
}
