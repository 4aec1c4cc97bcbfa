//! Request-scoped handler cache and lifecycle.
//!
//! One [`RequestContext`] is created per inbound payload and dropped when
//! the payload has been handled. It guarantees that every handler slot is
//! instantiated at most once per request:
//!
//! ```text
//! SlotKey { category, slot }
//! ├── Replaced            category handler built by a replacement
//! ├── Category            category handler built by the default factory
//! ├── Keyed(flavor, key)  handler registered for a routing key
//! ├── Typed(flavor, tag)  handler registered for a payload subtype
//! └── Generic(flavor)     the ordered list of catch-all handlers
//! ```
//!
//! Values are stored as `Arc<dyn Any>` and downcast at the single lookup
//! site, [`RequestContext::get_or_create`].
//!
//! The context is owned by one in-flight request. Its maps sit behind
//! uncontended `parking_lot` mutexes only so that dispatch futures stay
//! `Send`; no lock is held while a factory runs, which keeps re-entrant
//! resolution (a replacement consulting its index) deadlock-free.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use tether_core::{AnyArc, ResolveError, ResolveResult, Resolver};

use crate::category::{Flavor, HandlerCategory};
use crate::listener::RequestListener;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Slot keys
// =============================================================================

/// The cache slot within one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Replaced,
    Category,
    Keyed(Flavor, String),
    Typed(Flavor, &'static str),
    Generic(Flavor),
}

/// Cache key of a [`RequestContext`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub category: HandlerCategory,
    pub slot: Slot,
}

impl SlotKey {
    pub fn new(category: HandlerCategory, slot: Slot) -> Self {
        Self { category, slot }
    }
}

// =============================================================================
// RequestContext
// =============================================================================

/// Lifecycle state of a [`RequestContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Created,
    Active,
    Ended,
}

struct Inner {
    id: u64,
    resolver: Arc<dyn Resolver>,
    state: Mutex<RequestState>,
    slots: Mutex<HashMap<SlotKey, AnyArc>>,
    items: Mutex<HashMap<TypeId, AnyArc>>,
}

/// Per-request handler cache and lifecycle scope.
///
/// Cloning yields another handle to the same request.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<Inner>,
}

impl RequestContext {
    /// Creates a context resolving through `resolver`, normally a fresh
    /// request scope of the application container.
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
                resolver,
                state: Mutex::new(RequestState::Created),
                slots: Mutex::new(HashMap::new()),
                items: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Process-unique, monotonically increasing request id.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn state(&self) -> RequestState {
        *self.inner.state.lock()
    }

    /// The request-scoped resolver.
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.inner.resolver
    }

    /// Resolves `T` from the request scope.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> ResolveResult<Arc<T>> {
        self.inner.resolver.resolve::<T>()
    }

    /// Returns the value cached under `key`, creating it with `create` on
    /// first use.
    ///
    /// `create` runs without any lock held. If it re-enters and fills the
    /// same slot first, that value wins and the late one is discarded.
    pub fn get_or_create<T, F>(&self, key: SlotKey, create: F) -> ResolveResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> ResolveResult<T>,
    {
        if let Some(existing) = self.inner.slots.lock().get(&key) {
            return downcast(existing);
        }

        trace!(request_id = self.id(), ?key, "Creating handler slot");
        let created: AnyArc = Arc::new(create()?);
        let stored = Arc::clone(self.inner.slots.lock().entry(key).or_insert(created));
        downcast(&stored)
    }

    /// Number of filled cache slots.
    pub fn slot_count(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Stores a request-scoped item, replacing any previous one of the same
    /// type.
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
        self.inner
            .items
            .lock()
            .insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Returns the request-scoped item of type `T`, if any.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let item = self.inner.items.lock().get(&TypeId::of::<T>()).cloned()?;
        item.downcast::<T>().ok()
    }

    /// Starts the request, notifying `listener`.
    ///
    /// Only the first call on a context has an effect; later calls return a
    /// scope that does nothing when ended.
    pub fn begin_request(&self, listener: Arc<dyn RequestListener>) -> RequestScope {
        {
            let mut state = self.inner.state.lock();
            if *state != RequestState::Created {
                return RequestScope {
                    ctx: self.clone(),
                    listener: None,
                };
            }
            *state = RequestState::Active;
        }

        listener.on_request_begin(self);
        RequestScope {
            ctx: self.clone(),
            listener: Some(listener),
        }
    }

    /// A handle that does not keep the context alive.
    pub fn downgrade(&self) -> WeakRequestContext {
        WeakRequestContext(Arc::downgrade(&self.inner))
    }

    /// Returns `true` if both handles refer to the same request.
    pub fn ptr_eq(&self, other: &RequestContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

fn downcast<T: Clone + 'static>(value: &AnyArc) -> ResolveResult<T> {
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or(ResolveError::TypeMismatch {
            type_name: type_name::<T>(),
        })
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("slots", &self.slot_count())
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to a [`RequestContext`].
///
/// Category handlers are cached inside the context they resolve from, so
/// they hold this instead of a strong handle.
#[derive(Clone)]
pub struct WeakRequestContext(Weak<Inner>);

impl WeakRequestContext {
    pub fn upgrade(&self) -> ResolveResult<RequestContext> {
        self.0
            .upgrade()
            .map(|inner| RequestContext { inner })
            .ok_or(ResolveError::ContextDropped)
    }
}

impl fmt::Debug for WeakRequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakRequestContext").finish()
    }
}

// =============================================================================
// RequestScope
// =============================================================================

/// Guard returned by [`RequestContext::begin_request`].
///
/// Ending the scope, explicitly or by dropping it, moves the context to
/// [`RequestState::Ended`] and fires `on_request_end` exactly once.
#[must_use = "dropping the scope ends the request immediately"]
pub struct RequestScope {
    ctx: RequestContext,
    listener: Option<Arc<dyn RequestListener>>,
}

impl RequestScope {
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Ends the request. Idempotent.
    pub fn end(&mut self) {
        if let Some(listener) = self.listener.take() {
            *self.ctx.inner.state.lock() = RequestState::Ended;
            listener.on_request_end(&self.ctx);
        }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.end();
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("request_id", &self.ctx.id())
            .field("open", &self.listener.is_some())
            .finish()
    }
}

// =============================================================================
// RequestContextFactory
// =============================================================================

/// Creates the context for each inbound request.
pub trait RequestContextFactory: Send + Sync {
    fn create_request_context(&self) -> RequestContext;
}

/// Opens a fresh scope of the application resolver for every request.
pub struct ScopedContextFactory {
    resolver: Arc<dyn Resolver>,
}

impl ScopedContextFactory {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

impl RequestContextFactory for ScopedContextFactory {
    fn create_request_context(&self) -> RequestContext {
        RequestContext::new(self.resolver.create_scope())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tether_core::Container;

    fn context() -> RequestContext {
        RequestContext::new(Arc::new(Container::empty()))
    }

    fn keyed(key: &str) -> SlotKey {
        SlotKey::new(
            HandlerCategory::SlashCommands,
            Slot::Keyed(Flavor::Async, key.to_string()),
        )
    }

    #[derive(Default)]
    struct CountingListener {
        begins: AtomicUsize,
        ends: AtomicUsize,
    }

    impl RequestListener for CountingListener {
        fn on_request_begin(&self, _ctx: &RequestContext) {
            self.begins.fetch_add(1, Ordering::SeqCst);
        }

        fn on_request_end(&self, _ctx: &RequestContext) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn slot_is_created_once() {
        let ctx = context();
        let calls = AtomicUsize::new(0);
        let create = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(String::from("handler")))
        };

        let first = ctx.get_or_create(keyed("/a"), create).unwrap();
        let second = ctx
            .get_or_create(keyed("/a"), || Ok(Arc::new(String::from("other"))))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.slot_count(), 1);
    }

    #[test]
    fn replaced_and_category_slots_do_not_collide() {
        let ctx = context();
        let replaced = ctx
            .get_or_create(SlotKey::new(HandlerCategory::Events, Slot::Replaced), || {
                Ok(Arc::new(1u8))
            })
            .unwrap();
        let default = ctx
            .get_or_create(SlotKey::new(HandlerCategory::Events, Slot::Category), || {
                Ok(Arc::new(2u8))
            })
            .unwrap();

        assert_eq!((*replaced, *default), (1, 2));
    }

    #[test]
    fn factory_may_reenter_context() {
        let ctx = context();
        let outer = ctx
            .get_or_create(keyed("/outer"), || {
                let inner = ctx.get_or_create(keyed("/inner"), || Ok(Arc::new(7u32)))?;
                Ok(Arc::new(*inner + 1))
            })
            .unwrap();

        assert_eq!(*outer, 8);
        assert_eq!(ctx.slot_count(), 2);
    }

    #[test]
    fn factory_error_leaves_slot_empty() {
        let ctx = context();
        let err = ctx
            .get_or_create::<Arc<u8>, _>(keyed("/a"), || Err(ResolveError::factory("nope")))
            .unwrap_err();

        assert!(matches!(err, ResolveError::Factory(_)));
        assert_eq!(ctx.slot_count(), 0);
    }

    #[test]
    fn request_ids_increase() {
        let a = context();
        let b = context();
        assert!(b.id() > a.id());
    }

    #[test]
    fn scope_fires_end_exactly_once() {
        let ctx = context();
        let listener = Arc::new(CountingListener::default());

        let mut scope = ctx.begin_request(listener.clone());
        assert_eq!(ctx.state(), RequestState::Active);
        scope.end();
        scope.end();
        drop(scope);

        assert_eq!(ctx.state(), RequestState::Ended);
        assert_eq!(listener.begins.load(Ordering::SeqCst), 1);
        assert_eq!(listener.ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn beginning_twice_does_not_refire() {
        let ctx = context();
        let listener = Arc::new(CountingListener::default());

        let first = ctx.begin_request(listener.clone());
        let second = ctx.begin_request(listener.clone());
        drop(second);
        assert_eq!(ctx.state(), RequestState::Active);
        drop(first);

        let after_end = ctx.begin_request(listener.clone());
        drop(after_end);

        assert_eq!(listener.begins.load(Ordering::SeqCst), 1);
        assert_eq!(listener.ends.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.state(), RequestState::Ended);
    }

    #[test]
    fn items_are_typed() {
        let ctx = context();
        ctx.insert(42u32);
        ctx.insert(String::from("trace-id"));

        assert_eq!(*ctx.get::<u32>().unwrap(), 42);
        assert_eq!(ctx.get::<String>().unwrap().as_str(), "trace-id");
        assert!(ctx.get::<u64>().is_none());
    }

    #[test]
    fn weak_handle_fails_after_drop() {
        let ctx = context();
        let weak = ctx.downgrade();
        assert!(weak.upgrade().unwrap().ptr_eq(&ctx));

        drop(ctx);
        assert!(matches!(weak.upgrade(), Err(ResolveError::ContextDropped)));
    }

    #[test]
    fn scoped_factory_opens_new_scope_per_request() {
        let container = Container::builder()
            .with_scoped(|_| AtomicUsize::new(0))
            .build();
        let factory = ScopedContextFactory::new(Arc::new(container));

        let a = factory.create_request_context();
        let b = factory.create_request_context();
        let a1 = a.resolve::<AtomicUsize>().unwrap();
        let a2 = a.resolve::<AtomicUsize>().unwrap();
        let b1 = b.resolve::<AtomicUsize>().unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b1));
    }
}
