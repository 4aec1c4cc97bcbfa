//! Handler sources: how a registration produces its instance.

use std::fmt;
use std::sync::Arc;

use tether_core::ResolveResult;

use crate::context::RequestContext;
use crate::handler::Upcast;

type SourceFn<H> = dyn Fn(&RequestContext) -> ResolveResult<Arc<H>> + Send + Sync;

/// Produces handler instances of type `H` for a request.
///
/// A source is called at most once per cache slot and request; whether the
/// instances it returns are shared across requests is up to the source.
pub struct HandlerSource<H: ?Sized> {
    create: Arc<SourceFn<H>>,
}

impl<H: ?Sized + 'static> HandlerSource<H> {
    /// Wraps a fallible factory receiving the request context.
    pub fn try_from_fn<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> ResolveResult<Arc<H>> + Send + Sync + 'static,
    {
        Self { create: Arc::new(f) }
    }

    /// Builds a fresh handler from the request context.
    pub fn from_fn<T, F>(f: F) -> Self
    where
        T: Upcast<H>,
        F: Fn(&RequestContext) -> T + Send + Sync + 'static,
    {
        Self::try_from_fn(move |ctx| Ok(Arc::new(f(ctx)).upcast()))
    }

    /// Hands out the same instance to every request.
    pub fn shared(handler: Arc<H>) -> Self
    where
        H: Send + Sync,
    {
        Self::try_from_fn(move |_| Ok(Arc::clone(&handler)))
    }

    /// Hands out `handler` to every request.
    pub fn instance<T: Upcast<H>>(handler: T) -> Self
    where
        H: Send + Sync,
    {
        Self::shared(Arc::new(handler).upcast())
    }

    /// Resolves `T` through the request-scoped resolver.
    pub fn resolved<T: Upcast<H>>() -> Self {
        Self::try_from_fn(|ctx| Ok(ctx.resolve::<T>()?.upcast()))
    }

    /// Builds `T::default()` for every request.
    pub fn from_default<T: Upcast<H> + Default>() -> Self {
        Self::from_fn(|_| T::default())
    }

    /// Adapts the produced handler to another trait object.
    pub fn map<G, F>(self, f: F) -> HandlerSource<G>
    where
        G: ?Sized + 'static,
        F: Fn(Arc<H>) -> Arc<G> + Send + Sync + 'static,
    {
        let create = self.create;
        HandlerSource::try_from_fn(move |ctx| create(ctx).map(&f))
    }

    /// Produces an instance for `ctx`. Does not consult the context cache.
    pub fn create(&self, ctx: &RequestContext) -> ResolveResult<Arc<H>> {
        (self.create)(ctx)
    }
}

impl<H: ?Sized> Clone for HandlerSource<H> {
    fn clone(&self) -> Self {
        Self {
            create: Arc::clone(&self.create),
        }
    }
}

impl<H: ?Sized> fmt::Debug for HandlerSource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tether_core::{BoxError, Container, EventCallback, ResolveError, Resolver};

    use crate::handler::EventHandler;

    #[derive(Default)]
    struct Noop;

    #[async_trait]
    impl EventHandler for Noop {
        async fn handle(&self, _event: &EventCallback) -> Result<(), BoxError> {
            Ok(())
        }
    }

    fn context() -> RequestContext {
        RequestContext::new(Arc::new(Container::empty()))
    }

    #[test]
    fn instance_is_shared_across_requests() {
        let source = HandlerSource::<dyn EventHandler>::instance(Noop);
        let a = source.create(&context()).unwrap();
        let b = source.create(&context()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn from_fn_builds_on_every_call() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let source = HandlerSource::<dyn EventHandler>::from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Noop
        });

        let ctx = context();
        let a = source.create(&ctx).unwrap();
        let b = source.create(&ctx).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resolved_uses_request_scope() {
        let container = Container::builder().with_scoped(|_| Noop).build();
        let source = HandlerSource::<dyn EventHandler>::resolved::<Noop>();

        let ctx = RequestContext::new(container.create_scope());
        let a = source.create(&ctx).unwrap();
        let b = source.create(&ctx).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        assert!(matches!(
            source.create(&context()),
            Err(ResolveError::NotRegistered { .. })
        ));
    }

    #[test]
    fn default_source_builds_fresh_instances() {
        let source = HandlerSource::<dyn EventHandler>::from_default::<Noop>();
        let ctx = context();
        assert!(!Arc::ptr_eq(
            &source.create(&ctx).unwrap(),
            &source.create(&ctx).unwrap()
        ));
    }
}
