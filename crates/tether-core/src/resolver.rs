//! Dependency resolution capability.
//!
//! The framework needs exactly two things from a dependency-injection
//! container: resolve an instance by type, and open a child scope for one
//! request. [`Resolver`] captures that; any container can satisfy it.
//!
//! [`Container`] is the built-in implementation, supporting three lifetimes:
//!
//! | lifetime    | instances                                   |
//! |-------------|---------------------------------------------|
//! | `Singleton` | one per container, shared by every scope    |
//! | `Scoped`    | one per scope (one per request)             |
//! | `Transient` | a new one on every resolution               |

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ResolveError, ResolveResult};

/// A type-erased, shareable instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Resolve-by-type plus create-scope: the whole DI contract.
pub trait Resolver: Send + Sync {
    /// Resolves an instance of the type identified by `type_id`.
    ///
    /// The returned value must downcast to that type.
    fn resolve_any(&self, type_id: TypeId, type_name: &'static str) -> ResolveResult<AnyArc>;

    /// Opens a child scope sharing singletons with `self`.
    fn create_scope(&self) -> Arc<dyn Resolver>;
}

impl dyn Resolver + '_ {
    /// Resolves an instance of `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> ResolveResult<Arc<T>> {
        let name = type_name::<T>();
        self.resolve_any(TypeId::of::<T>(), name)?
            .downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch { type_name: name })
    }
}

// =============================================================================
// Container
// =============================================================================

/// How long a registered instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    Singleton,
    Scoped,
    Transient,
}

type FactoryFn = dyn Fn(&dyn Resolver) -> ResolveResult<AnyArc> + Send + Sync;

struct Entry {
    lifetime: Lifetime,
    factory: Arc<FactoryFn>,
    // Singleton instance; held locked while its factory runs.
    instance: Mutex<Option<AnyArc>>,
}

impl Entry {
    fn new(lifetime: Lifetime, factory: Arc<FactoryFn>) -> Self {
        Self {
            lifetime,
            factory,
            instance: Mutex::new(None),
        }
    }
}

struct Shared {
    entries: HashMap<TypeId, Entry>,
}

/// The built-in [`Resolver`].
///
/// A `Container` is itself a scope (the root one); [`Resolver::create_scope`]
/// returns siblings that share the registrations and singleton cache but
/// own their scoped instances.
pub struct Container {
    shared: Arc<Shared>,
    scoped: Mutex<HashMap<TypeId, AnyArc>>,
}

impl Container {
    /// Starts building a container.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// A container with no registrations.
    pub fn empty() -> Self {
        ContainerBuilder::default().build()
    }

    /// Returns `true` if `T` has a registration.
    pub fn contains<T: 'static>(&self) -> bool {
        self.shared.entries.contains_key(&TypeId::of::<T>())
    }

    fn cached(
        &self,
        cache: &Mutex<HashMap<TypeId, AnyArc>>,
        type_id: TypeId,
        factory: &FactoryFn,
    ) -> ResolveResult<AnyArc> {
        if let Some(existing) = cache.lock().get(&type_id) {
            return Ok(Arc::clone(existing));
        }
        // The lock is released while the factory runs so it can resolve
        // its own dependencies from this scope.
        let created = factory(self)?;
        Ok(Arc::clone(cache.lock().entry(type_id).or_insert(created)))
    }

    /// Runs a singleton factory at most once, even when several scopes
    /// resolve the type concurrently. A factory that fails leaves the slot
    /// empty so the next resolution retries.
    ///
    /// A singleton factory must not resolve its own type.
    fn shared_instance(&self, entry: &Entry) -> ResolveResult<AnyArc> {
        let mut instance = entry.instance.lock();
        if let Some(existing) = instance.as_ref() {
            return Ok(Arc::clone(existing));
        }
        let created = (entry.factory)(self)?;
        *instance = Some(Arc::clone(&created));
        Ok(created)
    }
}

impl Resolver for Container {
    fn resolve_any(&self, type_id: TypeId, type_name: &'static str) -> ResolveResult<AnyArc> {
        let entry = self
            .shared
            .entries
            .get(&type_id)
            .ok_or(ResolveError::NotRegistered { type_name })?;

        match entry.lifetime {
            Lifetime::Transient => (entry.factory)(self),
            Lifetime::Scoped => self.cached(&self.scoped, type_id, &*entry.factory),
            Lifetime::Singleton => self.shared_instance(entry),
        }
    }

    fn create_scope(&self) -> Arc<dyn Resolver> {
        Arc::new(Container {
            shared: Arc::clone(&self.shared),
            scoped: Mutex::new(HashMap::new()),
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.shared.entries.len())
            .field("scoped", &self.scoped.lock().len())
            .finish()
    }
}

/// Builder for [`Container`].
#[derive(Default)]
pub struct ContainerBuilder {
    entries: HashMap<TypeId, Entry>,
}

impl ContainerBuilder {
    /// Registers a fallible factory for `T` with the given lifetime.
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> ResolveResult<T> + Send + Sync + 'static,
    {
        let factory: Arc<FactoryFn> = Arc::new(move |resolver: &dyn Resolver| {
            factory(resolver).map(|value| Arc::new(value) as AnyArc)
        });
        self.entries
            .insert(TypeId::of::<T>(), Entry::new(lifetime, factory));
        self
    }

    /// Registers a process-wide instance of `T`.
    pub fn singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.register(Lifetime::Singleton, move |r| Ok(factory(r)))
    }

    /// Registers a per-scope instance of `T`.
    pub fn scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.register(Lifetime::Scoped, move |r| Ok(factory(r)))
    }

    /// Registers `T` to be created anew on every resolution.
    pub fn transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.register(Lifetime::Transient, move |r| Ok(factory(r)))
    }

    /// Registers an existing value as the singleton instance of `T`.
    pub fn instance<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        let value: AnyArc = Arc::new(value);
        let factory: Arc<FactoryFn> = Arc::new(move |_: &dyn Resolver| Ok(Arc::clone(&value)));
        self.entries
            .insert(TypeId::of::<T>(), Entry::new(Lifetime::Singleton, factory));
        self
    }

    /// Consuming variant of [`singleton`](Self::singleton).
    pub fn with_singleton<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.singleton(factory);
        self
    }

    /// Consuming variant of [`scoped`](Self::scoped).
    pub fn with_scoped<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.scoped(factory);
        self
    }

    /// Consuming variant of [`transient`](Self::transient).
    pub fn with_transient<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.transient(factory);
        self
    }

    /// Finishes the container.
    pub fn build(self) -> Container {
        Container {
            shared: Arc::new(Shared {
                entries: self.entries,
            }),
            scoped: Mutex::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counter(usize);

    fn numbered() -> impl Fn(&dyn Resolver) -> Counter + Send + Sync + 'static {
        let next = Arc::new(AtomicUsize::new(0));
        move |_| Counter(next.fetch_add(1, Ordering::SeqCst))
    }

    #[test]
    fn singleton_is_shared_across_scopes() {
        let root: Arc<dyn Resolver> = Arc::new(Container::builder().with_singleton(numbered()).build());
        let a = root.create_scope();
        let b = root.create_scope();

        let first = a.resolve::<Counter>().unwrap();
        let second = b.resolve::<Counter>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn scoped_is_per_scope() {
        let root = Container::builder().with_scoped(numbered()).build();
        let a = root.create_scope();
        let b = root.create_scope();

        let a1 = a.resolve::<Counter>().unwrap();
        let a2 = a.resolve::<Counter>().unwrap();
        let b1 = b.resolve::<Counter>().unwrap();
        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b1));
        assert_ne!(a1.0, b1.0);
    }

    #[test]
    fn transient_is_always_new() {
        let root: Arc<dyn Resolver> = Arc::new(Container::builder().with_transient(numbered()).build());
        let first = root.resolve::<Counter>().unwrap();
        let second = root.resolve::<Counter>().unwrap();
        assert_eq!((first.0, second.0), (0, 1));
    }

    #[test]
    fn factories_resolve_dependencies_from_scope() {
        struct Greeting(String);
        let root = Container::builder()
            .with_singleton(|_| "world".to_string())
            .with_scoped(|r| {
                let name = r.resolve::<String>().map(|s| s.as_str().to_owned());
                Greeting(format!("hello {}", name.unwrap_or_default()))
            })
            .build();

        let scope = root.create_scope();
        assert_eq!(scope.resolve::<Greeting>().unwrap().0, "hello world");
    }

    #[test]
    fn concurrent_first_resolution_builds_singleton_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&built);
        let root = Container::builder()
            .with_singleton(move |_| {
                std::thread::sleep(Duration::from_millis(20));
                Counter(counted.fetch_add(1, Ordering::SeqCst))
            })
            .build();
        let barrier = Barrier::new(4);

        let resolved: Vec<Arc<Counter>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let scope = root.create_scope();
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        scope.resolve::<Counter>().unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(resolved.iter().all(|c| Arc::ptr_eq(c, &resolved[0])));
    }

    #[test]
    fn singleton_factory_resolves_other_singletons() {
        struct Greeting(String);
        let root: Arc<dyn Resolver> = Arc::new(
            Container::builder()
                .with_singleton(|_| "world".to_string())
                .with_singleton(|r| {
                    let name = r.resolve::<String>().map(|s| s.as_str().to_owned());
                    Greeting(format!("hello {}", name.unwrap_or_default()))
                })
                .build(),
        );
        assert_eq!(root.resolve::<Greeting>().unwrap().0, "hello world");
    }

    #[test]
    fn missing_registration_names_type() {
        let root: Arc<dyn Resolver> = Arc::new(Container::empty());
        let Err(err) = root.resolve::<Counter>() else {
            panic!("Counter is not registered");
        };
        assert!(matches!(
            err,
            ResolveError::NotRegistered { type_name } if type_name.ends_with("Counter")
        ));
    }
}
