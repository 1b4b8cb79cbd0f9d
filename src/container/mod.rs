//! The container tree.
//!
//! A [`Container`] maps keys to [`Resolver`]s. Lookups walk from the requesting
//! container up through its ancestors; the first level holding a binding answers.
//! When nobody does, constructible keys are registered just-in-time.

pub(crate) mod jit;
mod register;

pub use register::Registrant;

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, trace};

use crate::catalog::TypeCatalog;
use crate::class::Class;
use crate::config::ContainerConfig;
use crate::error::DiResult;
use crate::factory::{Factory, Transformer};
use crate::internal::{downcast, downcast_dyn, FastMap};
use crate::key::Key;
use crate::resolver::Resolver;
use crate::traits::Injectable;
use crate::AnyArc;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique container identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    fn next() -> Self {
        ContainerId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the container tree.
///
/// `Container` is a cheap `Clone` handle; clones share the same bindings. A child
/// sees every binding of its ancestors, ancestors never see the child's.
///
/// # Thread Safety
///
/// All operations take `&self` and containers are `Send + Sync`. Binding maps are
/// guarded by read-write locks that are never held while user code runs. A singleton
/// is constructed exactly once; concurrent requests for it wait for the first one.
/// Just-in-time registration of a key runs once per handler, however many threads
/// miss the binding at the same time.
///
/// # Examples
///
/// ```
/// use arbor_di::{Args, Container, DiResult, Injectable, Key, Registrant};
///
/// struct RequestId(u32);
///
/// impl Injectable for RequestId {
///     fn construct(_args: Args) -> DiResult<Self> {
///         Ok(RequestId(7))
///     }
/// }
///
/// let root = Container::new();
/// let request = root.create_child();
/// request.register([Registrant::class::<RequestId>()]).unwrap();
///
/// assert_eq!(request.get::<RequestId>().unwrap().0, 7);
/// assert!(!root.has(&Key::class::<RequestId>(), true).unwrap());
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    id: ContainerId,
    parent: Option<Container>,
    root: Option<Container>,
    config: ContainerConfig,
    catalog: Arc<TypeCatalog>,
    resolvers: RwLock<FastMap<Key, Arc<Resolver>>>,
    resources: RwLock<FastMap<Arc<str>, Arc<Resolver>>>,
    disposables: Mutex<Vec<Arc<Resolver>>>,
    jit_locks: Mutex<FastMap<Key, Arc<ReentrantMutex<()>>>>,
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        for resolver in self.resolvers.get_mut().values() {
            resolver.forget(self.id);
        }
    }
}

impl Container {
    /// Creates a root container with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Creates a root container.
    pub fn with_config(config: ContainerConfig) -> Self {
        let catalog = config.catalog().cloned().unwrap_or_else(TypeCatalog::shared);
        Self::build(None, None, config, catalog, FastMap::default())
    }

    fn build(
        parent: Option<Container>,
        root: Option<Container>,
        config: ContainerConfig,
        catalog: Arc<TypeCatalog>,
        resources: FastMap<Arc<str>, Arc<Resolver>>,
    ) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                id: ContainerId::next(),
                parent,
                root,
                config,
                catalog,
                resolvers: RwLock::new(FastMap::default()),
                resources: RwLock::new(resources),
                disposables: Mutex::new(Vec::new()),
                jit_locks: Mutex::new(FastMap::default()),
            }),
        }
    }

    /// Creates a child inheriting this container's configuration.
    pub fn create_child(&self) -> Container {
        self.create_child_with(self.inner.config.clone())
    }

    /// Creates a child with its own configuration.
    ///
    /// The child starts with an empty binding map and a snapshot of the root's
    /// resource index; resources registered on the root later are still found through
    /// [`find_resource`](Self::find_resource).
    pub fn create_child_with(&self, config: ContainerConfig) -> Container {
        let root = self.root().clone();
        let resources = root.inner.resources.read().clone();
        let catalog = Arc::clone(&root.inner.catalog);
        let child = Self::build(Some(self.clone()), Some(root), config, catalog, resources);
        debug!(parent = %self.id(), child = %child.id(), "created child container");
        child
    }

    pub fn id(&self) -> ContainerId {
        self.inner.id
    }

    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    pub fn root(&self) -> &Container {
        self.inner.root.as_ref().unwrap_or(self)
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.inner.catalog
    }

    /// Resolves `key` to its erased value.
    ///
    /// Self-resolving keys are handed this container as both handler and requestor.
    /// Otherwise the nearest level with a binding resolves it, with that level as
    /// handler and this container as requestor. With no binding anywhere the key is
    /// registered just-in-time, or the call fails with a configuration error.
    pub fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        let observers = self.inner.config.observers();
        if !observers.has_observers() {
            return self.resolve_walk(key);
        }

        let start = Instant::now();
        observers.resolving(key);
        let result = self.resolve_walk(key);
        match &result {
            Ok(_) => observers.resolved(key, start.elapsed()),
            Err(error) => observers.failed(key, error),
        }
        result
    }

    fn resolve_walk(&self, key: &Key) -> DiResult<AnyArc> {
        key.validate()?;
        if let Key::Resolver(resolver) = key {
            return resolver.resolve(self, self);
        }

        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(resolver) = container.local_resolver(key) {
                return resolver.resolve(container, self);
            }
            current = container.parent();
        }

        let handler = self.jit_handler(key);
        let resolver = handler.jit_register(key, self.config().resolver_policy())?;
        resolver.resolve(handler, self)
    }

    /// Every value bound to `key` at the nearest level holding a binding, in
    /// registration order. Bindings further up are not included; see
    /// [`resolve_all_in_ancestors`](Self::resolve_all_in_ancestors).
    pub fn resolve_all_any(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        key.validate()?;
        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(resolver) = container.local_resolver(key) {
                return resolver.resolve_all(container, self);
            }
            current = container.parent();
        }
        Ok(Vec::new())
    }

    /// Every value bound to `key` at every level, nearest level first.
    pub fn resolve_all_in_ancestors(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        key.validate()?;
        let mut values = Vec::new();
        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(resolver) = container.local_resolver(key) {
                values.extend(resolver.resolve_all(container, self)?);
            }
            current = container.parent();
        }
        Ok(values)
    }

    /// Whether `key` is bound here, or on any ancestor when `search_ancestors` is set.
    /// Resource keys also match the container's resource index.
    pub fn has(&self, key: &Key, search_ancestors: bool) -> DiResult<bool> {
        key.validate()?;
        let mut current = Some(self);
        while let Some(container) = current {
            if container.has_local(key) {
                return Ok(true);
            }
            if !search_ancestors {
                break;
            }
            current = container.parent();
        }
        Ok(false)
    }

    fn has_local(&self, key: &Key) -> bool {
        if self.inner.resolvers.read().contains_key(key) {
            return true;
        }
        match key {
            Key::Name(name) if key.is_resource() => self.inner.resources.read().contains_key(name),
            _ => false,
        }
    }

    /// The resolver answering for `key` from this container, optionally registering
    /// one just-in-time.
    pub fn get_resolver(&self, key: &Key, auto_register: bool) -> DiResult<Option<Arc<Resolver>>> {
        key.validate()?;
        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(resolver) = container.local_resolver(key) {
                return Ok(Some(resolver));
            }
            current = container.parent();
        }

        if auto_register {
            self.jit_handler(key)
                .jit_register(key, self.config().resolver_policy())
                .map(Some)
        } else {
            Ok(None)
        }
    }

    /// Binds `resolver` to `key` in this container.
    ///
    /// A second binding for the same key turns the binding into a multi-binding;
    /// further bindings append to it. Disposable resolvers are released by
    /// [`dispose_resolvers`](Self::dispose_resolvers).
    pub fn register_resolver(
        &self,
        key: Key,
        resolver: Arc<Resolver>,
        disposable: bool,
    ) -> DiResult<Arc<Resolver>> {
        key.validate()?;
        {
            let mut resolvers = self.inner.resolvers.write();
            match resolvers.get(&key).cloned() {
                None => {
                    if let Key::Name(name) = &key {
                        if key.is_resource() {
                            self.inner
                                .resources
                                .write()
                                .insert(Arc::clone(name), Arc::clone(&resolver));
                        }
                    }
                    trace!(key = %key, container = %self.id(), "registered resolver");
                    resolvers.insert(key, Arc::clone(&resolver));
                }
                Some(existing) => {
                    if !existing.push(Arc::clone(&resolver)) {
                        trace!(key = %key, container = %self.id(), "promoted binding to multi-binding");
                        let multi = Resolver::multi(key.clone(), vec![existing, Arc::clone(&resolver)]);
                        resolvers.insert(key, Arc::new(multi));
                    }
                }
            }
        }

        if disposable {
            let mut disposables = self.inner.disposables.lock();
            if !disposables.iter().any(|tracked| Arc::ptr_eq(tracked, &resolver)) {
                disposables.push(Arc::clone(&resolver));
            }
        }
        Ok(resolver)
    }

    /// Appends a transformer to the factory behind the local binding of `key`.
    ///
    /// Returns `false` when there is no local binding or the binding has no factory.
    pub fn register_transformer(&self, key: &Key, transformer: Transformer) -> bool {
        let Some(resolver) = self.local_resolver(key) else {
            return false;
        };
        match resolver.get_factory(self) {
            Some(factory) => {
                factory.register_transformer(transformer);
                true
            }
            None => false,
        }
    }

    /// Typed form of [`register_transformer`](Self::register_transformer) for `T`'s own key.
    pub fn register_transformer_for<T, F>(&self, transform: F) -> bool
    where
        T: Injectable,
        F: Fn(Arc<T>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        let transformer: Transformer = Arc::new(move |value: AnyArc| {
            let typed = downcast::<T>(value)?;
            Ok(transform(typed)? as AnyArc)
        });
        self.register_transformer(&Key::class::<T>(), transformer)
    }

    /// The shared factory for `class`.
    pub fn get_factory(&self, class: &Class) -> DiResult<Arc<Factory>> {
        self.inner.catalog.factory(class)
    }

    /// Builds a fresh `T` through its factory without registering anything, appending
    /// `dynamic` after the resolved dependencies.
    pub fn invoke<T: Injectable>(&self, dynamic: Vec<AnyArc>) -> DiResult<Arc<T>> {
        downcast(self.invoke_class(&Class::of::<T>(), dynamic)?)
    }

    pub fn invoke_class(&self, class: &Class, dynamic: Vec<AnyArc>) -> DiResult<AnyArc> {
        self.get_factory(class)?.construct(self, dynamic)
    }

    /// Disposes tracked resolvers, most recently registered first.
    pub fn dispose_resolvers(&self) {
        let disposables = std::mem::take(&mut *self.inner.disposables.lock());
        if !disposables.is_empty() {
            debug!(container = %self.id(), count = disposables.len(), "disposing resolvers");
        }
        for resolver in disposables.iter().rev() {
            resolver.dispose();
        }
    }

    /// Removes the local binding of `key`, disposing it when it was tracked.
    pub fn deregister(&self, key: &Key) -> Option<Arc<Resolver>> {
        let resolver = self.inner.resolvers.write().remove(key)?;
        if let Key::Name(name) = key {
            if key.is_resource() {
                self.inner.resources.write().remove(name);
            }
        }

        let tracked = {
            let mut disposables = self.inner.disposables.lock();
            let before = disposables.len();
            disposables.retain(|tracked| !Arc::ptr_eq(tracked, &resolver));
            disposables.len() != before
        };
        if tracked {
            resolver.dispose();
        }
        debug!(key = %key, container = %self.id(), "deregistered");
        Some(resolver)
    }

    /// Looks up a resource resolver by its `kind:name` key, first in this container's
    /// index, then in the root's live index.
    pub fn find_resource(&self, name: &str) -> Option<Arc<Resolver>> {
        if let Some(resolver) = self.inner.resources.read().get(name) {
            return Some(Arc::clone(resolver));
        }
        let root = self.root();
        if root.id() == self.id() {
            return None;
        }
        root.inner.resources.read().get(name).cloned()
    }

    /// Disposes tracked resolvers and drops every local binding, along with anything
    /// their cached callbacks remembered for this container.
    pub fn dispose(&self) {
        self.dispose_resolvers();
        let bindings = std::mem::take(&mut *self.inner.resolvers.write());
        for resolver in bindings.values() {
            resolver.forget(self.id());
        }
        self.inner.resources.write().clear();
        self.inner.jit_locks.lock().clear();
        debug!(container = %self.id(), "disposed container");
    }

    /// Resolves `T`'s own key.
    pub fn get<T: Injectable>(&self) -> DiResult<Arc<T>> {
        downcast(self.resolve_any(&Key::class::<T>())?)
    }

    /// Resolves `key` and downcasts the value to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &Key) -> DiResult<Arc<T>> {
        downcast(self.resolve_any(key)?)
    }

    /// Resolves `key` to a value stored as `Arc<T>`, the layout used for trait objects.
    pub fn get_dyn<T: ?Sized + Send + Sync + 'static>(&self, key: &Key) -> DiResult<Arc<T>> {
        downcast_dyn(self.resolve_any(key)?)
    }

    pub fn get_all_as<T: Any + Send + Sync>(&self, key: &Key) -> DiResult<Vec<Arc<T>>> {
        self.resolve_all_any(key)?.into_iter().map(downcast::<T>).collect()
    }

    pub fn get_all_dyn<T: ?Sized + Send + Sync + 'static>(&self, key: &Key) -> DiResult<Vec<Arc<T>>> {
        self.resolve_all_any(key)?.into_iter().map(downcast_dyn::<T>).collect()
    }

    pub(crate) fn local_resolver(&self, key: &Key) -> Option<Arc<Resolver>> {
        self.inner.resolvers.read().get(key).cloned()
    }

    /// Stores `resolver` unless a binding appeared in the meantime; returns the winner.
    pub(crate) fn store_resolver(&self, key: Key, resolver: Arc<Resolver>) -> Arc<Resolver> {
        let mut resolvers = self.inner.resolvers.write();
        Arc::clone(resolvers.entry(key).or_insert(resolver))
    }

    pub(crate) fn local_bindings(&self) -> Vec<(Key, Arc<Resolver>)> {
        self.inner
            .resolvers
            .read()
            .iter()
            .map(|(key, resolver)| (key.clone(), Arc::clone(resolver)))
            .collect()
    }

    pub(crate) fn is_disposable(&self, resolver: &Arc<Resolver>) -> bool {
        self.inner
            .disposables
            .lock()
            .iter()
            .any(|tracked| Arc::ptr_eq(tracked, resolver))
    }

    /// Serializes just-in-time registration of `key` on this container. Re-entrant, so
    /// a registry may register and resolve through the same container.
    pub(crate) fn jit_lock(&self, key: &Key) -> Arc<ReentrantMutex<()>> {
        let mut locks = self.inner.jit_locks.lock();
        Arc::clone(
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(ReentrantMutex::new(()))),
        )
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id())
            .field("parent", &self.parent().map(Container::id))
            .field("bindings", &self.inner.resolvers.read().len())
            .finish()
    }
}
