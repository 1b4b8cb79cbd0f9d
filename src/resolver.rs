//! Resolvers: how a bound key produces its value.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex, RwLock};
use tracing::trace;

use crate::class::Class;
use crate::container::{Container, ContainerId};
use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::internal::{cyclic_error, downcast, release_waiters, FastMap, WaitGuard};
use crate::key::Key;
use crate::traits::Dispose;
use crate::AnyArc;

/// Callback strategy body: `(handler, requestor, resolver)`.
///
/// `handler` is the container the binding was found in, `requestor` the container the
/// request started from. The resolver itself is passed so a wrapping callback can keep
/// state on it.
pub type Callback = Arc<dyn Fn(&Container, &Container, &Resolver) -> DiResult<AnyArc> + Send + Sync>;

type Disposer = Arc<dyn Fn(&AnyArc) + Send + Sync>;

/// Strategy tag of a resolver, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategyKind {
    Instance,
    Singleton,
    Transient,
    Callback,
    Alias,
    Multi,
}

enum SingletonState {
    Pending(Class),
    Resolving { class: Class, owner: ThreadId },
    Cached { value: AnyArc, class: Class },
}

impl SingletonState {
    fn class(&self) -> Class {
        match self {
            SingletonState::Pending(class) => *class,
            SingletonState::Resolving { class, .. } | SingletonState::Cached { class, .. } => *class,
        }
    }
}

struct SingletonCell {
    state: Mutex<SingletonState>,
    ready: Condvar,
}

impl SingletonCell {
    fn slot(&self) -> usize {
        self as *const SingletonCell as usize
    }
}

enum Strategy {
    Instance(AnyArc),
    Singleton(SingletonCell),
    Transient(Class),
    Callback(Callback),
    Alias(Key),
    Multi(RwLock<Vec<Arc<Resolver>>>),
}

/// A binding: the key it answers for plus the strategy producing its value.
///
/// # Strategies
///
/// - **Instance**: returns a fixed value
/// - **Singleton**: constructs through the handler's factory once, then caches the value
/// - **Transient**: constructs a fresh value on every resolve
/// - **Callback**: calls a user function with `(handler, requestor, resolver)`
/// - **Alias**: resolves another key from the requestor
/// - **Multi**: ordered list of resolvers accumulated by repeated registration
///
/// # Concurrency
///
/// A singleton is constructed at most once; other threads block until the first
/// construction finishes. No lock is held while it is built. A thread that would wait on
/// a singleton whose builder is itself waiting on that thread gets [`DiError::Cyclic`]
/// instead, as does re-entry on the building thread.
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, Key, Resolver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// let key = Key::name("port");
/// container
///     .register_resolver(key.clone(), Arc::new(Resolver::instance(key.clone(), Arc::new(80u16))), false)
///     .unwrap();
/// container
///     .register_resolver(key.clone(), Arc::new(Resolver::instance(key.clone(), Arc::new(443u16))), false)
///     .unwrap();
///
/// // A second registration promotes the binding to a multi-binding.
/// let ports = container.get_all_as::<u16>(&key).unwrap();
/// assert_eq!(ports.iter().map(|p| **p).collect::<Vec<_>>(), vec![80, 443]);
/// assert_eq!(*container.get_as::<u16>(&key).unwrap(), 80);
/// ```
pub struct Resolver {
    key: Key,
    strategy: Strategy,
    disposer: Option<Disposer>,
    memo: Mutex<FastMap<ContainerId, AnyArc>>,
}

impl Resolver {
    fn with_strategy(key: Key, strategy: Strategy) -> Self {
        Self {
            key,
            strategy,
            disposer: None,
            memo: Mutex::new(FastMap::default()),
        }
    }

    pub fn instance(key: Key, value: AnyArc) -> Self {
        Self::with_strategy(key, Strategy::Instance(value))
    }

    pub fn singleton(key: Key, class: Class) -> Self {
        Self::with_strategy(
            key,
            Strategy::Singleton(SingletonCell {
                state: Mutex::new(SingletonState::Pending(class)),
                ready: Condvar::new(),
            }),
        )
    }

    pub fn transient(key: Key, class: Class) -> Self {
        Self::with_strategy(key, Strategy::Transient(class))
    }

    pub fn callback(key: Key, callback: Callback) -> Self {
        Self::with_strategy(key, Strategy::Callback(callback))
    }

    /// A callback whose first result is remembered per handler container.
    pub fn cached_callback(key: Key, callback: Callback) -> Self {
        let memoizing: Callback = Arc::new(
            move |handler: &Container, requestor: &Container, resolver: &Resolver| {
                if let Some(value) = resolver.memo.lock().get(&handler.id()) {
                    return Ok(Arc::clone(value));
                }
                let value = callback(handler, requestor, resolver)?;
                let mut memo = resolver.memo.lock();
                Ok(Arc::clone(memo.entry(handler.id()).or_insert(value)))
            },
        );
        Self::callback(key, memoizing)
    }

    pub fn alias(key: Key, target: Key) -> Self {
        Self::with_strategy(key, Strategy::Alias(target))
    }

    pub fn multi(key: Key, entries: Vec<Arc<Resolver>>) -> Self {
        Self::with_strategy(key, Strategy::Multi(RwLock::new(entries)))
    }

    /// Calls [`Dispose::dispose`] on the resolved value when this resolver is disposed.
    pub fn on_dispose<T: Dispose>(self) -> Self {
        self.with_disposer(|value| {
            if let Ok(value) = downcast::<T>(Arc::clone(value)) {
                value.dispose();
            }
        })
    }

    pub fn with_disposer<F>(mut self, disposer: F) -> Self
    where
        F: Fn(&AnyArc) + Send + Sync + 'static,
    {
        self.disposer = Some(Arc::new(disposer));
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Current strategy; a singleton that has been built reports `Instance`.
    pub fn kind(&self) -> StrategyKind {
        match &self.strategy {
            Strategy::Instance(_) => StrategyKind::Instance,
            Strategy::Singleton(cell) => match &*cell.state.lock() {
                SingletonState::Cached { .. } => StrategyKind::Instance,
                _ => StrategyKind::Singleton,
            },
            Strategy::Transient(_) => StrategyKind::Transient,
            Strategy::Callback(_) => StrategyKind::Callback,
            Strategy::Alias(_) => StrategyKind::Alias,
            Strategy::Multi(_) => StrategyKind::Multi,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self.strategy, Strategy::Multi(_))
    }

    /// Entries of a multi-binding, in registration order; empty for other strategies.
    pub fn entries(&self) -> Vec<Arc<Resolver>> {
        match &self.strategy {
            Strategy::Multi(entries) => entries.read().clone(),
            _ => Vec::new(),
        }
    }

    /// Produces the value. `handler` is where the binding was found, `requestor`
    /// is where the request started.
    pub fn resolve(&self, handler: &Container, requestor: &Container) -> DiResult<AnyArc> {
        match &self.strategy {
            Strategy::Instance(value) => Ok(Arc::clone(value)),
            Strategy::Singleton(cell) => resolve_singleton(cell, handler, requestor),
            Strategy::Transient(class) => handler.get_factory(class)?.construct(requestor, Vec::new()),
            Strategy::Callback(callback) => callback(handler, requestor, self),
            Strategy::Alias(target) => requestor.resolve_any(target),
            Strategy::Multi(entries) => {
                let first = entries.read().first().cloned();
                match first {
                    Some(first) => first.resolve(handler, requestor),
                    None => Err(DiError::InternalProtocol(format!(
                        "multi-binding for {} has no entries",
                        self.key
                    ))),
                }
            }
        }
    }

    /// Every value of a multi-binding in order, or the single value otherwise.
    pub fn resolve_all(&self, handler: &Container, requestor: &Container) -> DiResult<Vec<AnyArc>> {
        match &self.strategy {
            Strategy::Multi(entries) => {
                let entries = entries.read().clone();
                entries
                    .iter()
                    .map(|entry| entry.resolve(handler, requestor))
                    .collect()
            }
            _ => Ok(vec![self.resolve(handler, requestor)?]),
        }
    }

    /// The factory behind this binding, looked up in `container`.
    ///
    /// Singleton and transient bindings use their type's factory. Aliases defer to
    /// whatever is bound for their target, without auto-registering it.
    pub fn get_factory(&self, container: &Container) -> Option<Arc<Factory>> {
        match &self.strategy {
            Strategy::Singleton(cell) => {
                let class = cell.state.lock().class();
                container.get_factory(&class).ok()
            }
            Strategy::Transient(class) => container.get_factory(class).ok(),
            Strategy::Alias(target) => container
                .get_resolver(target, false)
                .ok()
                .flatten()
                .and_then(|resolver| resolver.get_factory(container)),
            _ => None,
        }
    }

    /// Runs the dispose hook on the current value. Cached singletons stay cached.
    pub fn dispose(&self) {
        match &self.strategy {
            Strategy::Multi(entries) => {
                let entries = entries.read().clone();
                for entry in &entries {
                    entry.dispose();
                }
            }
            strategy => {
                let Some(disposer) = &self.disposer else {
                    return;
                };
                let value = match strategy {
                    Strategy::Instance(value) => Some(Arc::clone(value)),
                    Strategy::Singleton(cell) => match &*cell.state.lock() {
                        SingletonState::Cached { value, .. } => Some(Arc::clone(value)),
                        _ => None,
                    },
                    _ => None,
                };
                if let Some(value) = value {
                    disposer(&value);
                }
            }
        }
    }

    /// Drops whatever a cached callback remembered for `container`.
    pub(crate) fn forget(&self, container: ContainerId) {
        if let Strategy::Multi(entries) = &self.strategy {
            for entry in entries.read().iter() {
                entry.forget(container);
            }
        }
        self.memo.lock().remove(&container);
    }

    /// Appends to a multi-binding. Returns `false` for any other strategy.
    pub(crate) fn push(&self, resolver: Arc<Resolver>) -> bool {
        match &self.strategy {
            Strategy::Multi(entries) => {
                entries.write().push(resolver);
                trace!(key = %self.key, "appended to multi-binding");
                true
            }
            _ => false,
        }
    }
}

fn resolve_singleton(
    cell: &SingletonCell,
    handler: &Container,
    requestor: &Container,
) -> DiResult<AnyArc> {
    let current = thread::current().id();
    let mut state = cell.state.lock();
    let class = loop {
        match &*state {
            SingletonState::Cached { value, .. } => return Ok(Arc::clone(value)),
            SingletonState::Pending(class) => break *class,
            SingletonState::Resolving { class, owner } => {
                let (class, owner) = (*class, *owner);
                if owner == current {
                    return Err(cyclic_error(class.name()));
                }
                let Some(_waiting) = WaitGuard::enter(owner, cell.slot()) else {
                    return Err(cyclic_error(class.name()));
                };
                cell.ready.wait(&mut state);
            }
        }
    };
    *state = SingletonState::Resolving {
        class,
        owner: current,
    };
    drop(state);

    let building = Building { cell, class };
    let value = handler
        .get_factory(&class)
        .and_then(|factory| factory.construct(requestor, Vec::new()))?;
    *building.cell.state.lock() = SingletonState::Cached {
        value: Arc::clone(&value),
        class,
    };
    Ok(value)
}

/// Ends a singleton construction: unless the value was cached, the state returns to
/// pending. Waiters are woken either way.
struct Building<'a> {
    cell: &'a SingletonCell,
    class: Class,
}

impl Drop for Building<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.cell.state.lock();
            if matches!(*state, SingletonState::Resolving { .. }) {
                *state = SingletonState::Pending(self.class);
            }
        }
        release_waiters(self.cell.slot());
        self.cell.ready.notify_all();
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("key", &self.key)
            .field("kind", &self.kind())
            .finish()
    }
}
