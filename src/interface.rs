//! Interface markers and the builder used by their default registrations.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::class::Class;
use crate::container::Container;
use crate::error::{ConfigurationError, DiResult};
use crate::key::Key;
use crate::resolver::{Callback, Resolver};
use crate::traits::{Injectable, Registrable};
use crate::AnyArc;

type DefaultRegistration = Arc<dyn Fn(ResolverBuilder<'_>) -> DiResult<Arc<Resolver>> + Send + Sync>;

/// An abstract key standing for a contract, typically a trait.
///
/// Markers compare by identity: two markers created with the same name are different
/// keys. A marker may carry a default registration, set once, used by just-in-time
/// registration when nothing is bound for it.
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, Interface};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
///
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 {
///         42
///     }
/// }
///
/// let clock = Interface::with_default("Clock", |builder| {
///     builder.instance(Arc::new(FixedClock) as Arc<dyn Clock>)
/// });
///
/// let container = Container::new();
/// let resolved = container.get_dyn::<dyn Clock>(&clock.key()).unwrap();
/// assert_eq!(resolved.now(), 42);
/// ```
#[derive(Clone)]
pub struct Interface {
    inner: Arc<InterfaceInner>,
}

struct InterfaceInner {
    name: String,
    default: OnceCell<DefaultRegistration>,
}

impl Interface {
    /// Creates a marker without a default registration.
    pub fn new(friendly_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(InterfaceInner {
                name: friendly_name.into(),
                default: OnceCell::new(),
            }),
        }
    }

    /// Creates a marker whose default registration is `configure`.
    pub fn with_default<F>(friendly_name: impl Into<String>, configure: F) -> Self
    where
        F: Fn(ResolverBuilder<'_>) -> DiResult<Arc<Resolver>> + Send + Sync + 'static,
    {
        let interface = Self::new(friendly_name);
        // A fresh cell cannot already be set.
        let _ = interface.inner.default.set(Arc::new(configure));
        interface
    }

    /// Sets the default registration. It can only be set once.
    pub fn set_default<F>(&self, configure: F) -> DiResult<()>
    where
        F: Fn(ResolverBuilder<'_>) -> DiResult<Arc<Resolver>> + Send + Sync + 'static,
    {
        self.inner
            .default
            .set(Arc::new(configure))
            .map_err(|_| {
                ConfigurationError::DefaultAlreadySet {
                    interface: self.inner.name.clone(),
                }
                .into()
            })
    }

    pub fn has_default(&self) -> bool {
        self.inner.default.get().is_some()
    }

    pub fn friendly_name(&self) -> &str {
        &self.inner.name
    }

    pub fn key(&self) -> Key {
        Key::Interface(self.clone())
    }

    pub fn ptr_eq(&self, other: &Interface) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl Registrable for Interface {
    fn register(&self, container: &Container) -> DiResult<Option<Arc<Resolver>>> {
        let configure = self.inner.default.get().ok_or_else(|| ConfigurationError::NoDefault {
            interface: self.inner.name.clone(),
        })?;
        configure(ResolverBuilder::new(container, self.key())).map(Some)
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.inner.name)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// Registers one resolver for a fixed key on a fixed container.
pub struct ResolverBuilder<'a> {
    container: &'a Container,
    key: Key,
}

impl<'a> ResolverBuilder<'a> {
    pub fn new(container: &'a Container, key: Key) -> Self {
        Self { container, key }
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Binds a fixed value.
    pub fn instance<T: Any + Send + Sync>(self, value: T) -> DiResult<Arc<Resolver>> {
        self.instance_any(Arc::new(value))
    }

    pub fn instance_any(self, value: AnyArc) -> DiResult<Arc<Resolver>> {
        let resolver = Resolver::instance(self.key.clone(), value);
        self.install(resolver)
    }

    pub fn singleton<T: Injectable>(self) -> DiResult<Arc<Resolver>> {
        self.singleton_class(Class::of::<T>())
    }

    pub fn singleton_class(self, class: Class) -> DiResult<Arc<Resolver>> {
        let resolver = Resolver::singleton(self.key.clone(), class);
        self.install(resolver)
    }

    pub fn transient<T: Injectable>(self) -> DiResult<Arc<Resolver>> {
        self.transient_class(Class::of::<T>())
    }

    pub fn transient_class(self, class: Class) -> DiResult<Arc<Resolver>> {
        let resolver = Resolver::transient(self.key.clone(), class);
        self.install(resolver)
    }

    pub fn callback<T, F>(self, callback: F) -> DiResult<Arc<Resolver>>
    where
        T: Any + Send + Sync,
        F: Fn(&Container, &Container, &Resolver) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        let resolver = Resolver::callback(self.key.clone(), erase_callback(callback));
        self.install(resolver)
    }

    /// Like [`callback`](Self::callback), remembering the result per handler container.
    pub fn cached_callback<T, F>(self, callback: F) -> DiResult<Arc<Resolver>>
    where
        T: Any + Send + Sync,
        F: Fn(&Container, &Container, &Resolver) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        let resolver = Resolver::cached_callback(self.key.clone(), erase_callback(callback));
        self.install(resolver)
    }

    /// Resolves `target` whenever this key is requested.
    pub fn alias_to(self, target: impl Into<Key>) -> DiResult<Arc<Resolver>> {
        let resolver = Resolver::alias(self.key.clone(), target.into());
        self.install(resolver)
    }

    fn install(self, resolver: Resolver) -> DiResult<Arc<Resolver>> {
        self.container
            .register_resolver(self.key, Arc::new(resolver), false)
    }
}

pub(crate) fn erase_callback<T, F>(callback: F) -> Callback
where
    T: Any + Send + Sync,
    F: Fn(&Container, &Container, &Resolver) -> DiResult<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(
        move |handler: &Container, requestor: &Container, resolver: &Resolver| {
            Ok(callback(handler, requestor, resolver)? as AnyArc)
        },
    )
}
