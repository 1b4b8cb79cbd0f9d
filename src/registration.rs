//! Ready-made registrable values for the common binding shapes.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::class::Class;
use crate::container::Container;
use crate::error::DiResult;
use crate::interface::{erase_callback, ResolverBuilder};
use crate::key::Key;
use crate::resolver::{Callback, Resolver};
use crate::traits::{Injectable, Registrable};
use crate::AnyArc;

enum Binding {
    Instance(AnyArc),
    Singleton(Class),
    Transient(Class),
    Callback(Callback),
    CachedCallback(Callback),
    Alias(Key),
}

/// A single binding, applied when passed to [`Container::register`].
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, Key, Registration, Registrant};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container
///     .register([
///         Registrant::from(Registration::instance(Key::name("db.url"), String::from("postgres://"))),
///         Registrant::from(Registration::alias(Key::name("db.url"), Key::name("database-url"))),
///         Registrant::from(Registration::callback(Key::name("db.pool"), |_, requestor, _| {
///             let url = requestor.get_as::<String>(&Key::name("database-url"))?;
///             Ok(Arc::new(format!("pool({url})")))
///         })),
///     ])
///     .unwrap();
///
/// assert_eq!(*container.get_as::<String>(&Key::name("db.pool")).unwrap(), "pool(postgres://)");
/// ```
pub struct Registration {
    key: Key,
    binding: Binding,
}

impl Registration {
    /// Binds `key` to a fixed value.
    pub fn instance<T: Any + Send + Sync>(key: impl Into<Key>, value: T) -> Self {
        Self::instance_any(key, Arc::new(value))
    }

    pub fn instance_any(key: impl Into<Key>, value: AnyArc) -> Self {
        Self {
            key: key.into(),
            binding: Binding::Instance(value),
        }
    }

    /// Binds a trait object, read back with [`Container::get_dyn`].
    pub fn instance_dyn<T: ?Sized + Send + Sync + 'static>(key: impl Into<Key>, value: Arc<T>) -> Self {
        Self::instance_any(key, Arc::new(value))
    }

    /// Binds `key` to a singleton of `T`.
    pub fn singleton<T: Injectable>(key: impl Into<Key>) -> Self {
        Self::singleton_class(key, Class::of::<T>())
    }

    pub fn singleton_class(key: impl Into<Key>, class: Class) -> Self {
        Self {
            key: key.into(),
            binding: Binding::Singleton(class),
        }
    }

    /// Binds `key` to a fresh `T` per request.
    pub fn transient<T: Injectable>(key: impl Into<Key>) -> Self {
        Self::transient_class(key, Class::of::<T>())
    }

    pub fn transient_class(key: impl Into<Key>, class: Class) -> Self {
        Self {
            key: key.into(),
            binding: Binding::Transient(class),
        }
    }

    /// Binds `key` to a callback receiving `(handler, requestor, resolver)`.
    pub fn callback<T, F>(key: impl Into<Key>, callback: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Container, &Container, &Resolver) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            binding: Binding::Callback(erase_callback(callback)),
        }
    }

    /// Like [`callback`](Self::callback), but the first result per handler container
    /// is reused.
    pub fn cached_callback<T, F>(key: impl Into<Key>, callback: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Container, &Container, &Resolver) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            binding: Binding::CachedCallback(erase_callback(callback)),
        }
    }

    /// Makes `alias` resolve whatever `original` resolves to.
    pub fn alias(original: impl Into<Key>, alias: impl Into<Key>) -> Self {
        Self {
            key: alias.into(),
            binding: Binding::Alias(original.into()),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl Registrable for Registration {
    fn register(&self, container: &Container) -> DiResult<Option<Arc<Resolver>>> {
        let builder = ResolverBuilder::new(container, self.key.clone());
        let resolver = match &self.binding {
            Binding::Instance(value) => builder.instance_any(Arc::clone(value)),
            Binding::Singleton(class) => builder.singleton_class(*class),
            Binding::Transient(class) => builder.transient_class(*class),
            Binding::Callback(callback) => container.register_resolver(
                self.key.clone(),
                Arc::new(Resolver::callback(self.key.clone(), Arc::clone(callback))),
                false,
            ),
            Binding::CachedCallback(callback) => container.register_resolver(
                self.key.clone(),
                Arc::new(Resolver::cached_callback(self.key.clone(), Arc::clone(callback))),
                false,
            ),
            Binding::Alias(target) => builder.alias_to(target.clone()),
        }?;
        Ok(Some(resolver))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = match &self.binding {
            Binding::Instance(_) => "instance",
            Binding::Singleton(_) => "singleton",
            Binding::Transient(_) => "transient",
            Binding::Callback(_) => "callback",
            Binding::CachedCallback(_) => "cached_callback",
            Binding::Alias(_) => "alias",
        };
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("binding", &binding)
            .finish()
    }
}
