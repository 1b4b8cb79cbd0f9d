//! Self-resolving keys: `all`, `optional` and `lazy`.
//!
//! A combinator is a [`Key::Resolver`]. The container does not look it up; it hands
//! the combinator itself as handler and requestor and returns whatever it produces.
//! Combinators are most useful inside dependency lists:
//!
//! ```
//! use arbor_di::{all, Args, Container, DiResult, Injectable, Key, Metadata, Registration, Registrant, All};
//!
//! struct Router {
//!     routes: Vec<String>,
//! }
//!
//! impl Injectable for Router {
//!     fn metadata() -> Metadata {
//!         Metadata::new().inject([all(Key::name("route"))])
//!     }
//!
//!     fn construct(args: Args) -> DiResult<Self> {
//!         let routes = args.get::<All>(0)?.typed::<String>()?;
//!         Ok(Router { routes: routes.iter().map(|r| r.to_string()).collect() })
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register([
//!         Registrant::from(Registration::instance(Key::name("route"), String::from("/home"))),
//!         Registrant::from(Registration::instance(Key::name("route"), String::from("/about"))),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(container.get::<Router>().unwrap().routes, vec!["/home", "/about"]);
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::container::Container;
use crate::error::DiResult;
use crate::internal::downcast;
use crate::key::Key;
use crate::AnyArc;

/// A key that resolves itself against the requesting container.
pub trait KeyResolver: Send + Sync {
    /// Diagnostic name, e.g. `all(route)`.
    fn name(&self) -> &str;

    fn resolve(&self, handler: &Container, requestor: &Container) -> DiResult<AnyArc>;
}

/// Every value bound to a key at the nearest level holding it.
#[derive(Clone)]
pub struct All {
    values: Vec<AnyArc>,
}

impl All {
    pub fn values(&self) -> &[AnyArc] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn typed<T: Any + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        self.values.iter().cloned().map(downcast::<T>).collect()
    }
}

/// A value that is present only when its key is bound somewhere up the tree.
#[derive(Clone)]
pub struct Optional {
    value: Option<AnyArc>,
}

impl Optional {
    pub fn value(&self) -> Option<&AnyArc> {
        self.value.as_ref()
    }

    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    pub fn typed<T: Any + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        self.value.clone().map(downcast::<T>).transpose()
    }
}

/// A deferred lookup, resolved from the requesting container on each `get`.
#[derive(Clone)]
pub struct Lazy {
    container: Container,
    key: Key,
}

impl Lazy {
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn get(&self) -> DiResult<AnyArc> {
        self.container.resolve_any(&self.key)
    }

    pub fn get_as<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.container.get_as(&self.key)
    }
}

struct AllOf {
    key: Key,
    name: String,
}

impl KeyResolver for AllOf {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, _handler: &Container, requestor: &Container) -> DiResult<AnyArc> {
        let values = requestor.resolve_all_any(&self.key)?;
        Ok(Arc::new(All { values }))
    }
}

struct OptionalOf {
    key: Key,
    name: String,
}

impl KeyResolver for OptionalOf {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, _handler: &Container, requestor: &Container) -> DiResult<AnyArc> {
        let value = if requestor.has(&self.key, true)? {
            Some(requestor.resolve_any(&self.key)?)
        } else {
            None
        };
        Ok(Arc::new(Optional { value }))
    }
}

struct LazyOf {
    key: Key,
    name: String,
}

impl KeyResolver for LazyOf {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, _handler: &Container, requestor: &Container) -> DiResult<AnyArc> {
        Ok(Arc::new(Lazy {
            container: requestor.clone(),
            key: self.key.clone(),
        }))
    }
}

/// Key resolving to an [`All`] of every binding for `key` at the nearest level.
pub fn all(key: impl Into<Key>) -> Key {
    let key = key.into();
    let name = format!("all({key})");
    Key::Resolver(Arc::new(AllOf { key, name }))
}

/// Key resolving to an [`Optional`]; never auto-registers `key`.
pub fn optional(key: impl Into<Key>) -> Key {
    let key = key.into();
    let name = format!("optional({key})");
    Key::Resolver(Arc::new(OptionalOf { key, name }))
}

/// Key resolving to a [`Lazy`] handle for `key`.
pub fn lazy(key: impl Into<Key>) -> Key {
    let key = key.into();
    let name = format!("lazy({key})");
    Key::Resolver(Arc::new(LazyOf { key, name }))
}
