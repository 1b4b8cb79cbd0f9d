//! Container configuration.

use std::fmt;
use std::sync::Arc;

use crate::catalog::TypeCatalog;
use crate::container::Container;
use crate::error::{ConfigurationError, DiResult};
use crate::key::Key;
use crate::observer::{ContainerObserver, Observers};
use crate::resolver::Resolver;

/// Policy used by just-in-time registration when a constructible key has neither a
/// registry nor resource definitions.
///
/// The requesting container's policy applies, even when the binding ends up on the root.
#[derive(Clone, Default)]
pub enum DefaultResolver {
    /// Refuse; JIT fails with [`ConfigurationError::NoRegistration`].
    None,
    /// Bind the type as a singleton of itself.
    #[default]
    Singleton,
    /// Bind the type as transient.
    Transient,
    /// Custom policy.
    Custom(Arc<dyn Fn(&Key, &Container) -> DiResult<Arc<Resolver>> + Send + Sync>),
}

impl DefaultResolver {
    pub fn custom<F>(policy: F) -> Self
    where
        F: Fn(&Key, &Container) -> DiResult<Arc<Resolver>> + Send + Sync + 'static,
    {
        DefaultResolver::Custom(Arc::new(policy))
    }

    /// Synthesizes the resolver for `key`, to be stored on `handler`.
    pub fn resolve(&self, key: &Key, handler: &Container) -> DiResult<Arc<Resolver>> {
        let class = || {
            key.as_class().ok_or_else(|| ConfigurationError::NotConstructible {
                key: key.to_string(),
            })
        };
        match self {
            DefaultResolver::None => Err(ConfigurationError::NoRegistration {
                key: key.to_string(),
            }
            .into()),
            DefaultResolver::Singleton => Ok(Arc::new(Resolver::singleton(key.clone(), class()?))),
            DefaultResolver::Transient => Ok(Arc::new(Resolver::transient(key.clone(), class()?))),
            DefaultResolver::Custom(policy) => policy(key, handler),
        }
    }
}

impl fmt::Debug for DefaultResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultResolver::None => f.write_str("None"),
            DefaultResolver::Singleton => f.write_str("Singleton"),
            DefaultResolver::Transient => f.write_str("Transient"),
            DefaultResolver::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration for a container tree.
///
/// Children inherit their parent's configuration unless one is passed to
/// [`Container::create_child_with`]. The catalog only matters for roots: every
/// container uses its root's catalog.
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, ContainerConfig, DefaultResolver, TypeCatalog};
/// use std::sync::Arc;
///
/// let config = ContainerConfig::new()
///     .jit_register_in_root(false)
///     .default_resolver(DefaultResolver::Transient)
///     .with_catalog(Arc::new(TypeCatalog::new()));
///
/// let container = Container::with_config(config);
/// assert!(!container.config().jit_registers_in_root());
/// ```
#[derive(Clone, Debug)]
pub struct ContainerConfig {
    jit_register_in_root: bool,
    default_resolver: DefaultResolver,
    observers: Observers,
    catalog: Option<Arc<TypeCatalog>>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            jit_register_in_root: true,
            default_resolver: DefaultResolver::Singleton,
            observers: Observers::new(),
            catalog: None,
        }
    }
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether JIT registrations go to the root (`true`, default) or to the requesting
    /// container.
    pub fn jit_register_in_root(mut self, in_root: bool) -> Self {
        self.jit_register_in_root = in_root;
        self
    }

    pub fn default_resolver(mut self, policy: DefaultResolver) -> Self {
        self.default_resolver = policy;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ContainerObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn jit_registers_in_root(&self) -> bool {
        self.jit_register_in_root
    }

    pub fn resolver_policy(&self) -> &DefaultResolver {
        &self.default_resolver
    }

    pub fn observers(&self) -> &Observers {
        &self.observers
    }

    pub fn catalog(&self) -> Option<&Arc<TypeCatalog>> {
        self.catalog.as_ref()
    }
}
