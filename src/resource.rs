//! Named resources: types published under namespaced `kind:name` keys.

use std::sync::Arc;

use crate::class::Class;
use crate::container::Container;
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::resolver::Resolver;
use crate::traits::{Injectable, Registrable, ResourceProvider};

/// Publishes a type under `kind:name` plus optional alias names.
///
/// Registering binds the type's own key with the chosen lifetime (unless something is
/// already bound for it) and aliases every resource key to it. A definition whose
/// resource key is already visible in the container is skipped.
///
/// # Examples
///
/// ```
/// use arbor_di::{Args, Container, DiResult, Injectable, Key, Registrant, ResourceDefinition};
/// use std::sync::Arc;
///
/// struct NavBar;
///
/// impl Injectable for NavBar {
///     fn construct(_args: Args) -> DiResult<Self> {
///         Ok(NavBar)
///     }
/// }
///
/// let container = Container::new();
/// container
///     .register([Registrant::from(
///         ResourceDefinition::new::<NavBar>("element", "nav-bar").with_alias("navigation"),
///     )])
///     .unwrap();
///
/// let by_name = container.get_as::<NavBar>(&Key::resource("element", "nav-bar")).unwrap();
/// let by_alias = container.get_as::<NavBar>(&Key::resource("element", "navigation")).unwrap();
/// assert!(Arc::ptr_eq(&by_name, &by_alias));
/// assert!(container.find_resource("element:nav-bar").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    kind: String,
    name: String,
    class: Class,
    lifetime: Lifetime,
    aliases: Vec<String>,
}

impl ResourceDefinition {
    pub fn new<T: Injectable>(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::for_class(kind, name, Class::of::<T>())
    }

    pub fn for_class(kind: impl Into<String>, name: impl Into<String>, class: Class) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            class,
            lifetime: Lifetime::Singleton,
            aliases: Vec::new(),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// The primary `kind:name` key.
    pub fn key(&self) -> Key {
        Key::resource(&self.kind, &self.name)
    }
}

impl Registrable for ResourceDefinition {
    fn register(&self, container: &Container) -> DiResult<Option<Arc<Resolver>>> {
        let resource_key = self.key();
        if container.has(&resource_key, false)? {
            return Ok(None);
        }

        let class_key = self.class.key();
        if !container.has(&class_key, false)? {
            let resolver = match self.lifetime {
                Lifetime::Singleton => Resolver::singleton(class_key.clone(), self.class),
                Lifetime::Transient => Resolver::transient(class_key.clone(), self.class),
            };
            container.register_resolver(class_key.clone(), Arc::new(resolver), false)?;
        }

        let names = std::iter::once(resource_key)
            .chain(self.aliases.iter().map(|alias| Key::resource(&self.kind, alias)));
        for key in names {
            let alias = Resolver::alias(key.clone(), class_key.clone());
            container.register_resolver(key, Arc::new(alias), false)?;
        }
        Ok(None)
    }
}

impl ResourceProvider for Vec<ResourceDefinition> {
    fn resources(&self) -> Vec<Arc<dyn Registrable>> {
        self.iter()
            .map(|definition| Arc::new(definition.clone()) as Arc<dyn Registrable>)
            .collect()
    }
}
