//! Bulk registration through `Container::register`.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::class::Class;
use crate::container::{Container, ContainerId};
use crate::error::{DiError, DiResult};
use crate::internal::FastMap;
use crate::interface::Interface;
use crate::registration::Registration;
use crate::resolver::Resolver;
use crate::resource::ResourceDefinition;
use crate::traits::{Injectable, Registrable, ResourceProvider};

const MAX_REGISTER_DEPTH: usize = 100;

// Nesting of `register` calls on this thread, per container
thread_local! {
    static REGISTER_DEPTH: RefCell<FastMap<ContainerId, usize>> = RefCell::new(FastMap::default());
}

/// One item accepted by [`Container::register`].
#[derive(Clone)]
pub enum Registrant {
    /// A value that installs its own bindings.
    Registry(Arc<dyn Registrable>),
    /// A value carrying resource definitions, registered in order.
    Resources(Arc<dyn ResourceProvider>),
    /// A constructible type: its registry, else its resources, else a singleton of itself.
    Class(Class),
    /// A nested group, registered recursively.
    Bag(Vec<Registrant>),
}

impl Registrant {
    pub fn registry<R: Registrable + 'static>(registry: R) -> Self {
        Registrant::Registry(Arc::new(registry))
    }

    pub fn resources<P: ResourceProvider + 'static>(provider: P) -> Self {
        Registrant::Resources(Arc::new(provider))
    }

    pub fn class<T: Injectable>() -> Self {
        Registrant::Class(Class::of::<T>())
    }

    pub fn bag(items: impl IntoIterator<Item = Registrant>) -> Self {
        Registrant::Bag(items.into_iter().collect())
    }
}

impl From<Class> for Registrant {
    fn from(class: Class) -> Self {
        Registrant::Class(class)
    }
}

impl From<Registration> for Registrant {
    fn from(registration: Registration) -> Self {
        Registrant::registry(registration)
    }
}

impl From<Interface> for Registrant {
    fn from(interface: Interface) -> Self {
        Registrant::registry(interface)
    }
}

impl From<ResourceDefinition> for Registrant {
    fn from(definition: ResourceDefinition) -> Self {
        Registrant::registry(definition)
    }
}

impl From<Arc<dyn Registrable>> for Registrant {
    fn from(registry: Arc<dyn Registrable>) -> Self {
        Registrant::Registry(registry)
    }
}

impl From<Vec<Registrant>> for Registrant {
    fn from(items: Vec<Registrant>) -> Self {
        Registrant::Bag(items)
    }
}

impl fmt::Debug for Registrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registrant::Registry(_) => f.write_str("Registry(..)"),
            Registrant::Resources(_) => f.write_str("Resources(..)"),
            Registrant::Class(class) => f.debug_tuple("Class").field(class).finish(),
            Registrant::Bag(items) => f.debug_tuple("Bag").field(items).finish(),
        }
    }
}

struct DepthGuard(ContainerId);

impl DepthGuard {
    fn enter(container: ContainerId) -> DiResult<Self> {
        REGISTER_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            let depth = depths.entry(container).or_insert(0);
            if *depth >= MAX_REGISTER_DEPTH {
                return Err(DiError::RecursionLimit {
                    depth: MAX_REGISTER_DEPTH,
                });
            }
            *depth += 1;
            Ok(Self(container))
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        REGISTER_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(depth) = depths.get_mut(&self.0) {
                *depth -= 1;
                if *depth == 0 {
                    depths.remove(&self.0);
                }
            }
        });
    }
}

impl Container {
    /// Registers every item in order.
    ///
    /// Registries and resource definitions may call `register` themselves; nesting
    /// deeper than 100 calls on one thread fails with [`DiError::RecursionLimit`].
    ///
    /// # Examples
    ///
    /// ```
    /// use arbor_di::{Container, Key, Registration, Registrant};
    ///
    /// let container = Container::new();
    /// container
    ///     .register([
    ///         Registrant::from(Registration::instance(Key::name("host"), "localhost")),
    ///         Registrant::bag([Registrant::from(Registration::instance(Key::name("port"), 8080u16))]),
    ///     ])
    ///     .unwrap();
    ///
    /// assert_eq!(*container.get_as::<u16>(&Key::name("port")).unwrap(), 8080);
    /// ```
    pub fn register<I>(&self, items: I) -> DiResult<&Self>
    where
        I: IntoIterator,
        I::Item: Into<Registrant>,
    {
        let _depth = DepthGuard::enter(self.id())?;

        for item in items {
            match item.into() {
                Registrant::Registry(registry) => {
                    registry.register(self)?;
                }
                Registrant::Resources(provider) => {
                    for definition in provider.resources() {
                        definition.register(self)?;
                    }
                }
                Registrant::Class(class) => self.register_class(class)?,
                Registrant::Bag(items) => {
                    self.register(items)?;
                }
            }
        }
        Ok(self)
    }

    fn register_class(&self, class: Class) -> DiResult<()> {
        if let Some(registry) = class.registry() {
            registry.register(self)?;
            return Ok(());
        }

        let resources = class.resources();
        if !resources.is_empty() {
            for definition in &resources {
                definition.register(self)?;
            }
            return Ok(());
        }

        let key = class.key();
        self.register_resolver(key.clone(), Arc::new(Resolver::singleton(key, class)), false)?;
        Ok(())
    }
}
