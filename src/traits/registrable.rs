//! Self-registration capabilities consumed by `Container::register` and JIT registration.

use std::sync::Arc;

use crate::container::Container;
use crate::error::DiResult;
use crate::resolver::Resolver;

/// A value that installs its own bindings into a container.
///
/// Returning `Some(resolver)` hands that resolver straight back to just-in-time
/// registration. Returning `None` makes JIT read back whatever got installed for the
/// requested key, failing with [`DiError::Protocol`](crate::DiError::Protocol) if
/// nothing was.
///
/// Closures with the same signature are registries too.
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, DiResult, Key, Registrable, Registrant, Resolver};
/// use std::sync::Arc;
///
/// struct PortModule;
///
/// impl Registrable for PortModule {
///     fn register(&self, container: &Container) -> DiResult<Option<Arc<Resolver>>> {
///         let key = Key::name("port");
///         let resolver = Resolver::instance(key.clone(), Arc::new(8080u16));
///         container.register_resolver(key, Arc::new(resolver), false).map(Some)
///     }
/// }
///
/// let container = Container::new();
/// container.register([Registrant::registry(PortModule)]).unwrap();
/// assert_eq!(*container.get_as::<u16>(&Key::name("port")).unwrap(), 8080);
/// ```
pub trait Registrable: Send + Sync {
    /// Install bindings into `container`.
    fn register(&self, container: &Container) -> DiResult<Option<Arc<Resolver>>>;
}

impl<F> Registrable for F
where
    F: Fn(&Container) -> DiResult<Option<Arc<Resolver>>> + Send + Sync,
{
    fn register(&self, container: &Container) -> DiResult<Option<Arc<Resolver>>> {
        self(container)
    }
}

/// A value carrying an ordered list of resource definitions.
pub trait ResourceProvider: Send + Sync {
    /// Definitions in registration order.
    fn resources(&self) -> Vec<Arc<dyn Registrable>>;
}
