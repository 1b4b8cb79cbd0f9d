//! The constructible-type capability and the argument list handed to constructors.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::{downcast, downcast_dyn};
use crate::metadata::Metadata;
use crate::traits::Registrable;
use crate::AnyArc;

/// A type the container can construct.
///
/// `construct` receives the resolved dependencies in the order given by the type's
/// [`Metadata`], followed by any dynamic arguments passed to
/// [`Container::invoke`](crate::Container::invoke). Types without metadata inherit
/// the dependency list of their declared base type, or take no arguments.
///
/// # Examples
///
/// ```
/// use arbor_di::{Args, Container, DiResult, Injectable, Key, Metadata};
/// use std::sync::Arc;
///
/// struct Config {
///     port: u16,
/// }
///
/// impl Injectable for Config {
///     fn construct(_args: Args) -> DiResult<Self> {
///         Ok(Config { port: 8080 })
///     }
/// }
///
/// struct Server {
///     config: Arc<Config>,
/// }
///
/// impl Injectable for Server {
///     fn metadata() -> Metadata {
///         Metadata::new().inject([Key::class::<Config>()])
///     }
///
///     fn construct(args: Args) -> DiResult<Self> {
///         Ok(Server { config: args.get(0)? })
///     }
/// }
///
/// let container = Container::new();
/// assert_eq!(container.get::<Server>().unwrap().config.port, 8080);
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Register just-in-time bindings for this type in the requesting container
    /// instead of wherever the container policy says.
    const REGISTER_IN_REQUESTOR: bool = false;

    /// Dependency metadata consulted once per type by dependency discovery.
    fn metadata() -> Metadata {
        Metadata::new()
    }

    /// Builds the value from its resolved arguments.
    fn construct(args: Args) -> DiResult<Self>;

    /// Self-registration routine used instead of the default resolver policy.
    fn registry() -> Option<Arc<dyn Registrable>> {
        None
    }

    /// Resource definitions registered when the type is registered or auto-registered.
    fn resources() -> Vec<Arc<dyn Registrable>> {
        Vec::new()
    }
}

/// Ordered constructor arguments: static dependencies first, dynamic arguments after.
pub struct Args {
    type_name: &'static str,
    values: Vec<AnyArc>,
    cursor: usize,
}

impl Args {
    pub(crate) fn new(type_name: &'static str, values: Vec<AnyArc>) -> Self {
        Self {
            type_name,
            values,
            cursor: 0,
        }
    }

    /// Name of the type being constructed.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The erased argument at `index`.
    pub fn raw(&self, index: usize) -> Option<&AnyArc> {
        self.values.get(index)
    }

    /// The argument at `index`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        downcast(self.raw_required(index)?.clone())
    }

    /// The argument at `index`, stored as `Arc<T>` (trait objects).
    pub fn get_dyn<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        downcast_dyn(self.raw_required(index)?.clone())
    }

    /// The next argument in order, downcast to `T`.
    pub fn next<T: Any + Send + Sync>(&mut self) -> DiResult<Arc<T>> {
        let value = self.get(self.cursor)?;
        self.cursor += 1;
        Ok(value)
    }

    /// The next argument in order, stored as `Arc<T>` (trait objects).
    pub fn next_dyn<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let value = self.get_dyn(self.cursor)?;
        self.cursor += 1;
        Ok(value)
    }

    pub fn into_vec(self) -> Vec<AnyArc> {
        self.values
    }

    fn raw_required(&self, index: usize) -> DiResult<&AnyArc> {
        self.values.get(index).ok_or_else(|| {
            DiError::construction(
                self.type_name,
                format!("missing argument at index {index} ({} supplied)", self.values.len()),
            )
        })
    }
}
