//! Binding keys for the dependency injection container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::class::Class;
use crate::combinators::KeyResolver;
use crate::error::{ConfigurationError, DiResult};
use crate::interface::Interface;
use crate::traits::Injectable;

/// Key for binding storage and lookup.
///
/// # Key Types
///
/// - **Type**: a concrete type with no constructor attached; it can be bound but never
///   auto-registered
/// - **Class**: a constructible [`Injectable`] type; equal to `Type` of the same type
/// - **Interface**: an [`Interface`] marker, compared by identity
/// - **Name**: a string key; names containing `:` (e.g. `element:nav-bar`) are resource keys
/// - **Resolver**: a self-resolving combinator such as [`all`](crate::all)
///
/// # Examples
///
/// ```rust
/// use arbor_di::{Interface, Key};
///
/// struct Settings;
///
/// assert_eq!(Key::of::<Settings>(), Key::of::<Settings>());
/// assert_eq!(Key::name("config"), Key::name("config"));
/// assert!(Key::resource("element", "nav-bar").is_resource());
/// assert!(!Key::name("config").is_resource());
///
/// let logger = Interface::new("ILogger");
/// assert_eq!(Key::from(&logger), logger.key());
/// assert_ne!(logger.key(), Interface::new("ILogger").key());
/// ```
#[derive(Clone)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Constructible type key
    Class(Class),
    /// Interface marker key
    Interface(Interface),
    /// String key; a resource key when namespaced
    Name(Arc<str>),
    /// Self-resolving key, handed the requesting container directly
    Resolver(Arc<dyn KeyResolver>),
}

impl Key {
    /// Key for a plain type that is bound explicitly.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Key for a constructible type, eligible for just-in-time registration.
    #[inline]
    pub fn class<T: Injectable>() -> Self {
        Key::Class(Class::of::<T>())
    }

    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Key::Name(name.into())
    }

    /// Namespaced resource key `kind:name`.
    pub fn resource(kind: &str, name: &str) -> Self {
        Key::Name(format!("{kind}:{name}").into())
    }

    /// Human-readable name for diagnostics.
    pub fn display_name(&self) -> &str {
        match self {
            Key::Type(_, name) => name,
            Key::Class(class) => class.name(),
            Key::Interface(interface) => interface.friendly_name(),
            Key::Name(name) => name,
            Key::Resolver(resolver) => resolver.name(),
        }
    }

    /// Whether this is a namespaced resource key.
    pub fn is_resource(&self) -> bool {
        match self {
            Key::Name(name) => name.find(':').is_some_and(|index| index > 0),
            _ => false,
        }
    }

    /// The type identity behind `Type` and `Class` keys.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Key::Type(id, _) => Some(*id),
            Key::Class(class) => Some(class.type_id()),
            _ => None,
        }
    }

    /// The constructor descriptor, when the key carries one.
    pub fn as_class(&self) -> Option<Class> {
        match self {
            Key::Class(class) => Some(*class),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> DiResult<()> {
        match self {
            Key::Name(name) if name.is_empty() => Err(ConfigurationError::InvalidKey.into()),
            _ => Ok(()),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self.type_id(), other.type_id()) {
            (Some(a), Some(b)) => return a == b,
            (Some(_), None) | (None, Some(_)) => return false,
            (None, None) => {}
        }
        match (self, other) {
            (Key::Interface(a), Key::Interface(b)) => a.ptr_eq(b),
            (Key::Name(a), Key::Name(b)) => a == b,
            (Key::Resolver(a), Key::Resolver(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(id) = self.type_id() {
            0u8.hash(state);
            id.hash(state);
            return;
        }
        match self {
            Key::Interface(interface) => {
                1u8.hash(state);
                interface.addr().hash(state);
            }
            Key::Name(name) => {
                2u8.hash(state);
                name.hash(state);
            }
            Key::Resolver(resolver) => {
                3u8.hash(state);
                (Arc::as_ptr(resolver) as *const () as usize).hash(state);
            }
            Key::Type(..) | Key::Class(_) => unreachable!("type keys hash by TypeId"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Key::Type(..) => "Type",
            Key::Class(_) => "Class",
            Key::Interface(_) => "Interface",
            Key::Name(_) => "Name",
            Key::Resolver(_) => "Resolver",
        };
        write!(f, "{variant}({})", self.display_name())
    }
}

impl From<Class> for Key {
    fn from(class: Class) -> Self {
        Key::Class(class)
    }
}

impl From<Interface> for Key {
    fn from(interface: Interface) -> Self {
        Key::Interface(interface)
    }
}

impl From<&Interface> for Key {
    fn from(interface: &Interface) -> Self {
        Key::Interface(interface.clone())
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.into())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name.into())
    }
}
