//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Every failure is synchronous and surfaces directly to the caller of
/// `resolve_any`, `register` or `get_factory`. The one call that never
/// errors is [`Container::register_transformer`](crate::Container::register_transformer),
/// which reports a missing resolver or factory by returning `false`.
///
/// # Examples
///
/// ```rust
/// use arbor_di::{Container, ConfigurationError, DiError, Key};
///
/// let container = Container::new();
/// match container.resolve_any(&Key::name("not-constructible")) {
///     Err(DiError::Configuration(ConfigurationError::NotConstructible { key })) => {
///         assert_eq!(key, "not-constructible");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// The container was configured or used in a way that can never succeed
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A singleton was needed again while it was still being constructed, either on
    /// the constructing thread or by a thread the constructor is waiting for
    #[error("cyclic dependency while constructing {type_name}: {}", .path.join(" -> "))]
    Cyclic {
        type_name: &'static str,
        path: Vec<&'static str>,
    },
    /// A registry or resource definition ran but installed no resolver for the key
    #[error("registering {key} did not install a resolver for it")]
    Protocol { key: String },
    /// `register` recursed too deeply
    #[error(
        "register depth {depth} exceeded; a plain value was likely passed where a registry was expected"
    )]
    RecursionLimit { depth: usize },
    /// Construction nested deeper than the resolution stack allows
    #[error("max construction depth {0} exceeded")]
    DepthExceeded(usize),
    /// A resolver is in a state no resolution path can handle
    #[error("internal protocol error: {0}")]
    InternalProtocol(String),
    /// Type downcast failed
    #[error("type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// A constructor reported a failure of its own
    #[error("failed to construct {type_name}: {message}")]
    Construction {
        type_name: &'static str,
        message: String,
    },
}

/// Configuration failures, wrapped by [`DiError::Configuration`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Empty key name
    #[error("key cannot be empty; are you trying to inject or register something that does not exist?")]
    InvalidKey,
    /// A hole in a type's dependency list
    #[error("dependency at index {index} of {type_name} is missing")]
    MissingDependency {
        type_name: &'static str,
        index: usize,
    },
    /// The key has nothing that could construct a value
    #[error("unable to auto-register {key}: it is not constructible")]
    NotConstructible { key: String },
    /// Intrinsic types are never auto-registered
    #[error("{type_name} is an intrinsic type and cannot be auto-registered")]
    IntrinsicType { type_name: String },
    /// An interface without a default registration reached JIT
    #[error("interface {interface} has no registration and no default implementation")]
    NoDefault { interface: String },
    /// The one-time default registration of an interface was set twice
    #[error("default registration for interface {interface} is already set")]
    DefaultAlreadySet { interface: String },
    /// The default-resolver policy refuses to synthesize bindings
    #[error("no registration for {key} and the default resolver is disabled")]
    NoRegistration { key: String },
}

impl DiError {
    /// Wraps a constructor failure for the given type.
    pub fn construction(type_name: &'static str, message: impl Into<String>) -> Self {
        DiError::Construction {
            type_name,
            message: message.into(),
        }
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout arbor-di.
pub type DiResult<T> = Result<T, DiError>;
