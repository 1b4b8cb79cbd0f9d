//! Binding descriptors for introspection and diagnostics.

use crate::container::Container;
use crate::resolver::StrategyKind;

/// Snapshot of one local binding of a container.
///
/// # Use Cases
///
/// - **Debugging**: inspect what a scope has bound and how
/// - **Health checks**: verify container configuration at startup
/// - **Export**: serialize the binding table (with the `serde` feature)
///
/// # Examples
///
/// ```rust
/// use arbor_di::{Container, Key, Registration, Registrant, StrategyKind};
///
/// let container = Container::new();
/// container
///     .register([
///         Registrant::from(Registration::instance(Key::name("port"), 80u16)),
///         Registrant::from(Registration::instance(Key::name("port"), 443u16)),
///         Registrant::from(Registration::alias(Key::name("port"), Key::name("element:port"))),
///     ])
///     .unwrap();
///
/// let descriptors = container.descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let port = descriptors.iter().find(|d| d.key == "port").unwrap();
/// assert_eq!(port.strategy, StrategyKind::Multi);
/// assert_eq!(port.entries, 2);
///
/// let alias = descriptors.iter().find(|d| d.key == "element:port").unwrap();
/// assert!(alias.resource);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BindingDescriptor {
    /// Display name of the key
    pub key: String,
    /// Current strategy of the binding
    pub strategy: StrategyKind,
    /// Number of entries for multi-bindings, 1 otherwise
    pub entries: usize,
    /// Whether the binding is released by `dispose_resolvers`
    pub disposable: bool,
    /// Whether the key is a namespaced resource key
    pub resource: bool,
}

impl Container {
    /// Descriptors of this container's own bindings, sorted by key name.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        let mut descriptors: Vec<BindingDescriptor> = self
            .local_bindings()
            .into_iter()
            .map(|(key, resolver)| BindingDescriptor {
                key: key.to_string(),
                strategy: resolver.kind(),
                entries: if resolver.is_multi() {
                    resolver.entries().len()
                } else {
                    1
                },
                disposable: self.is_disposable(&resolver),
                resource: key.is_resource(),
            })
            .collect();
        descriptors.sort_by(|a, b| a.key.cmp(&b.key));
        descriptors
    }
}
