//! Instance lifetimes for type bindings.

/// How long a constructed instance lives.
///
/// - **Singleton**: built once per binding, then cached on the resolver
/// - **Transient**: built on every request
///
/// A singleton is per binding, not per process: the same type bound in two sibling
/// containers yields two instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Lifetime {
    #[default]
    Singleton,
    Transient,
}
