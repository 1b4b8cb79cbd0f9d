//! Constructor descriptors for injectable types.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::metadata::Metadata;
use crate::traits::{Args, Injectable, Registrable};
use crate::AnyArc;

/// Runtime descriptor of an [`Injectable`] type.
///
/// A `Class` is what the container knows about a constructible type: its identity,
/// its constructor, where its dependency metadata comes from and which
/// self-registration capabilities it exposes. It is `Copy` and compares by `TypeId`.
#[derive(Clone, Copy)]
pub struct Class {
    id: TypeId,
    name: &'static str,
    construct: fn(Args) -> DiResult<AnyArc>,
    metadata: fn() -> Metadata,
    registry: fn() -> Option<Arc<dyn Registrable>>,
    resources: fn() -> Vec<Arc<dyn Registrable>>,
    register_in_requestor: bool,
}

impl Class {
    pub fn of<T: Injectable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            construct: construct_erased::<T>,
            metadata: T::metadata,
            registry: T::registry,
            resources: T::resources,
            register_in_requestor: T::REGISTER_IN_REQUESTOR,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Full type name, e.g. `my_app::services::Mailer`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment without generic arguments, e.g. `Mailer`.
    pub fn short_name(&self) -> &'static str {
        short_name(self.name)
    }

    pub fn key(&self) -> Key {
        Key::Class(*self)
    }

    pub fn metadata(&self) -> Metadata {
        (self.metadata)()
    }

    pub fn registry(&self) -> Option<Arc<dyn Registrable>> {
        (self.registry)()
    }

    pub fn resources(&self) -> Vec<Arc<dyn Registrable>> {
        (self.resources)()
    }

    pub fn registers_in_requestor(&self) -> bool {
        self.register_in_requestor
    }

    pub(crate) fn instantiate(&self, args: Args) -> DiResult<AnyArc> {
        (self.construct)(args)
    }
}

fn construct_erased<T: Injectable>(args: Args) -> DiResult<AnyArc> {
    Ok(Arc::new(T::construct(args)?))
}

pub(crate) fn short_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Class").field(&self.name).finish()
    }
}
