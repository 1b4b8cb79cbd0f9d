//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod maps;
pub(crate) mod waits;

pub(crate) use circular::{cyclic_error, ConstructionGuard};
pub(crate) use maps::FastMap;
pub(crate) use waits::{release as release_waiters, WaitGuard};

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::AnyArc;

/// Downcast an erased value to its concrete type.
pub(crate) fn downcast<T: Any + Send + Sync>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

/// Downcast an erased value stored as `Arc<T>`, the layout used for trait objects.
pub(crate) fn downcast_dyn<T: ?Sized + Send + Sync + 'static>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}
