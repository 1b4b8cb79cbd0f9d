//! Per-type caches shared by every container that uses the same catalog.

use std::any::TypeId;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::class::Class;
use crate::container::jit::is_intrinsic;
use crate::discovery::discover;
use crate::error::{ConfigurationError, DiResult};
use crate::factory::Factory;
use crate::internal::FastMap;
use crate::metadata::DependencyList;

static SHARED: Lazy<Arc<TypeCatalog>> = Lazy::new(|| Arc::new(TypeCatalog::new()));

/// Factory and dependency-list caches keyed by type.
///
/// Every container of a tree uses its root's catalog, so a type has one [`Factory`]
/// (and one set of transformers) no matter which container asked for it first. By
/// default all trees share [`TypeCatalog::shared`]; pass a fresh catalog through
/// [`ContainerConfig::with_catalog`](crate::ContainerConfig::with_catalog) to isolate one.
#[derive(Default)]
pub struct TypeCatalog {
    factories: RwLock<FastMap<TypeId, Arc<Factory>>>,
    dependencies: RwLock<FastMap<TypeId, Arc<DependencyList>>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide catalog.
    pub fn shared() -> Arc<TypeCatalog> {
        Arc::clone(&SHARED)
    }

    /// Discovered dependencies of `class`, computed once.
    pub fn dependencies(&self, class: &Class) -> Arc<DependencyList> {
        if let Some(list) = self.dependencies.read().get(&class.type_id()) {
            return Arc::clone(list);
        }

        // Discovery may recurse into a base type, so it runs outside the lock.
        let list = Arc::new(discover(class, self));
        let mut cache = self.dependencies.write();
        Arc::clone(cache.entry(class.type_id()).or_insert(list))
    }

    /// The factory for `class`, created on first request.
    pub fn factory(&self, class: &Class) -> DiResult<Arc<Factory>> {
        if let Some(factory) = self.factories.read().get(&class.type_id()) {
            return Ok(Arc::clone(factory));
        }

        if is_intrinsic(class.short_name()) {
            return Err(ConfigurationError::IntrinsicType {
                type_name: class.name().to_string(),
            }
            .into());
        }

        let factory = Arc::new(Factory::new(*class, self.dependencies(class)));
        let mut cache = self.factories.write();
        Ok(Arc::clone(cache.entry(class.type_id()).or_insert(factory)))
    }

    pub fn factory_count(&self) -> usize {
        self.factories.read().len()
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("factories", &self.factories.read().len())
            .field("dependencies", &self.dependencies.read().len())
            .finish()
    }
}
