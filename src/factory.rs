//! Shared per-type factories.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::class::Class;
use crate::container::Container;
use crate::error::{ConfigurationError, DiResult};
use crate::internal::ConstructionGuard;
use crate::metadata::DependencyList;
use crate::AnyArc;

/// Post-construction hook. Each transformer receives the previous result and returns
/// the value passed on, so a transformer may wrap or replace the instance.
pub type Transformer = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

/// Constructs instances of one type.
///
/// Dependencies are resolved from the container handed to [`construct`](Self::construct),
/// so the same factory builds scope-appropriate instances for every container. The
/// transformer list lives here, which makes transformers apply to every container
/// sharing the catalog.
pub struct Factory {
    class: Class,
    dependencies: Arc<DependencyList>,
    transformers: RwLock<Vec<Transformer>>,
}

impl Factory {
    pub(crate) fn new(class: Class, dependencies: Arc<DependencyList>) -> Self {
        Self {
            class,
            dependencies,
            transformers: RwLock::new(Vec::new()),
        }
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn dependencies(&self) -> &DependencyList {
        &self.dependencies
    }

    /// Builds an instance, resolving static dependencies from `container` and appending
    /// `dynamic` arguments after them.
    pub fn construct(&self, container: &Container, dynamic: Vec<AnyArc>) -> DiResult<AnyArc> {
        let _guard = ConstructionGuard::enter(self.class.name())?;

        let mut args = Vec::with_capacity(self.dependencies.len() + dynamic.len());
        for (index, key) in self.dependencies.keys().iter().enumerate() {
            let key = key.as_ref().ok_or(ConfigurationError::MissingDependency {
                type_name: self.class.name(),
                index,
            })?;
            args.push(container.resolve_any(key)?);
        }
        args.extend(dynamic);

        let mut instance = self
            .class
            .instantiate(crate::traits::Args::new(self.class.name(), args))?;

        // Cloned out so a transformer can register further transformers.
        let transformers = self.transformers.read().clone();
        for transform in &transformers {
            instance = transform(instance)?;
        }
        Ok(instance)
    }

    pub fn register_transformer(&self, transformer: Transformer) {
        self.transformers.write().push(transformer);
    }

    pub fn transformer_count(&self) -> usize {
        self.transformers.read().len()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("class", &self.class)
            .field("dependencies", &self.dependencies.len())
            .field("transformers", &self.transformer_count())
            .finish()
    }
}
