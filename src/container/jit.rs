//! Just-in-time registration of keys nobody bound.

use std::sync::Arc;

use tracing::debug;

use crate::config::DefaultResolver;
use crate::container::Container;
use crate::error::{ConfigurationError, DiError, DiResult};
use crate::key::Key;
use crate::resolver::Resolver;
use crate::traits::Registrable;

/// Built-in type names that are never auto-registered, matched against the last path
/// segment of the type name.
const INTRINSIC_TYPES: &[&str] = &[
    "String", "str", "bool", "char", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16",
    "i32", "i64", "i128", "isize", "f32", "f64", "Vec", "VecDeque", "HashMap", "HashSet",
    "BTreeMap", "BTreeSet", "Box", "Rc", "Arc", "Option", "Result", "Cell", "RefCell", "Mutex",
    "RwLock", "Duration", "Instant", "SystemTime", "PathBuf", "Path", "OsString",
];

pub(crate) fn is_intrinsic(short_name: &str) -> bool {
    INTRINSIC_TYPES.contains(&short_name)
}

impl Container {
    /// Where a JIT registration for `key` requested from `self` is stored.
    pub(crate) fn jit_handler(&self, key: &Key) -> &Container {
        let in_requestor = key
            .as_class()
            .is_some_and(|class| class.registers_in_requestor());
        if in_requestor || !self.config().jit_registers_in_root() {
            self
        } else {
            self.root()
        }
    }

    /// Installs a resolver for `key` on `self`, which acts as handler. `policy` is the
    /// requesting container's default resolver.
    ///
    /// Registration of one key is serialized per handler; a thread that lost the race
    /// gets the binding the winner installed.
    pub(crate) fn jit_register(
        &self,
        key: &Key,
        policy: &DefaultResolver,
    ) -> DiResult<Arc<Resolver>> {
        let lock = self.jit_lock(key);
        let _serial = lock.lock();
        if let Some(existing) = self.local_resolver(key) {
            return Ok(existing);
        }

        let resolver = match key {
            Key::Interface(interface) => {
                if !interface.has_default() {
                    return Err(ConfigurationError::NoDefault {
                        interface: interface.friendly_name().to_string(),
                    }
                    .into());
                }
                let installed = interface.register(self)?;
                self.read_back(key, installed)?
            }
            Key::Class(class) => {
                if is_intrinsic(class.short_name()) {
                    return Err(ConfigurationError::IntrinsicType {
                        type_name: class.name().to_string(),
                    }
                    .into());
                }

                if let Some(registry) = class.registry() {
                    let installed = registry.register(self)?;
                    self.read_back(key, installed)?
                } else {
                    let resources = class.resources();
                    if resources.is_empty() {
                        let synthesized = policy.resolve(key, self)?;
                        self.store_resolver(key.clone(), synthesized)
                    } else {
                        for definition in &resources {
                            definition.register(self)?;
                        }
                        self.read_back(key, None)?
                    }
                }
            }
            _ => {
                return Err(ConfigurationError::NotConstructible {
                    key: key.to_string(),
                }
                .into())
            }
        };

        debug!(key = %key, container = %self.id(), "registered just-in-time");
        self.config().observers().jit_registered(key);
        Ok(resolver)
    }

    fn read_back(&self, key: &Key, installed: Option<Arc<Resolver>>) -> DiResult<Arc<Resolver>> {
        installed
            .or_else(|| self.local_resolver(key))
            .ok_or_else(|| DiError::Protocol {
                key: key.to_string(),
            })
    }
}
