//! Diagnostic observers for container resolution events.
//!
//! Observers see every top-level `resolve_any` call on a container, including the
//! nested resolutions a factory performs for its dependencies.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::DiError;
use crate::key::Key;

/// Observer trait for container resolution events.
///
/// All hooks default to no-ops, so an observer only implements what it cares about.
///
/// # Performance
///
/// Observer calls are made synchronously during resolution. Keep implementations
/// lightweight; the container skips timing entirely when no observer is attached.
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, ContainerConfig, ContainerObserver, Key, Registration, Registrant};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl ContainerObserver for Counter {
///     fn resolved(&self, _key: &Key, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counter::default());
/// let container = Container::with_config(ContainerConfig::new().with_observer(counter.clone()));
/// container
///     .register([Registrant::registry(Registration::instance(Key::name("answer"), 42u32))])
///     .unwrap();
///
/// container.resolve_any(&Key::name("answer")).unwrap();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// Called before a key is resolved.
    fn resolving(&self, _key: &Key) {}

    /// Called after a key resolved successfully.
    fn resolved(&self, _key: &Key, _duration: Duration) {}

    /// Called when resolving a key failed.
    fn failed(&self, _key: &Key, _error: &DiError) {}

    /// Called when a key was registered just-in-time.
    fn jit_registered(&self, _key: &Key) {}
}

/// Container for registered observers.
///
/// Designed to have minimal overhead when no observers are registered.
#[derive(Clone, Default)]
pub struct Observers {
    observers: Vec<Arc<dyn ContainerObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Arc<dyn ContainerObserver>) {
        self.observers.push(observer);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.failed(key, error);
        }
    }

    #[inline]
    pub(crate) fn jit_registered(&self, key: &Key) {
        for observer in &self.observers {
            observer.jit_registered(key);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}

/// Observer forwarding every event to `tracing`.
///
/// Resolutions are emitted at `trace` level, JIT registrations at `debug` and failures
/// at `warn`, all under the `arbor_di` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl ContainerObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        trace!(target: "arbor_di", key = %key, "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        trace!(target: "arbor_di", key = %key, ?duration, "resolved");
    }

    fn failed(&self, key: &Key, error: &DiError) {
        warn!(target: "arbor_di", key = %key, %error, "resolution failed");
    }

    fn jit_registered(&self, key: &Key) {
        debug!(target: "arbor_di", key = %key, "registered just-in-time");
    }
}
