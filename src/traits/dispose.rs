//! Disposal trait for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this trait for values that need structured teardown (flushing caches,
/// closing connections). Attach it to a resolver with
/// [`Resolver::on_dispose`](crate::Resolver::on_dispose) and register the resolver as
/// disposable; [`Container::dispose_resolvers`](crate::Container::dispose_resolvers)
/// then runs the hooks in LIFO order.
///
/// # Examples
///
/// ```
/// use arbor_di::{Container, Dispose, Key, Resolver};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Cache {
///     flushed: AtomicBool,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         self.flushed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let container = Container::new();
/// let key = Key::name("cache");
/// let cache = Arc::new(Cache { flushed: AtomicBool::new(false) });
/// let resolver = Resolver::instance(key.clone(), cache.clone()).on_dispose::<Cache>();
/// container.register_resolver(key, Arc::new(resolver), true).unwrap();
///
/// container.dispose_resolvers();
/// assert!(cache.flushed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}
