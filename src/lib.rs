//! # arbor-di
//!
//! Hierarchical dependency injection for Rust: a tree of containers that map keys to
//! resolvers and build instances on demand.
//!
//! ## Features
//!
//! - **Container tree**: children see every ancestor binding, ancestors never see child bindings
//! - **Resolver strategies**: instance, singleton, transient, callback, alias and multi-bindings
//! - **Just-in-time registration**: unregistered constructible types bind themselves on first use
//! - **Dependency discovery**: explicit inject lists or merged design/annotation metadata, cached per type
//! - **Shared factories**: one factory per type, shared by every container using the same catalog
//! - **Cycle detection**: re-entrant singleton construction fails with the full construction path
//! - **Thread-safe**: containers are cheap `Clone` handles, singletons are built exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_di::{Args, Container, DiResult, Injectable, Key, Metadata};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! impl Injectable for Database {
//!     fn construct(_args: Args) -> DiResult<Self> {
//!         Ok(Database { url: "postgres://localhost".to_string() })
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn metadata() -> Metadata {
//!         Metadata::new().inject([Key::class::<Database>()])
//!     }
//!
//!     fn construct(mut args: Args) -> DiResult<Self> {
//!         Ok(UserService { db: args.next()? })
//!     }
//! }
//!
//! // Nothing registered: both types are registered just-in-time as singletons.
//! let container = Container::new();
//! let users = container.get::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! assert!(Arc::ptr_eq(&users, &container.get::<UserService>().unwrap()));
//! ```
//!
//! ## Scopes
//!
//! ```rust
//! use arbor_di::{Container, Key, Registration, Registrant};
//!
//! let root = Container::new();
//! root.register([Registrant::registry(Registration::instance(Key::name("greeting"), "hello"))])
//!     .unwrap();
//!
//! let child = root.create_child();
//! child
//!     .register([Registrant::registry(Registration::instance(Key::name("greeting"), "hi"))])
//!     .unwrap();
//!
//! assert_eq!(*root.get_as::<&str>(&Key::name("greeting")).unwrap(), "hello");
//! assert_eq!(*child.get_as::<&str>(&Key::name("greeting")).unwrap(), "hi");
//! ```

// Module declarations
pub mod catalog;
pub mod class;
pub mod combinators;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod discovery;
pub mod error;
pub mod factory;
pub mod interface;
pub mod key;
pub mod lifetime;
pub mod metadata;
pub mod observer;
pub mod registration;
pub mod resolver;
pub mod resource;
pub mod traits;

// Internal modules
mod internal;

use std::any::Any;
use std::sync::Arc;

/// Type-erased shared value produced by every resolution.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

// Re-export core types
pub use catalog::TypeCatalog;
pub use class::Class;
pub use combinators::{all, lazy, optional, All, KeyResolver, Lazy, Optional};
pub use config::{ContainerConfig, DefaultResolver};
pub use container::{Container, ContainerId, Registrant};
pub use descriptors::BindingDescriptor;
pub use discovery::get_dependencies;
pub use error::{ConfigurationError, DiError, DiResult};
pub use factory::{Factory, Transformer};
pub use interface::{Interface, ResolverBuilder};
pub use key::Key;
pub use lifetime::Lifetime;
pub use metadata::{DependencyList, Metadata};
pub use observer::{ContainerObserver, Observers, TracingObserver};
pub use registration::Registration;
pub use resolver::{Callback, Resolver, StrategyKind};
pub use resource::ResourceDefinition;
pub use traits::{Args, Dispose, Injectable, Registrable, ResourceProvider};

/// Commonly used items in one import.
pub mod prelude {
    pub use crate::{
        all, lazy, optional, AnyArc, Args, Class, Container, ContainerConfig, DefaultResolver,
        DependencyList, DiError, DiResult, Injectable, Interface, Key, Metadata, Registrable,
        Registrant, Registration, Resolver,
    };
    pub use std::sync::Arc;
}
