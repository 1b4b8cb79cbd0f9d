//! Core traits for the dependency injection container.

mod dispose;
mod injectable;
mod registrable;

pub use dispose::Dispose;
pub use injectable::{Args, Injectable};
pub use registrable::{Registrable, ResourceProvider};
