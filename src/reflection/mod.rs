//! Type metadata.
//!
//! The container never inspects Rust types directly. It asks a [`Reflector`]
//! for descriptors by name, and memoizes what it derives from them in a
//! [`MetadataCache`].

mod cache;
mod catalog;

pub use cache::{ConstructorInfo, MetadataCache, MethodInfo};
pub use catalog::Catalog;

use std::sync::Arc;

use crate::models::{ClassDef, FunctionDef};

/// Source of type and function descriptors.
///
/// Lookups are case-insensitive and ignore a leading namespace separator.
pub trait Reflector: Send + Sync {
    fn class(&self, name: &str) -> Option<Arc<ClassDef>>;

    fn function(&self, name: &str) -> Option<Arc<FunctionDef>>;
}
