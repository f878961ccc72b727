//! In-memory descriptor table.

use std::collections::HashMap;
use std::sync::Arc;

use crate::di::Injectable;
use crate::models::{normalize_name, ClassDef, FunctionDef};
use crate::reflection::Reflector;

/// Descriptors registered by hand or through `#[derive(Injectable)]`.
///
/// # Example
///
/// ```ignore
/// let catalog = Catalog::new()
///     .register::<Logger>()
///     .with_class(ClassDef::interface("app::Transport"))
///     .with_function(FunctionDef::new("app::now", [], |_| Ok(0i64)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    classes: HashMap<String, Arc<ClassDef>>,
    functions: HashMap<String, Arc<FunctionDef>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class descriptor, replacing any previous one of the same name.
    pub fn add_class(&mut self, class: ClassDef) -> &mut Self {
        self.classes
            .insert(normalize_name(class.name()), Arc::new(class));
        self
    }

    pub fn with_class(mut self, class: ClassDef) -> Self {
        self.add_class(class);
        self
    }

    /// Registers the descriptor generated for `T`.
    pub fn register<T: Injectable>(self) -> Self {
        self.with_class(T::class_def())
    }

    pub fn add_function(&mut self, function: FunctionDef) -> &mut Self {
        self.functions
            .insert(normalize_name(&function.name), Arc::new(function));
        self
    }

    pub fn with_function(mut self, function: FunctionDef) -> Self {
        self.add_function(function);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty()
    }
}

impl Reflector for Catalog {
    fn class(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.classes.get(&normalize_name(name)).cloned()
    }

    fn function(&self, name: &str) -> Option<Arc<FunctionDef>> {
        self.functions.get(&normalize_name(name)).cloned()
    }
}
