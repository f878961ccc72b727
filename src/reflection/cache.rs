//! Memoized metadata derived from descriptors.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{normalize_name, ClassDef, FunctionDef, MethodDef, ParamSpec, Visibility};
use crate::reflection::Reflector;

/// Effective constructor of a type.
#[derive(Debug, Clone)]
pub struct ConstructorInfo {
    /// Name of the type that physically declares the constructor; an
    /// ancestor when the type inherits it.
    pub declared_in: String,
    pub params: Arc<[ParamSpec]>,
    pub visibility: Visibility,
}

/// A method found on a type or one of its ancestors.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub declared_in: String,
    pub method: Arc<MethodDef>,
}

/// Per-container cache over a [`Reflector`].
///
/// Entries live as long as the cache; descriptors are assumed not to change
/// after the container is built.
pub struct MetadataCache {
    reflector: Arc<dyn Reflector>,
    constructors: HashMap<String, Option<Arc<ConstructorInfo>>>,
    methods: HashMap<(String, String), Option<Arc<MethodInfo>>>,
    functions: HashMap<String, Option<Arc<FunctionDef>>>,
    capabilities: HashMap<String, Arc<[String]>>,
}

impl MetadataCache {
    pub fn new(reflector: Arc<dyn Reflector>) -> Self {
        Self {
            reflector,
            constructors: HashMap::new(),
            methods: HashMap::new(),
            functions: HashMap::new(),
            capabilities: HashMap::new(),
        }
    }

    pub fn class(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.reflector.class(name)
    }

    /// The free function registered under `name`. Misses are cached too.
    pub fn function(&mut self, name: &str) -> Option<Arc<FunctionDef>> {
        let key = normalize_name(name);
        if let Some(cached) = self.functions.get(&key) {
            return cached.clone();
        }

        let function = self.reflector.function(name);
        tracing::trace!(function = %key, found = function.is_some(), "Cached function");
        self.functions.insert(key, function.clone());
        function
    }

    /// The class itself followed by its ancestors, nearest first.
    ///
    /// Stops at the first parent missing from the reflector, and at a repeated
    /// name so a malformed hierarchy cannot loop.
    fn lineage(&self, class: Arc<ClassDef>) -> Vec<Arc<ClassDef>> {
        let mut seen = HashSet::new();
        let mut lineage = Vec::new();
        let mut current = Some(class);
        while let Some(class) = current {
            if !seen.insert(normalize_name(class.name())) {
                break;
            }
            current = class.parent().and_then(|parent| self.reflector.class(parent));
            lineage.push(class);
        }
        lineage
    }

    /// The constructor `class` declares or inherits, or `None` if neither the
    /// type nor any ancestor declares one.
    pub fn constructor(&mut self, class: &Arc<ClassDef>) -> Option<Arc<ConstructorInfo>> {
        let key = normalize_name(class.name());
        if let Some(cached) = self.constructors.get(&key) {
            return cached.clone();
        }

        let info = self.lineage(Arc::clone(class)).into_iter().find_map(|ancestor| {
            ancestor.own_constructor().map(|constructor| {
                Arc::new(ConstructorInfo {
                    declared_in: ancestor.name().to_string(),
                    params: Arc::clone(&constructor.params),
                    visibility: constructor.visibility,
                })
            })
        });
        tracing::trace!(
            class = %key,
            declared_in = info.as_ref().map(|i| i.declared_in.as_str()),
            "Cached constructor"
        );
        self.constructors.insert(key, info.clone());
        info
    }

    /// Looks `method` up on `class` and then its ancestors.
    pub fn method(&mut self, class: &str, method: &str) -> Option<Arc<MethodInfo>> {
        let key = (normalize_name(class), method.to_lowercase());
        if let Some(cached) = self.methods.get(&key) {
            return cached.clone();
        }

        let info = self.reflector.class(class).and_then(|class| {
            self.lineage(class).into_iter().find_map(|ancestor| {
                ancestor.own_method(method).map(|found| {
                    Arc::new(MethodInfo {
                        declared_in: ancestor.name().to_string(),
                        method: Arc::clone(found),
                    })
                })
            })
        });
        tracing::trace!(class = %key.0, method = %key.1, found = info.is_some(), "Cached method");
        self.methods.insert(key, info.clone());
        info
    }

    /// Normalized names of everything `class` is: its ancestors, then every
    /// interface it or an ancestor implements, including inherited
    /// interfaces. The class's own name is not included.
    pub fn capabilities(&mut self, class: &str) -> Arc<[String]> {
        let key = normalize_name(class);
        if let Some(cached) = self.capabilities.get(&key) {
            return Arc::clone(cached);
        }

        let mut seen = HashSet::from([key.clone()]);
        let mut capabilities = Vec::new();
        let lineage = self
            .reflector
            .class(class)
            .map(|class| self.lineage(class))
            .unwrap_or_default();

        for ancestor in lineage.iter().skip(1) {
            let name = normalize_name(ancestor.name());
            if seen.insert(name.clone()) {
                capabilities.push(name);
            }
        }

        let mut pending: Vec<String> = lineage
            .iter()
            .flat_map(|ancestor| ancestor.interfaces().iter().cloned())
            .collect();
        let mut next = 0;
        while next < pending.len() {
            let name = normalize_name(&pending[next]);
            next += 1;
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(interface) = self.reflector.class(&name) {
                pending.extend(interface.parent().map(str::to_string));
                pending.extend(interface.interfaces().iter().cloned());
            }
            capabilities.push(name);
        }

        let capabilities: Arc<[String]> = capabilities.into();
        tracing::trace!(class = %key, count = capabilities.len(), "Cached capabilities");
        self.capabilities.insert(key, Arc::clone(&capabilities));
        capabilities
    }

    /// True when an instance of `class` satisfies `capability`.
    pub fn is_a(&mut self, class: &str, capability: &str) -> bool {
        let capability = normalize_name(capability);
        normalize_name(class) == capability
            || self.capabilities(class).iter().any(|c| *c == capability)
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("functions", &self.functions.len())
            .field("capabilities", &self.capabilities.len())
            .finish_non_exhaustive()
    }
}
