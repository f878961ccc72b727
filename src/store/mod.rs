//! Configuration store.
//!
//! Holds the wiring an [`Injector`](crate::injector::Injector) resolves
//! against: aliases, shared instances, delegates, per-type definitions,
//! global parameter defaults and post-construction mutators. Every map is
//! keyed by normalized type name, except global parameter defaults which are
//! keyed by parameter name.
//!
//! The store holds a single value per key. It does not validate callables;
//! the injector checks executability before registering delegates and
//! prepares.

mod inspect;

pub use inspect::{Category, Inspection};

use std::collections::{BTreeMap, HashMap};

use crate::error::ConfigurationError;
use crate::models::{normalize_name, Definition, Invokable, Object, Value};

/// Factory replacing construction of a type.
#[derive(Debug, Clone)]
pub struct Delegate {
    pub target: Invokable,
    /// Preset arguments, overlaid by call-time overrides.
    pub args: Definition,
}

/// Container configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    /// Normalized name to the alias target as given.
    aliases: HashMap<String, String>,
    /// `None` marks a type shared but not built yet.
    shares: HashMap<String, Option<Object>>,
    delegates: HashMap<String, Delegate>,
    definitions: HashMap<String, Definition>,
    params: HashMap<String, Value>,
    prepares: HashMap<String, Vec<Invokable>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Substitutes `target` for every request of `original`.
    ///
    /// A pending share of `original` moves to `target` unless `target` is
    /// already shared; a shared instance of `original` prevents the alias.
    pub fn alias(&mut self, original: &str, target: &str) -> Result<(), ConfigurationError> {
        if original.is_empty() || target.is_empty() {
            return Err(ConfigurationError::EmptyAlias);
        }

        let original = normalize_name(original);
        let normalized_target = normalize_name(target);

        // A name whose current target holds a shared instance stays pointed
        // at it.
        let current = self
            .aliases
            .get(&original)
            .map(|current| normalize_name(current))
            .filter(|current| *current != normalized_target);
        let shared = self
            .shares
            .get(&original)
            .or_else(|| current.and_then(|current| self.shares.get(&current)));

        if let Some(Some(instance)) = shared {
            return Err(ConfigurationError::SharedCannotAlias {
                shared: normalize_name(instance.class()),
                alias: target.to_string(),
            });
        }

        self.aliases.insert(original.clone(), target.to_string());
        if let Some(pending) = self.shares.remove(&original) {
            self.shares.entry(normalized_target).or_insert(pending);
        }
        Ok(())
    }

    /// Marks a type shared; its first construction is cached. Sharing a type
    /// that is already shared keeps the existing instance.
    pub fn share_class(&mut self, name: &str) -> Result<(), ConfigurationError> {
        if name.is_empty() {
            return Err(ConfigurationError::EmptyShare);
        }

        let (_, normalized) = self.resolve_alias(name);
        self.shares.entry(normalized).or_insert(None);
        Ok(())
    }

    /// Shares an existing instance under its class name.
    pub fn share_object(&mut self, object: &Object) -> Result<(), ConfigurationError> {
        let class = normalize_name(object.class());

        if let Some(alias) = self.aliases.get(&class) {
            return Err(ConfigurationError::AliasedCannotShare {
                class,
                alias: alias.clone(),
            });
        }

        match self.shares.get(&class) {
            Some(Some(existing)) if !existing.ptr_eq(object) => {
                Err(ConfigurationError::DoubleShare { class })
            }
            _ => {
                self.shares.insert(class, Some(object.clone()));
                Ok(())
            }
        }
    }

    /// Stops sharing a type and drops its instance. Applies to the name as
    /// given and to its alias target, mirroring [`share_class`](Self::share_class).
    pub fn unshare(&mut self, name: &str) {
        for key in self.share_keys(name) {
            self.shares.remove(&key);
        }
    }

    /// Drops the shared instance of a type; the type stays shared.
    pub fn refresh(&mut self, name: &str) {
        for key in self.share_keys(name) {
            if let Some(slot) = self.shares.get_mut(&key) {
                *slot = None;
            }
        }
    }

    /// The normalized name and, when aliased, the normalized alias target.
    fn share_keys(&self, name: &str) -> Vec<String> {
        let normalized = normalize_name(name);
        let (_, resolved) = self.resolve_alias(name);
        if resolved == normalized {
            vec![normalized]
        } else {
            vec![normalized, resolved]
        }
    }

    pub fn delegate(&mut self, name: &str, delegate: Delegate) {
        self.delegates.insert(normalize_name(name), delegate);
    }

    /// Replaces the definition of a type.
    pub fn define(&mut self, name: &str, definition: Definition) {
        self.definitions.insert(normalize_name(name), definition);
    }

    pub fn define_param(&mut self, param: &str, value: Value) {
        self.params.insert(param.to_string(), value);
    }

    /// Adds a mutator after any already registered for the same type.
    pub fn prepare(&mut self, name: &str, mutator: Invokable) {
        self.prepares
            .entry(normalize_name(name))
            .or_default()
            .push(mutator);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Follows one alias hop. Returns the name to build and its normalized
    /// form.
    pub fn resolve_alias(&self, name: &str) -> (String, String) {
        let normalized = normalize_name(name);
        match self.aliases.get(&normalized) {
            Some(target) => (target.clone(), normalize_name(target)),
            None => (name.to_string(), normalized),
        }
    }

    pub fn is_shared(&self, normalized: &str) -> bool {
        self.shares.contains_key(normalized)
    }

    /// The instance shared under `normalized`, if one has been built.
    pub fn shared_instance(&self, normalized: &str) -> Option<&Object> {
        self.shares.get(normalized).and_then(Option::as_ref)
    }

    /// Records `object` if `normalized` is shared.
    pub fn share_if_needed(&mut self, normalized: &str, object: &Object) {
        if let Some(slot) = self.shares.get_mut(normalized) {
            *slot = Some(object.clone());
        }
    }

    pub fn delegated(&self, normalized: &str) -> Option<&Delegate> {
        self.delegates.get(normalized)
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(&normalize_name(name))
    }

    pub fn param_default(&self, param: &str) -> Option<&Value> {
        self.params.get(param)
    }

    pub fn has_prepares(&self) -> bool {
        !self.prepares.is_empty()
    }

    /// Mutators registered for exactly `normalized`, in registration order.
    pub fn prepares(&self, normalized: &str) -> &[Invokable] {
        self.prepares
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Snapshot of the selected categories, optionally restricted to one
    /// type. Global parameter defaults are only reported without a type
    /// filter.
    pub fn inspect(&self, name: Option<&str>, categories: Category) -> Inspection {
        let filter = name.map(normalize_name);
        let selected = |key: &String| filter.as_ref().map_or(true, |f| f == key);

        fn collect<'a, V: 'a, T>(
            map: &'a HashMap<String, V>,
            selected: impl Fn(&String) -> bool,
            render: impl Fn(&V) -> T,
        ) -> BTreeMap<String, T> {
            map.iter()
                .filter(|(key, _)| selected(key))
                .map(|(key, value)| (key.clone(), render(value)))
                .collect()
        }

        let mut inspection = Inspection::default();
        if categories.contains(Category::DEFINITIONS) {
            inspection.definitions = Some(collect(&self.definitions, selected, |definition| {
                definition
                    .entries()
                    .map(|(key, injection)| (key.to_string(), injection.to_string()))
                    .collect()
            }));
            if filter.is_none() {
                inspection.params = Some(
                    self.params
                        .iter()
                        .map(|(param, value)| (param.clone(), value.clone()))
                        .collect(),
                );
            }
        }
        if categories.contains(Category::DELEGATES) {
            inspection.delegates = Some(collect(&self.delegates, selected, |delegate| {
                delegate.target.describe()
            }));
        }
        if categories.contains(Category::PREPARES) {
            inspection.prepares = Some(collect(&self.prepares, selected, |mutators| {
                mutators.iter().map(Invokable::describe).collect()
            }));
        }
        if categories.contains(Category::ALIASES) {
            inspection.aliases = Some(collect(&self.aliases, selected, String::clone));
        }
        if categories.contains(Category::SHARES) {
            inspection.shares = Some(collect(&self.shares, selected, |slot| {
                slot.as_ref().map(|object| object.class().to_string())
            }));
        }
        inspection
    }
}
