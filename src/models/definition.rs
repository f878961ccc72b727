//! Parameter override maps.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::models::{Invokable, Value};

/// How a single parameter should be provisioned.
#[derive(Clone)]
pub enum Injection {
    /// Inject the value verbatim.
    Raw(Value),
    /// Invoke the callable, with no further resolution, and inject its result.
    Delegate(Invokable),
    /// Build the named type with its own overrides, leaving the global
    /// definitions untouched.
    Define(String, Definition),
    /// Build the named type.
    Class(String),
}

impl fmt::Debug for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Injection::Raw(value) => write!(f, "raw {:?}", value),
            Injection::Delegate(target) => write!(f, "delegate {}", target.describe()),
            Injection::Define(class, _) => write!(f, "define {}", class),
            Injection::Class(class) => f.write_str(class),
        }
    }
}

/// Key of an override: a parameter name or an ordinal position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    Name(String),
    Position(usize),
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Name(name) => f.write_str(name),
            ParamKey::Position(position) => write!(f, "{}", position),
        }
    }
}

/// A set of parameter overrides, used both for per-type definitions and for
/// call-time overrides.
///
/// Positional entries are raw values and take precedence over named entries
/// for the parameter at that position.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    named: HashMap<String, Injection>,
    positional: BTreeMap<usize, Value>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects `value` verbatim into parameter `name`.
    pub fn raw(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, Injection::Raw(value.into()))
    }

    /// Builds `class` for parameter `name`.
    pub fn class(self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.with(name, Injection::Class(class.into()))
    }

    /// Invokes `target` to produce parameter `name`.
    pub fn delegate(self, name: impl Into<String>, target: impl Into<Invokable>) -> Self {
        self.with(name, Injection::Delegate(target.into()))
    }

    /// Builds `class` with its own `overrides` for parameter `name`.
    pub fn define(
        self,
        name: impl Into<String>,
        class: impl Into<String>,
        overrides: Definition,
    ) -> Self {
        self.with(name, Injection::Define(class.into(), overrides))
    }

    /// Injects `value` verbatim into the parameter at `position`.
    pub fn at(mut self, position: usize, value: impl Into<Value>) -> Self {
        self.positional.insert(position, value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, injection: Injection) -> Self {
        self.named.insert(name.into(), injection);
        self
    }

    pub fn named(&self, name: &str) -> Option<&Injection> {
        self.named.get(name)
    }

    pub fn positional(&self, position: usize) -> Option<&Value> {
        self.positional.get(&position)
    }

    /// Positional values at `position` and beyond, in order.
    pub fn positional_from(&self, position: usize) -> impl Iterator<Item = &Value> {
        self.positional.range(position..).map(|(_, value)| value)
    }

    /// Entries keyed by [`ParamKey`], positions first.
    pub fn entries(&self) -> impl Iterator<Item = (ParamKey, Injection)> + '_ {
        let positional = self
            .positional
            .iter()
            .map(|(position, value)| (ParamKey::Position(*position), Injection::Raw(value.clone())));
        let named = self
            .named
            .iter()
            .map(|(name, injection)| (ParamKey::Name(name.clone()), injection.clone()));
        positional.chain(named)
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }

    pub fn len(&self) -> usize {
        self.named.len() + self.positional.len()
    }

    /// Returns `self` overlaid with `overrides`; entries of `overrides` win
    /// key by key.
    pub fn merged(&self, overrides: &Definition) -> Definition {
        let mut merged = self.clone();
        for (name, injection) in &overrides.named {
            merged.named.insert(name.clone(), injection.clone());
        }
        for (position, value) in &overrides.positional {
            merged.positional.insert(*position, value.clone());
        }
        merged
    }
}
