//! The resolution engine.
//!
//! [`Injector`] builds instances by name. For each request it follows the
//! configured alias, returns a shared instance if one exists, and otherwise
//! either invokes the type's delegate or reflects its constructor and
//! provisions every parameter, recursing into `make` for typed parameters.
//! Freshly built instances pass through the registered prepares before they
//! are shared and returned.
//!
//! # Example
//!
//! ```ignore
//! let catalog = Catalog::new()
//!     .with_class(ClassDef::interface("app::Transport"))
//!     .with_class(ClassDef::concrete("app::Smtp").implements("app::Transport"))
//!     .with_class(
//!         ClassDef::concrete("app::Mailer")
//!             .constructor([ParamSpec::typed("transport", "app::Transport")])
//!             .instantiate(|args| Ok(Mailer { transport: args.get(0)? })),
//!     );
//!
//! let mut injector = Injector::new(catalog);
//! injector.alias("app::Transport", "app::Smtp")?.share("app::Smtp")?;
//!
//! let mailer = injector.make("app::Mailer")?;
//! ```

mod executable;
mod provision;

pub use executable::Executable;

use std::sync::Arc;

use crate::context::ResolutionContext;
use crate::di::{FromValue, Injectable};
use crate::error::{ConfigurationError, InjectorError};
use crate::models::{normalize_name, Arguments, Definition, Invokable, Object, Value, Visibility};
use crate::reflection::{MetadataCache, Reflector};
use crate::store::{Category, ConfigStore, Delegate, Inspection};

/// Inversion-of-control container.
///
/// Configuration and resolution both take `&mut self`, so configuration
/// cannot change while a resolution is running. Each top-level call to
/// [`make`](Self::make) or [`execute`](Self::execute) tracks its own
/// in-flight stack.
#[derive(Debug)]
pub struct Injector {
    store: ConfigStore,
    cache: MetadataCache,
}

impl Injector {
    /// Creates an injector over the given descriptor source.
    pub fn new(reflector: impl Reflector + 'static) -> Self {
        Self::from_reflector(Arc::new(reflector))
    }

    pub fn from_reflector(reflector: Arc<dyn Reflector>) -> Self {
        Self {
            store: ConfigStore::new(),
            cache: MetadataCache::new(reflector),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Builds `target` whenever `original` is requested.
    pub fn alias(&mut self, original: &str, target: &str) -> Result<&mut Self, InjectorError> {
        self.store.alias(original, target)?;
        tracing::debug!(original, alias = target, "Alias registered");
        Ok(self)
    }

    /// Shares a type: its first construction is cached and returned by every
    /// later `make`.
    pub fn share(&mut self, name: &str) -> Result<&mut Self, InjectorError> {
        self.store.share_class(name)?;
        tracing::debug!(class = name, "Class shared");
        Ok(self)
    }

    /// Shares an existing instance under its class name.
    pub fn share_instance(&mut self, object: &Object) -> Result<&mut Self, InjectorError> {
        self.store.share_object(object)?;
        tracing::debug!(class = object.class(), "Instance shared");
        Ok(self)
    }

    /// Stops sharing a type.
    pub fn unshare(&mut self, name: &str) -> &mut Self {
        self.store.unshare(name);
        tracing::debug!(class = name, "Class unshared");
        self
    }

    /// Stops sharing the class of `object`.
    pub fn unshare_instance(&mut self, object: &Object) -> &mut Self {
        self.unshare(object.class())
    }

    /// Drops the shared instance of a type so the next `make` builds a new
    /// one. The type stays shared.
    pub fn refresh(&mut self, name: &str) -> &mut Self {
        self.store.refresh(name);
        tracing::debug!(class = name, "Shared instance refreshed");
        self
    }

    pub fn refresh_instance(&mut self, object: &Object) -> &mut Self {
        self.refresh(object.class())
    }

    /// Replaces construction of `name` with a call to `target`.
    pub fn delegate(
        &mut self,
        name: &str,
        target: impl Into<Invokable>,
    ) -> Result<&mut Self, InjectorError> {
        self.delegate_with(name, target, Definition::new())
    }

    /// Like [`delegate`](Self::delegate), with preset arguments for the
    /// delegate's parameters.
    pub fn delegate_with(
        &mut self,
        name: &str,
        target: impl Into<Invokable>,
        args: Definition,
    ) -> Result<&mut Self, InjectorError> {
        let target = target.into();
        if !self.is_executable(&target) {
            return Err(ConfigurationError::InvalidDelegate {
                target: target.describe(),
            }
            .into());
        }
        tracing::debug!(class = name, delegate = %target.describe(), "Delegate registered");
        self.store.delegate(name, Delegate { target, args });
        Ok(self)
    }

    /// Sets the parameter definition of a type, replacing any previous one.
    pub fn define(&mut self, name: &str, definition: Definition) -> &mut Self {
        tracing::debug!(class = name, entries = definition.len(), "Definition registered");
        self.store.define(name, definition);
        self
    }

    /// Sets the value injected into untyped parameters named `param` that have
    /// no other definition.
    pub fn define_param(&mut self, param: &str, value: impl Into<Value>) -> &mut Self {
        tracing::debug!(param, "Parameter default registered");
        self.store.define_param(param, value.into());
        self
    }

    /// Registers a mutator run on every new instance of `name`, its subtypes
    /// and its implementors. The mutator receives the instance; an instance it
    /// returns replaces the original.
    pub fn prepare(
        &mut self,
        name: &str,
        mutator: impl Into<Invokable>,
    ) -> Result<&mut Self, InjectorError> {
        let mutator = mutator.into();
        if !self.is_executable(&mutator) {
            return Err(ConfigurationError::InvalidPrepare {
                target: mutator.describe(),
            }
            .into());
        }
        tracing::debug!(class = name, mutator = %mutator.describe(), "Prepare registered");
        self.store.prepare(name, mutator);
        Ok(self)
    }

    /// Snapshot of the configuration, optionally restricted to one type.
    pub fn inspect(&self, name: Option<&str>, categories: Category) -> Inspection {
        self.store.inspect(name, categories)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Builds an instance of `name`.
    pub fn make(&mut self, name: &str) -> Result<Object, InjectorError> {
        self.make_with(name, &Definition::new())
    }

    /// Builds an instance of `name` with call-time overrides for its
    /// constructor parameters. Overrides apply to this type only, not to its
    /// dependencies.
    pub fn make_with(&mut self, name: &str, overrides: &Definition) -> Result<Object, InjectorError> {
        let mut context = ResolutionContext::new();
        self.make_in(name, overrides, &mut context)
    }

    /// Builds the type registered for `T` and downcasts it.
    pub fn make_type<T: Injectable>(&mut self) -> Result<Arc<T>, InjectorError> {
        let object = self.make(T::CLASS)?;
        Arc::<T>::from_value(&Value::Object(object)).map_err(|err| InjectorError::Raised(err.into()))
    }

    pub(crate) fn make_in(
        &mut self,
        name: &str,
        overrides: &Definition,
        context: &mut ResolutionContext,
    ) -> Result<Object, InjectorError> {
        let (class, normalized) = self.store.resolve_alias(name);

        if let Some(instance) = self.store.shared_instance(&normalized) {
            tracing::debug!(class = %normalized, "Returning shared instance");
            return Ok(instance.clone());
        }

        context.enter(&normalized)?;

        let object = match self.store.delegated(&normalized).cloned() {
            Some(delegate) => self.build_delegated(&normalized, &delegate, overrides, context)?,
            None => self.build_reflected(&class, &normalized, overrides, context)?,
        };
        let object = self.apply_prepares(&normalized, object, context)?;
        self.store.share_if_needed(&normalized, &object);

        context.leave();
        Ok(object)
    }

    fn build_delegated(
        &mut self,
        normalized: &str,
        delegate: &Delegate,
        overrides: &Definition,
        context: &mut ResolutionContext,
    ) -> Result<Object, InjectorError> {
        tracing::debug!(class = normalized, delegate = %delegate.target.describe(), "Building through delegate");

        let executable = self.build_executable_in(&delegate.target, context)?;
        let args = delegate.args.merged(overrides);
        let value = self.invoke_in(&executable, &args, context)?;

        match value {
            Value::Object(object) => Ok(object),
            other => Err(InjectorError::InvalidConstructionResult {
                class: normalized.to_string(),
                kind: other.kind().to_string(),
                chain: context.chain(),
            }),
        }
    }

    fn build_reflected(
        &mut self,
        class: &str,
        normalized: &str,
        overrides: &Definition,
        context: &mut ResolutionContext,
    ) -> Result<Object, InjectorError> {
        let Some(def) = self.cache.class(class) else {
            return Err(InjectorError::ClassNotFound {
                class: class.to_string(),
                chain: context.chain(),
            });
        };

        if !def.is_instantiable() {
            return Err(InjectorError::NeedsDefinition {
                class: def.name().to_string(),
                kind: def.kind().describe(),
                chain: context.chain(),
            });
        }

        let args = match self.cache.constructor(&def) {
            None => Arguments::default(),
            Some(constructor) => {
                if constructor.visibility != Visibility::Public {
                    return Err(InjectorError::NonPublicConstructor {
                        class: def.name().to_string(),
                        chain: context.chain(),
                    });
                }
                let definition = self
                    .definition_for(normalized, &constructor.declared_in)
                    .merged(overrides);
                let function = format!("{}::new", def.name());
                self.provision_args(
                    &constructor.params,
                    &definition,
                    &function,
                    Some(&constructor.declared_in),
                    context,
                )?
            }
        };

        tracing::debug!(class = normalized, args = args.len(), "Constructing instance");
        def.new_instance(args).map_err(InjectorError::Raised)
    }

    /// The definition bound to the type itself, or to the ancestor declaring
    /// the constructor it inherits.
    fn definition_for(&self, normalized: &str, declared_in: &str) -> Definition {
        self.store
            .definition(normalized)
            .or_else(|| self.store.definition(declared_in))
            .cloned()
            .unwrap_or_default()
    }

    /// Runs the mutators registered for the requested name, the instance's
    /// class and every capability of that class, in that order.
    fn apply_prepares(
        &mut self,
        normalized: &str,
        object: Object,
        context: &mut ResolutionContext,
    ) -> Result<Object, InjectorError> {
        if !self.store.has_prepares() {
            return Ok(object);
        }

        let mut keys = vec![normalized.to_string()];
        for key in std::iter::once(normalize_name(object.class()))
            .chain(self.cache.capabilities(object.class()).iter().cloned())
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let mut candidate = object;
        for key in keys {
            for mutator in self.store.prepares(&key).to_vec() {
                let executable = self.build_executable_in(&mutator, context)?;
                let result = executable
                    .call(Arguments::new(vec![Value::Object(candidate.clone())]))
                    .map_err(InjectorError::Raised)?;
                if let Value::Object(replacement) = result {
                    if self.cache.is_a(replacement.class(), normalized) {
                        candidate = replacement;
                    }
                }
                tracing::trace!(class = normalized, key = %key, "Prepare applied");
            }
        }
        Ok(candidate)
    }
}
