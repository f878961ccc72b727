//! Parameter provisioning.
//!
//! Each declared parameter takes the first value available from, in order:
//!
//! 1. a positional override for its position,
//! 2. a named override (call-time overrides win over the type's definition),
//! 3. `make` of its declared type, falling back to its default or null when
//!    the type cannot be built and the parameter accepts that,
//! 4. the global default for its name, when it is untyped,
//! 5. its declared default.
//!
//! A parameter with none of these is undefined. A variadic parameter takes
//! every positional override from its position on, or failing that at most
//! one value, and is never undefined.

use crate::context::ResolutionContext;
use crate::error::InjectorError;
use crate::injector::Injector;
use crate::models::{Arguments, Definition, Injection, ParamSpec, Value};

impl Injector {
    /// Resolves the argument list for `params`.
    ///
    /// `function` and `declared_in` only feed diagnostics.
    pub(crate) fn provision_args(
        &mut self,
        params: &[ParamSpec],
        definition: &Definition,
        function: &str,
        declared_in: Option<&str>,
        context: &mut ResolutionContext,
    ) -> Result<Arguments, InjectorError> {
        let mut values = Vec::with_capacity(params.len());
        for param in params {
            if param.variadic {
                values.extend(self.provision_variadic(param, definition, context)?);
                break;
            }
            let value = self.provision_param(param, definition, function, declared_in, context)?;
            tracing::trace!(function, param = %param.name, position = param.position, "Provisioned parameter");
            values.push(value);
        }
        Ok(Arguments::new(values))
    }

    fn provision_param(
        &mut self,
        param: &ParamSpec,
        definition: &Definition,
        function: &str,
        declared_in: Option<&str>,
        context: &mut ResolutionContext,
    ) -> Result<Value, InjectorError> {
        if let Some(value) = definition.positional(param.position) {
            return Ok(value.clone());
        }

        if let Some(injection) = definition.named(&param.name) {
            return self.inject(injection, &param.name, context);
        }

        if let Some(class) = &param.class {
            return self.provision_typed(param, class, context);
        }

        if let Some(value) = self.store.param_default(&param.name) {
            return Ok(value.clone());
        }

        if let Some(default) = &param.default {
            return Ok(default.clone());
        }

        Err(InjectorError::UndefinedParameter {
            param: param.name.clone(),
            position: param.position,
            function: function.to_string(),
            declared_in: declared_in.map(str::to_string),
            chain: context.chain(),
        })
    }

    fn provision_variadic(
        &mut self,
        param: &ParamSpec,
        definition: &Definition,
        context: &mut ResolutionContext,
    ) -> Result<Vec<Value>, InjectorError> {
        let tail: Vec<Value> = definition.positional_from(param.position).cloned().collect();
        if !tail.is_empty() {
            return Ok(tail);
        }

        if let Some(injection) = definition.named(&param.name) {
            return Ok(vec![self.inject(injection, &param.name, context)?]);
        }

        if let Some(class) = &param.class {
            let depth = context.depth();
            return match self.make_in(class, &Definition::new(), context) {
                Ok(object) => Ok(vec![Value::Object(object)]),
                Err(err) if err.is_unresolvable() => {
                    context.truncate(depth);
                    Ok(Vec::new())
                }
                Err(err) => Err(err),
            };
        }

        Ok(self
            .store
            .param_default(&param.name)
            .cloned()
            .into_iter()
            .collect())
    }

    /// Builds a typed parameter. A failure meaning the type cannot be built
    /// is absorbed when the parameter is nullable or has a default.
    fn provision_typed(
        &mut self,
        param: &ParamSpec,
        class: &str,
        context: &mut ResolutionContext,
    ) -> Result<Value, InjectorError> {
        let depth = context.depth();
        match self.make_in(class, &Definition::new(), context) {
            Ok(object) => Ok(Value::Object(object)),
            Err(err) if err.is_unresolvable() && (param.allows_null() || param.has_default()) => {
                context.truncate(depth);
                tracing::warn!(
                    param = %param.name,
                    class,
                    error = %err,
                    "Falling back to default for unresolvable parameter"
                );
                Ok(param.default.clone().unwrap_or_default())
            }
            Err(err) => Err(err),
        }
    }

    /// Produces the value of a named injection.
    fn inject(
        &mut self,
        injection: &Injection,
        param: &str,
        context: &mut ResolutionContext,
    ) -> Result<Value, InjectorError> {
        match injection {
            Injection::Raw(value) => Ok(value.clone()),
            Injection::Delegate(target) => {
                let executable = self.build_executable_in(target, context)?;
                executable
                    .call(Arguments::new(vec![Value::from(param)]))
                    .map_err(InjectorError::Raised)
            }
            Injection::Define(class, overrides) => {
                self.make_in(class, overrides, context).map(Value::Object)
            }
            Injection::Class(class) => self
                .make_in(class, &Definition::new(), context)
                .map(Value::Object),
        }
    }
}
