//! Executable builder.
//!
//! Normalizes every accepted invocation target into an [`Executable`]: a
//! callable body, its receiver if any, and the parameters to provision.
//!
//! String targets are tried as a registered function, then as a class with
//! an `invoke` method, then as `Class::method` or `Class::parent::method`.

use std::fmt;
use std::sync::Arc;

use crate::context::ResolutionContext;
use crate::error::{BoxError, InjectorError};
use crate::injector::Injector;
use crate::models::{
    Arguments, Callable, Definition, FunctionDef, Invokable, MethodBody, Object, ParamSpec,
    Receiver, Value, Visibility, INVOKE_METHOD, NAMESPACE_SEPARATOR,
};
use crate::reflection::MethodInfo;

const PARENT_PREFIX: &str = "parent::";
const PARENT_SEGMENT: &str = "parent";

/// A normalized invocation target.
#[derive(Clone)]
pub struct Executable {
    name: String,
    declared_in: Option<String>,
    params: Arc<[ParamSpec]>,
    body: Body,
}

#[derive(Clone)]
enum Body {
    Function(Arc<FunctionDef>),
    Closure(Callable),
    Method {
        receiver: Option<Object>,
        body: MethodBody,
    },
}

impl Executable {
    fn method(class: &str, receiver: Option<Object>, info: &MethodInfo) -> Self {
        let method = &info.method;
        Self {
            name: format!("{}{}{}", class, NAMESPACE_SEPARATOR, method.name),
            declared_in: Some(info.declared_in.clone()),
            params: Arc::clone(&method.params),
            body: Body::Method {
                receiver: if method.is_static { None } else { receiver },
                body: Arc::clone(&method.body),
            },
        }
    }

    /// Name used in diagnostics, e.g. `app::Job::run`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type declaring the method, for methods.
    pub fn declared_in(&self) -> Option<&str> {
        self.declared_in.as_deref()
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Invokes the target with already resolved arguments.
    pub fn call(&self, args: Arguments) -> Result<Value, BoxError> {
        match &self.body {
            Body::Function(function) => (function.body)(args),
            Body::Closure(callable) => callable.call(args),
            Body::Method { receiver, body } => body(receiver.as_ref(), args),
        }
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executable")
            .field("name", &self.name)
            .field("declared_in", &self.declared_in)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// What a target resolves to before any instance is built.
enum Plan {
    Function(Arc<FunctionDef>),
    Closure(Callable),
    /// A static method; `class` is the type it was looked up on.
    Static { class: String, info: Arc<MethodInfo> },
    /// A method on an existing instance.
    Bound { receiver: Object, info: Arc<MethodInfo> },
    /// A method on an instance of `class`, built on demand. With `rebind`
    /// the method is looked up again on the built instance's class.
    Build {
        class: String,
        info: Arc<MethodInfo>,
        rebind: bool,
    },
}

fn split_parent(method: &str) -> (&str, bool) {
    match method.strip_prefix(PARENT_PREFIX) {
        Some(method) => (method, true),
        None => (method, false),
    }
}

impl Injector {
    /// Invokes `target`, provisioning its parameters.
    pub fn execute(&mut self, target: impl Into<Invokable>) -> Result<Value, InjectorError> {
        self.execute_with(target, &Definition::new())
    }

    /// Invokes `target` with call-time overrides for its parameters.
    pub fn execute_with(
        &mut self,
        target: impl Into<Invokable>,
        overrides: &Definition,
    ) -> Result<Value, InjectorError> {
        let target = target.into();
        let mut context = ResolutionContext::new();
        let executable = self.build_executable_in(&target, &mut context)?;
        self.invoke_in(&executable, overrides, &mut context)
    }

    /// Normalizes `target` without invoking it. Instance methods of classes
    /// named by string get their receiver built here.
    pub fn build_executable(
        &mut self,
        target: impl Into<Invokable>,
    ) -> Result<Executable, InjectorError> {
        let mut context = ResolutionContext::new();
        self.build_executable_in(&target.into(), &mut context)
    }

    /// True if `target` names something invokable. Never builds anything.
    pub fn is_executable(&mut self, target: &Invokable) -> bool {
        self.plan(target).is_some()
    }

    pub(crate) fn build_executable_in(
        &mut self,
        target: &Invokable,
        context: &mut ResolutionContext,
    ) -> Result<Executable, InjectorError> {
        let Some(plan) = self.plan(target) else {
            return Err(InjectorError::NotInvokable {
                target: target.describe(),
                chain: context.chain(),
            });
        };

        Ok(match plan {
            Plan::Function(function) => Executable {
                name: function.name.clone(),
                declared_in: None,
                params: Arc::clone(&function.params),
                body: Body::Function(function),
            },
            Plan::Closure(callable) => Executable {
                name: callable.name().to_string(),
                declared_in: None,
                params: Arc::clone(callable.params()),
                body: Body::Closure(callable),
            },
            Plan::Static { class, info } => Executable::method(&class, None, &info),
            Plan::Bound { receiver, info } => {
                let class = receiver.class().to_string();
                Executable::method(&class, Some(receiver), &info)
            }
            Plan::Build { class, info, rebind } => {
                let receiver = self.make_in(&class, &Definition::new(), context)?;
                let info = if rebind {
                    self.public_method(receiver.class(), &info.method.name)
                        .unwrap_or(info)
                } else {
                    info
                };
                let class = receiver.class().to_string();
                Executable::method(&class, Some(receiver), &info)
            }
        })
    }

    /// Provisions the parameters of `executable` and invokes it.
    pub(crate) fn invoke_in(
        &mut self,
        executable: &Executable,
        overrides: &Definition,
        context: &mut ResolutionContext,
    ) -> Result<Value, InjectorError> {
        let args = self.provision_args(
            executable.params(),
            overrides,
            executable.name(),
            executable.declared_in(),
            context,
        )?;
        tracing::debug!(executable = executable.name(), args = args.len(), "Executing");
        executable.call(args).map_err(InjectorError::Raised)
    }

    fn plan(&mut self, target: &Invokable) -> Option<Plan> {
        match target {
            Invokable::Closure(callable) => Some(Plan::Closure(callable.clone())),
            Invokable::Name(name) => self.plan_name(name),
            Invokable::Method(Receiver::Class(class), method) => {
                let (method, parent) = split_parent(method);
                self.plan_class_method(class, method, parent)
            }
            Invokable::Method(Receiver::Instance(object), method) => {
                let (method, parent) = split_parent(method);
                self.plan_instance_method(object, method, parent)
            }
            Invokable::Object(object) => self.plan_instance_method(object, INVOKE_METHOD, false),
        }
    }

    fn plan_name(&mut self, name: &str) -> Option<Plan> {
        if let Some(function) = self.cache.function(name) {
            return Some(Plan::Function(function));
        }

        if let Some(info) = self.public_method(name, INVOKE_METHOD) {
            let class = name.to_string();
            return Some(if info.method.is_static {
                Plan::Static { class, info }
            } else {
                Plan::Build {
                    class,
                    info,
                    rebind: true,
                }
            });
        }

        let (class, method) = name.rsplit_once(NAMESPACE_SEPARATOR)?;

        // `parent` only marks the parent form right before the method; an
        // earlier namespace segment of that name is part of the class.
        let parent_suffix = format!("{}{}", NAMESPACE_SEPARATOR, PARENT_SEGMENT);
        if let Some(child) = class.strip_suffix(&parent_suffix) {
            if let Some(plan) = self.plan_class_method(child, method, true) {
                return Some(plan);
            }
        }

        self.plan_class_method(class, method, false)
    }

    fn plan_class_method(&mut self, class: &str, method: &str, parent: bool) -> Option<Plan> {
        let (resolved, _) = self.store.resolve_alias(class);
        let lookup = if parent {
            self.cache.class(class)?.parent()?.to_string()
        } else {
            resolved.clone()
        };
        let info = self.public_method(&lookup, method)?;

        Some(if info.method.is_static {
            Plan::Static {
                class: lookup,
                info,
            }
        } else {
            Plan::Build {
                class: resolved,
                info,
                rebind: !parent,
            }
        })
    }

    fn plan_instance_method(&mut self, object: &Object, method: &str, parent: bool) -> Option<Plan> {
        let lookup = if parent {
            self.cache.class(object.class())?.parent()?.to_string()
        } else {
            object.class().to_string()
        };
        let info = self.public_method(&lookup, method)?;

        Some(if info.method.is_static {
            Plan::Static {
                class: lookup,
                info,
            }
        } else {
            Plan::Bound {
                receiver: object.clone(),
                info,
            }
        })
    }

    fn public_method(&mut self, class: &str, method: &str) -> Option<Arc<MethodInfo>> {
        self.cache
            .method(class, method)
            .filter(|info| info.method.visibility == Visibility::Public)
    }
}
