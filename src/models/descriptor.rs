//! Type descriptors: the metadata the container reflects over.
//!
//! A [`ClassDef`] describes a type by name: its kind, ancestry, constructor
//! parameters, how to instantiate it once the arguments are known, and the
//! methods it exposes. Descriptors are registered in a
//! [`Catalog`](crate::reflection::Catalog), either by hand with the builder
//! methods below or through `#[derive(Injectable)]`.
//!
//! # Example
//!
//! ```ignore
//! let mailer = ClassDef::concrete("app::Mailer")
//!     .implements("app::Transport")
//!     .constructor([
//!         ParamSpec::typed("logger", "app::Logger"),
//!         ParamSpec::untyped("from").default_value("noreply@example.com"),
//!     ])
//!     .instantiate(|args| {
//!         Ok(Mailer {
//!             logger: args.get(0)?,
//!             from: args.get(1)?,
//!         })
//!     });
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::models::{Arguments, Object, Value, INVOKE_METHOD};

/// Builds an instance from a resolved argument list.
pub type Instantiator = Arc<dyn Fn(Arguments) -> Result<Object, BoxError> + Send + Sync>;

/// Body of a method; the receiver is `None` for static methods.
pub type MethodBody =
    Arc<dyn Fn(Option<&Object>, Arguments) -> Result<Value, BoxError> + Send + Sync>;

/// What kind of type a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Concrete,
    Abstract,
    Interface,
}

impl ClassKind {
    /// Human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ClassKind::Concrete => "class",
            ClassKind::Abstract => "abstract class",
            ClassKind::Interface => "interface",
        }
    }
}

/// Accessibility of a constructor or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A declared constructor or callable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub position: usize,
    /// Declared class or interface, if the parameter is typed.
    pub class: Option<String>,
    pub variadic: bool,
    pub default: Option<Value>,
    pub nullable: bool,
}

impl ParamSpec {
    /// A parameter with no declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 0,
            class: None,
            variadic: false,
            default: None,
            nullable: false,
        }
    }

    /// A parameter declared with a class or interface type.
    pub fn typed(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::untyped(name)
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the parameter as collecting all remaining arguments.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// True for nullable parameters and parameters defaulting to null.
    pub fn allows_null(&self) -> bool {
        self.nullable || matches!(self.default, Some(Value::Null))
    }

    /// Assigns ordinal positions in declaration order.
    pub(crate) fn positioned(params: impl IntoIterator<Item = ParamSpec>) -> Arc<[ParamSpec]> {
        params
            .into_iter()
            .enumerate()
            .map(|(position, param)| ParamSpec { position, ..param })
            .collect()
    }
}

/// A constructor declaration.
#[derive(Debug, Clone)]
pub struct ConstructorDef {
    pub params: Arc<[ParamSpec]>,
    pub visibility: Visibility,
}

/// A method declaration.
#[derive(Clone)]
pub struct MethodDef {
    pub name: String,
    pub params: Arc<[ParamSpec]>,
    pub is_static: bool,
    pub visibility: Visibility,
    pub body: MethodBody,
}

impl MethodDef {
    /// An instance method.
    pub fn new<F, R>(name: impl Into<String>, params: impl IntoIterator<Item = ParamSpec>, body: F) -> Self
    where
        F: Fn(&Object, Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        let name = name.into();
        let method = name.clone();
        Self {
            name,
            params: ParamSpec::positioned(params),
            is_static: false,
            visibility: Visibility::Public,
            body: Arc::new(move |receiver, args| match receiver {
                Some(receiver) => body(receiver, args).map(Into::into),
                None => Err(format!("non-static method {} requires a receiver", method).into()),
            }),
        }
    }

    /// A static method.
    pub fn new_static<F, R>(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ParamSpec>,
        body: F,
    ) -> Self
    where
        F: Fn(Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self {
            name: name.into(),
            params: ParamSpec::positioned(params),
            is_static: true,
            visibility: Visibility::Public,
            body: Arc::new(move |_, args| body(args).map(Into::into)),
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// A free function.
#[derive(Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Arc<[ParamSpec]>,
    pub body: crate::models::FunctionBody,
}

impl FunctionDef {
    pub fn new<F, R>(name: impl Into<String>, params: impl IntoIterator<Item = ParamSpec>, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self {
            name: name.into(),
            params: ParamSpec::positioned(params),
            body: Arc::new(move |args| body(args).map(Into::into)),
        }
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Descriptor of a class, abstract class or interface.
#[derive(Clone)]
pub struct ClassDef {
    name: String,
    kind: ClassKind,
    parent: Option<String>,
    interfaces: Vec<String>,
    constructor: Option<ConstructorDef>,
    instantiator: Option<Instantiator>,
    methods: HashMap<String, Arc<MethodDef>>,
}

impl ClassDef {
    fn with_kind(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            constructor: None,
            instantiator: None,
            methods: HashMap::new(),
        }
    }

    pub fn concrete(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Concrete)
    }

    pub fn abstract_class(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Abstract)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Interface)
    }

    /// Sets the parent class (or, for interfaces, the parent interface).
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declares a public constructor.
    pub fn constructor(self, params: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.constructor_with(Visibility::Public, params)
    }

    pub fn constructor_with(
        mut self,
        visibility: Visibility,
        params: impl IntoIterator<Item = ParamSpec>,
    ) -> Self {
        self.constructor = Some(ConstructorDef {
            params: ParamSpec::positioned(params),
            visibility,
        });
        self
    }

    /// Sets how the type is built once its arguments are resolved.
    ///
    /// Types registered without an instantiator are built as empty marker
    /// objects.
    pub fn instantiate<T, F>(mut self, build: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        self.instantiator = Some(Arc::new(move |args| {
            build(args).map(|value| Object::new(&class, value))
        }));
        self
    }

    /// Adds an instance method.
    pub fn method<F, R>(self, name: &str, params: impl IntoIterator<Item = ParamSpec>, body: F) -> Self
    where
        F: Fn(&Object, Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        self.with_method(MethodDef::new(name, params, body))
    }

    /// Adds a static method.
    pub fn static_method<F, R>(
        self,
        name: &str,
        params: impl IntoIterator<Item = ParamSpec>,
        body: F,
    ) -> Self
    where
        F: Fn(Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        self.with_method(MethodDef::new_static(name, params, body))
    }

    /// Makes instances of the type invokable.
    pub fn invoke<F, R>(self, params: impl IntoIterator<Item = ParamSpec>, body: F) -> Self
    where
        F: Fn(&Object, Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        self.method(INVOKE_METHOD, params, body)
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods
            .insert(method.name.to_lowercase(), Arc::new(method));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// The constructor declared by this type itself, ignoring ancestors.
    pub fn own_constructor(&self) -> Option<&ConstructorDef> {
        self.constructor.as_ref()
    }

    /// The method declared by this type itself, ignoring ancestors.
    pub fn own_method(&self, name: &str) -> Option<&Arc<MethodDef>> {
        self.methods.get(&name.to_lowercase())
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Concrete
    }

    /// Runs the instantiation primitive.
    pub fn new_instance(&self, args: Arguments) -> Result<Object, BoxError> {
        match &self.instantiator {
            Some(instantiator) => instantiator(args),
            None => Ok(Object::new(&self.name, ())),
        }
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("constructor", &self.constructor)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
