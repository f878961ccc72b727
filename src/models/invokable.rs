//! Invocation targets and argument lists.

use std::fmt;
use std::sync::Arc;

use crate::di::FromValue;
use crate::error::{ArgumentError, BoxError};
use crate::models::{Object, ParamSpec, Value};

/// Name of the method that makes an instance invokable.
pub const INVOKE_METHOD: &str = "invoke";

/// Body of a closure or free function.
pub type FunctionBody = Arc<dyn Fn(Arguments) -> Result<Value, BoxError> + Send + Sync>;

/// Resolved positional arguments handed to a constructor, function or method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// The raw value at `position`.
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    /// Decodes the argument at `position`.
    ///
    /// A missing argument decodes as null, so optional parameters can be read
    /// as `Option<T>`.
    pub fn get<T: FromValue>(&self, position: usize) -> Result<T, ArgumentError> {
        match self.values.get(position) {
            Some(value) => T::from_value(value).map_err(|err| err.at(position)),
            None => T::from_value(&Value::Null).map_err(|_| ArgumentError::Missing(position)),
        }
    }

    /// Decodes every argument from `position` onward, for variadic parameters.
    pub fn rest<T: FromValue>(&self, position: usize) -> Result<Vec<T>, ArgumentError> {
        self.values
            .iter()
            .enumerate()
            .skip(position)
            .map(|(i, value)| T::from_value(value).map_err(|err| err.at(i)))
            .collect()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// An anonymous callable with declared parameters.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    params: Arc<[ParamSpec]>,
    body: FunctionBody,
}

impl Callable {
    pub fn new<F, R>(params: impl IntoIterator<Item = ParamSpec>, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self {
            name: Arc::from("{closure}"),
            params: ParamSpec::positioned(params),
            body: Arc::new(move |args| body(args).map(Into::into)),
        }
    }

    /// Sets the name reported in diagnostics.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Arc::from(name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Arc<[ParamSpec]> {
        &self.params
    }

    pub fn call(&self, args: Arguments) -> Result<Value, BoxError> {
        (self.body)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Receiver of a method target.
#[derive(Debug, Clone)]
pub enum Receiver {
    /// A class name; the method is static or the class is built on demand.
    Class(String),
    /// An existing instance.
    Instance(Object),
}

/// Something the container can invoke.
#[derive(Clone)]
pub enum Invokable {
    /// A closure.
    Closure(Callable),
    /// A registered function name, an invokable class name, or a
    /// `Class::method` string.
    Name(String),
    /// A method on a class or on an instance.
    Method(Receiver, String),
    /// An invokable instance.
    Object(Object),
}

impl Invokable {
    pub fn closure<F, R>(params: impl IntoIterator<Item = ParamSpec>, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
        R: Into<Value>,
    {
        Invokable::Closure(Callable::new(params, body))
    }

    /// `class`'s `method`, static or built on demand.
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Invokable::Method(Receiver::Class(class.into()), method.into())
    }

    /// `method` on an existing instance.
    pub fn on(object: Object, method: impl Into<String>) -> Self {
        Invokable::Method(Receiver::Instance(object), method.into())
    }

    /// Description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Invokable::Closure(callable) => callable.name().to_string(),
            Invokable::Name(name) => name.clone(),
            Invokable::Method(Receiver::Class(class), method) => format!("{}::{}", class, method),
            Invokable::Method(Receiver::Instance(object), method) => {
                format!("[object({}), '{}']", object.class(), method)
            }
            Invokable::Object(object) => format!("object({})", object.class()),
        }
    }
}

impl fmt::Debug for Invokable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invokable({})", self.describe())
    }
}

impl From<&str> for Invokable {
    fn from(name: &str) -> Self {
        Invokable::Name(name.to_string())
    }
}

impl From<String> for Invokable {
    fn from(name: String) -> Self {
        Invokable::Name(name)
    }
}

impl From<Callable> for Invokable {
    fn from(callable: Callable) -> Self {
        Invokable::Closure(callable)
    }
}

impl From<Object> for Invokable {
    fn from(object: Object) -> Self {
        Invokable::Object(object)
    }
}
