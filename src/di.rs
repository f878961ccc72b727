//! Bridging between Rust types and the container's dynamic model.
//!
//! # Overview
//!
//! - `Injectable`: a Rust type that knows its own [`ClassDef`]
//! - `FromValue`: decoding a resolved [`Value`] back into a Rust type
//! - `#[derive(Injectable)]`: generates the descriptor from a struct's fields
//!
//! # Example
//!
//! ```ignore
//! use autowire::{Catalog, Injectable, Injector};
//!
//! #[derive(Injectable)]
//! #[injectable(name = "app::Mailer", implements("app::Transport"))]
//! pub struct Mailer {
//!     logger: Arc<Logger>,             // typed: built by the container
//!     #[inject(default = "noreply@example.com")]
//!     from: String,                    // untyped with a default
//! }
//!
//! let catalog = Catalog::new().register::<Logger>().register::<Mailer>();
//! let mut injector = Injector::new(catalog);
//! let mailer: Arc<Mailer> = injector.make_type::<Mailer>()?;
//! ```

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::ArgumentError;
use crate::models::{ClassDef, Object, Value};

/// A Rust type registered with the container under a class name.
pub trait Injectable: Any + Send + Sync + Sized {
    /// Class name the type is registered under.
    const CLASS: &'static str;

    /// Descriptor of the type.
    fn class_def() -> ClassDef;
}

/// Conversion from a resolved [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ArgumentError>;
}

fn mismatch<T>(value: &Value) -> ArgumentError {
    let found = match value {
        Value::Object(object) => format!("object({})", object.class()),
        other => other.kind().to_string(),
    };
    ArgumentError::mismatch(type_name::<T>(), found)
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        Ok(value.clone())
    }
}

impl FromValue for Object {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        value.as_object().cloned().ok_or_else(|| mismatch::<Object>(value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch::<String>(other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch::<bool>(other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch::<i64>(other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch::<f64>(other)),
        }
    }
}

/// Instances decode by downcasting the object's concrete value.
impl<T: Any + Send + Sync> FromValue for Arc<T> {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        value
            .as_object()
            .and_then(Object::downcast::<T>)
            .ok_or_else(|| mismatch::<T>(value))
    }
}

/// Null decodes as `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ArgumentError> {
        match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_value(item).map_err(|err| err.at(i)))
                .collect(),
            other => Err(mismatch::<Vec<T>>(other)),
        }
    }
}

// Re-export derive macro
pub use di_macros::Injectable;
