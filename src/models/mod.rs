//! Data model shared by the reflection layer, the configuration store and the
//! resolution engine.

mod definition;
mod descriptor;
mod invokable;
mod name;
mod value;

pub use definition::{Definition, Injection, ParamKey};
pub use descriptor::{
    ClassDef, ClassKind, ConstructorDef, FunctionDef, Instantiator, MethodBody, MethodDef,
    ParamSpec, Visibility,
};
pub use invokable::{Arguments, Callable, FunctionBody, Invokable, Receiver, INVOKE_METHOD};
pub use name::{normalize_name, NAMESPACE_SEPARATOR};
pub use value::{Object, Value};
