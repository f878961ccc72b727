//! Autowire - an inversion-of-control container.
//!
//! Types are described by [`ClassDef`] descriptors held in a [`Reflector`]
//! (usually a [`Catalog`]). The [`Injector`] builds instances by name,
//! recursively provisioning constructor parameters from the registered
//! configuration: aliases, shares, delegates, definitions, parameter
//! defaults and prepares.

// Lets `#[derive(Injectable)]` expand to `::autowire::...` inside this crate.
extern crate self as autowire;

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod injector;
pub mod models;
pub mod reflection;
pub mod store;

pub use config::{ConfigError, WiringConfig};
pub use context::ResolutionContext;
pub use di::{FromValue, Injectable};
pub use error::{ArgumentError, BoxError, ConfigurationError, ErrorKind, InjectorError};
pub use injector::{Executable, Injector};
pub use models::{
    Arguments, Callable, ClassDef, ClassKind, Definition, FunctionDef, Injection, Invokable,
    MethodDef, Object, ParamSpec, Value, Visibility,
};
pub use reflection::{Catalog, MetadataCache, Reflector};
pub use store::{Category, Inspection};
