//! Error types for resolution, configuration and argument decoding.

use thiserror::Error;

/// Error raised by user code: constructor bodies, delegates, mutators and
/// invoked methods. It travels through the container untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of an [`InjectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ClassNotFound,
    NonInstantiable,
    UndefinedParameter,
    CyclicDependency,
    BadConfiguration,
    InvalidConstructionResult,
    NotInvokable,
    /// Failure raised by user code.
    Raised,
}

/// Errors produced by [`Injector`](crate::injector::Injector).
///
/// Every resolution-time variant carries the dependency chain: the normalized
/// names of the types under construction, outermost first, at the moment the
/// failure happened.
#[derive(Error, Debug)]
pub enum InjectorError {
    #[error("Could not make {class}: Class {class} does not exist")]
    ClassNotFound { class: String, chain: Vec<String> },

    #[error("Injection definition required for {kind} {class}")]
    NeedsDefinition {
        class: String,
        kind: &'static str,
        chain: Vec<String>,
    },

    #[error("Cannot instantiate protected/private constructor in class {class}")]
    NonPublicConstructor { class: String, chain: Vec<String> },

    #[error(
        "No definition available to provision typeless parameter ${param} at position {position} in {function}(){}",
        declared_suffix(.declared_in)
    )]
    UndefinedParameter {
        param: String,
        position: usize,
        function: String,
        declared_in: Option<String>,
        chain: Vec<String>,
    },

    #[error("Detected a cyclic dependency while provisioning {class}")]
    CyclicDependency { class: String, chain: Vec<String> },

    #[error("Making {class} did not result in an object, instead result is of type '{kind}'")]
    InvalidConstructionResult {
        class: String,
        kind: String,
        chain: Vec<String>,
    },

    #[error("Invalid invokable: callable or provisional string required: {target}")]
    NotInvokable { target: String, chain: Vec<String> },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Raised(BoxError),
}

fn declared_suffix(declared_in: &Option<String>) -> String {
    declared_in
        .as_deref()
        .map(|class| format!(" declared in {}", class))
        .unwrap_or_default()
}

impl InjectorError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InjectorError::ClassNotFound { .. } => ErrorKind::ClassNotFound,
            InjectorError::NeedsDefinition { .. } => ErrorKind::NonInstantiable,
            InjectorError::NonPublicConstructor { .. } => ErrorKind::NonInstantiable,
            InjectorError::UndefinedParameter { .. } => ErrorKind::UndefinedParameter,
            InjectorError::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            InjectorError::InvalidConstructionResult { .. } => {
                ErrorKind::InvalidConstructionResult
            }
            InjectorError::NotInvokable { .. } => ErrorKind::NotInvokable,
            InjectorError::Configuration(_) => ErrorKind::BadConfiguration,
            InjectorError::Raised(_) => ErrorKind::Raised,
        }
    }

    /// Dependency chain recorded when the error was raised.
    ///
    /// Empty for configuration errors and for errors raised by user code.
    pub fn dependency_chain(&self) -> &[String] {
        match self {
            InjectorError::ClassNotFound { chain, .. }
            | InjectorError::NeedsDefinition { chain, .. }
            | InjectorError::NonPublicConstructor { chain, .. }
            | InjectorError::UndefinedParameter { chain, .. }
            | InjectorError::CyclicDependency { chain, .. }
            | InjectorError::InvalidConstructionResult { chain, .. }
            | InjectorError::NotInvokable { chain, .. } => chain,
            InjectorError::Configuration(_) | InjectorError::Raised(_) => &[],
        }
    }

    /// True when the failure means "there is no way to build this", which a
    /// nullable or defaulted parameter may absorb.
    pub fn is_unresolvable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ClassNotFound | ErrorKind::NonInstantiable | ErrorKind::UndefinedParameter
        )
    }

    /// The user error carried by [`InjectorError::Raised`], if any.
    pub fn raised(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            InjectorError::Raised(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Invalid arguments passed to the configuration operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid alias: non-empty string required at arguments 1 and 2")]
    EmptyAlias,

    #[error("Invalid share: non-empty class name required")]
    EmptyShare,

    #[error("Cannot alias class {shared} to {alias} because it is currently shared")]
    SharedCannotAlias { shared: String, alias: String },

    #[error("Cannot share class {class} because it is currently aliased to {alias}")]
    AliasedCannotShare { class: String, alias: String },

    #[error(
        "An instance of type {class} has already been shared. Cannot share another instance of the same type."
    )]
    DoubleShare { class: String },

    #[error(
        "Injector::delegate expects a valid callable or executable class::method string at Argument 2 but received '{target}'"
    )]
    InvalidDelegate { target: String },

    #[error("Invalid invokable: callable or provisional string required: {target}")]
    InvalidPrepare { target: String },

    #[error("Invalid raw value for parameter '{param}': {reason}")]
    InvalidRawValue { param: String, reason: String },
}

/// Failure to decode a [`Value`](crate::models::Value) into a Rust type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("missing argument at position {0}")]
    Missing(usize),

    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    #[error("argument at position {position}: {source}")]
    At {
        position: usize,
        #[source]
        source: Box<ArgumentError>,
    },

    #[error("JSON objects are not valid raw values")]
    JsonObject,
}

impl ArgumentError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        ArgumentError::Mismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn at(self, position: usize) -> Self {
        ArgumentError::At {
            position,
            source: Box::new(self),
        }
    }
}
