//! Declarative wiring with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/autowire/wiring.toml` (XDG) or platform config dir
//! 2. Project config: `.autowire.toml`
//! 3. Environment variables: `AUTOWIRE_*`, nested with `__`
//!
//! # Example
//!
//! ```toml
//! shares = ["app::Database"]
//!
//! [aliases]
//! "app::Transport" = "app::Smtp"
//!
//! [params]
//! dsn = "postgres://localhost/app"
//!
//! [definitions."app::Mailer"]
//! logger = { class = "app::FileLogger" }
//! from = { raw = "noreply@example.com" }
//! ```
//!
//! `AUTOWIRE_PARAMS__DSN=sqlite::memory:` overrides the `dsn` parameter.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, InjectorError};
use crate::injector::Injector;
use crate::models::{Definition, Value};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Wiring applied to an [`Injector`] before use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
    /// Requested name → name actually built.
    pub aliases: BTreeMap<String, String>,
    /// Types to share.
    pub shares: Vec<String>,
    /// Global defaults for untyped parameters, by parameter name.
    pub params: BTreeMap<String, serde_json::Value>,
    /// Per-type parameter injections: class → parameter → injection.
    pub definitions: BTreeMap<String, BTreeMap<String, InjectionConfig>>,
}

/// A single parameter injection. Exactly one of the fields must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Build this type for the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Inject this value as is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// Project config file name, looked up in the working directory.
pub const PROJECT_FILE: &str = ".autowire.toml";

const ENV_PREFIX: &str = "AUTOWIRE_";

impl WiringConfig {
    /// Load wiring with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(PROJECT_FILE))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load wiring from one explicit file, with env overrides on top.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/autowire/wiring.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("autowire").join("wiring.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("autowire").join("wiring.toml"))
            .unwrap_or_default()
    }

    /// Performs the configured calls on `injector`: aliases, then shares,
    /// then parameter defaults, then definitions.
    pub fn apply(&self, injector: &mut Injector) -> Result<(), InjectorError> {
        for (original, target) in &self.aliases {
            injector.alias(original, target)?;
        }
        for name in &self.shares {
            injector.share(name)?;
        }
        for (param, raw) in &self.params {
            injector.define_param(param, raw_value(param, raw)?);
        }
        for (class, params) in &self.definitions {
            let mut definition = Definition::new();
            for (param, injection) in params {
                definition = match (&injection.class, &injection.raw) {
                    (Some(target), None) => definition.class(param.as_str(), target.as_str()),
                    (None, Some(raw)) => definition.raw(param.as_str(), raw_value(param, raw)?),
                    _ => {
                        return Err(ConfigurationError::InvalidRawValue {
                            param: param.clone(),
                            reason: "expected exactly one of `class` or `raw`".to_string(),
                        }
                        .into())
                    }
                };
            }
            injector.define(class, definition);
        }

        tracing::info!(
            aliases = self.aliases.len(),
            shares = self.shares.len(),
            params = self.params.len(),
            definitions = self.definitions.len(),
            "Wiring applied"
        );
        Ok(())
    }
}

fn raw_value(param: &str, raw: &serde_json::Value) -> Result<Value, ConfigurationError> {
    Value::try_from(raw.clone()).map_err(|err| ConfigurationError::InvalidRawValue {
        param: param.to_string(),
        reason: err.to_string(),
    })
}
