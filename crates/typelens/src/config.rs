//! Reflection defaults (typelens.toml)
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below. The same tables can live under `[reflect]` in a host
//! application's own config file.
//!
//! ```toml
//! [derived]
//! include_self = false
//! include_abstract = false
//!
//! [annotations]
//! inherit = true
//!
//! [invoke]
//! search_ancestors = true
//! check_constraints = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level reflection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReflectConfig {
    /// Derived type search defaults
    #[serde(default)]
    pub derived: DerivedConfig,

    /// Annotation lookup defaults
    #[serde(default)]
    pub annotations: AnnotationConfig,

    /// Invoker behavior
    #[serde(default)]
    pub invoke: InvokeConfig,
}

/// Defaults for derived type queries
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedConfig {
    /// Include the base type itself in results
    #[serde(default)]
    pub include_self: bool,

    /// Include abstract types in results
    #[serde(default)]
    pub include_abstract: bool,
}

/// Defaults for annotation queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotationConfig {
    /// Look at ancestors for inheritable annotation kinds (default: true)
    #[serde(default = "default_true")]
    pub inherit: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self { inherit: true }
    }
}

/// Invoker behavior
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvokeConfig {
    /// Resolve methods declared on ancestor types (default: true)
    #[serde(default = "default_true")]
    pub search_ancestors: bool,

    /// Enforce generic parameter constraints before invoking (default: true)
    #[serde(default = "default_true")]
    pub check_constraints: bool,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            search_ancestors: true,
            check_constraints: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct HostFile {
    #[serde(default)]
    reflect: ReflectConfig,
}

impl ReflectConfig {
    /// Load configuration from a file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read the `[reflect]` table of a host config file, or defaults if absent
    pub fn from_host_toml(content: &str) -> Result<Self, ConfigError> {
        let host: HostFile = toml::from_str(content)?;
        Ok(host.reflect)
    }
}
