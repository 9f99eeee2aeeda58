//! Project manifest describing variables, configuration and secrets.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CliError, Result};

/// Manifest file read when `--manifest` is not supplied.
pub const DEFAULT_MANIFEST: &str = ".envconfig.yml";

/// Top-level manifest document.
///
/// ```yaml
/// env-vars:
///   COMPANY:
///     description: company name
///     type: string
///     default: Acme
/// config:
///   provider: github
///   repository: acme/configuration
///   parent_environments: [master]
///   categories: [system, global]
/// secrets:
///   required:
///     common: secret/common
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Environment variables the service consumes.
    #[serde(default, rename = "env-vars")]
    pub env_vars: BTreeMap<String, VarDecl>,

    /// Configuration store coordinates.
    #[serde(default)]
    pub config: Option<ConfigSection>,

    /// Secret requirements.
    #[serde(default)]
    pub secrets: Option<SecretsSection>,
}

/// One environment variable declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct VarDecl {
    #[serde(default)]
    pub description: String,

    /// Kind name, case-insensitive: string, int, float or bool.
    #[serde(default = "default_kind", rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub is_mandatory: bool,

    /// Default as written in the manifest; may be any YAML scalar.
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
}

impl VarDecl {
    /// Raw string form of the declared default, if any.
    pub fn default_raw(&self) -> Option<String> {
        self.default.as_ref().map(|value| match value {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        })
    }
}

fn default_kind() -> String {
    "string".to_string()
}

/// Configuration store coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Loader backend; `github` is the only built-in provider.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Configuration repository as `owner/name`.
    #[serde(default)]
    pub repository: Option<String>,

    /// Repository layout version.
    #[serde(default)]
    pub version: Option<u32>,

    /// Fallback environments consulted in declaration order.
    #[serde(default)]
    pub parent_environments: Vec<String>,

    /// Categories loaded eagerly at startup.
    #[serde(default)]
    pub categories: Vec<String>,
}

fn default_provider() -> String {
    "github".to_string()
}

/// Secret requirements, category name to backend path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsSection {
    #[serde(default)]
    pub required: BTreeMap<String, String>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                CliError::user(format!("manifest not found: {}", path.display()))
            } else {
                CliError::Io(error)
            }
        })?;
        Self::parse(&text)
    }
}
