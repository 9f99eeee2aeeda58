//! Environment role resolution
//!
//! Maps raw environment identifiers (typically branch names) to the coarse
//! context roles the rest of the engine keys on: which `$context` block a
//! category tree selects, and which entry of a secret's `envs` override map
//! applies.

use std::fmt;

/// Branch names that map to fixed, long-lived environments.
pub const FIXED_ENVS: [&str; 5] = ["production", "dev", "develop", "qa", "staging"];

/// Prefix carried by ephemeral preview environments.
pub const DYNAMIC_PREFIX: &str = "dynamic-";

/// Default fallback environment probed when the requested one is missing upstream.
pub const DEFAULT_FALLBACK_ENV: &str = "master";

/// Coarse-grained role an environment identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextRole {
    Production,
    Development,
    Qa,
    Staging,
}

impl ContextRole {
    /// Role table: each role owns the raw identifiers that map to it.
    const TABLE: [(ContextRole, &'static [&'static str]); 4] = [
        (ContextRole::Production, &["production"]),
        (ContextRole::Development, &["dev", "develop"]),
        (ContextRole::Qa, &["qa"]),
        (ContextRole::Staging, &["staging"]),
    ];

    /// Resolve a raw environment identifier to its context role.
    ///
    /// Identifiers absent from the table (dynamic/ephemeral branches)
    /// resolve to [`ContextRole::Development`].
    pub fn from_env_id(env_id: &str) -> Self {
        for (role, names) in Self::TABLE {
            if names.contains(&env_id) {
                return role;
            }
        }
        ContextRole::Development
    }

    /// Lowercase role name, as declared in `$context` blocks and secret
    /// `envs` override keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextRole::Production => "production",
            ContextRole::Development => "dev",
            ContextRole::Qa => "qa",
            ContextRole::Staging => "staging",
        }
    }
}

impl fmt::Display for ContextRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip one leading dynamic prefix from an environment identifier.
pub fn strip_dynamic_prefix(env_id: &str) -> &str {
    env_id.strip_prefix(DYNAMIC_PREFIX).unwrap_or(env_id)
}
