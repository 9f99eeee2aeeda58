//! Environment-aware configuration and secret resolution.
//!
//! This crate answers three questions for a running process:
//!
//! - which named environment is it running as, and what is the fallback
//!   chain when that environment has no configuration branch upstream;
//! - given a configuration category, what are its resolved key/value pairs
//!   after substituting environment-contextual `{{ token }}` placeholders;
//! - given a secret category, what is its value after layering the
//!   per-environment override onto the base payload.
//!
//! # Architecture
//!
//! ```text
//!          ConfigRegistry ---- ConfigLoader (seam, e.g. envconf-github)
//!               |
//!           EnvContext
//!               |
//!          ContextRole
//!               |
//!           SecretStore ---- SecretReader (seam, e.g. envconf-vault)
//! ```
//!
//! [`ContextRole`] maps raw environment identifiers (branch names) to coarse
//! roles. [`EnvContext`] holds one session's ambient context data and runs
//! template substitution over raw category trees. [`ConfigRegistry`]
//! discovers categories eagerly, loads them lazily through the injected
//! [`ConfigLoader`], and serves hierarchical lookups. [`SecretStore`] fetches
//! secret payloads through the injected [`SecretReader`] and applies the
//! role-keyed `envs` override.
//!
//! # Example
//!
//! ```
//! use envconf_core::{ConfigRegistry, EnvContext};
//!
//! let context = EnvContext::new("staging");
//! let registry = ConfigRegistry::new(context);
//! // a loader is injected at startup; see `ConfigRegistry::set_loader`
//! assert_eq!(registry.env_id(), "staging");
//! ```

pub mod context;
pub mod error;
pub mod loader;
pub mod registry;
pub mod role;
pub mod secrets;
pub mod value;

pub use context::{CONTEXT_DECLARATION_KEY, ENV_ROLE_KEY, EnvContext};
pub use error::{Error, Result};
pub use loader::ConfigLoader;
pub use registry::ConfigRegistry;
pub use role::{ContextRole, DEFAULT_FALLBACK_ENV, DYNAMIC_PREFIX, FIXED_ENVS};
pub use secrets::{ENVS_OVERRIDE_KEY, SecretReader, SecretStore};
pub use value::{deep_merge, flatten};
