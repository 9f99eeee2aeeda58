//! Declared, typed environment variables.
//!
//! A process registers every environment variable it consumes up front,
//! with a description, a kind, and either a mandatory flag or a default.
//! Initialization then validates the actual environment in one pass:
//! missing mandatory variables and badly typed values fail loudly at
//! startup instead of surfacing mid-request.
//!
//! ```
//! use envconf_vars::{VarKind, VarRegistry};
//!
//! # fn main() -> envconf_vars::Result<()> {
//! let mut vars = VarRegistry::new();
//! vars.register("WORKERS", "worker pool size", VarKind::Int, Some("4"))?;
//! vars.initialize_with(|_| None)?;
//! assert_eq!(vars.get("WORKERS")?.and_then(|v| v.as_int()), Some(4));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod registry;

pub use error::{Error, Result};
pub use registry::{DUMP_TRIGGER_VAR, USAGE_TRIGGER_VAR, VarKind, VarRegistry, VarValue};
