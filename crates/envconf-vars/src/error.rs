//! Error types for envconf-vars

use crate::registry::VarKind;

/// Result type for envconf-vars operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while declaring or validating environment variables
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The same key was declared twice
    #[error("environment variable {key} is already registered")]
    AlreadyRegistered { key: String },

    /// A mandatory variable cannot also carry a default
    #[error("mandatory variable {key} cannot have a default value")]
    MandatoryWithDefault { key: String },

    /// A mandatory variable is absent from the environment
    #[error("missing mandatory environment variable {key} ({description})")]
    MandatoryMissing { key: String, description: String },

    /// The provided value does not parse as the declared kind
    #[error("value for {key} is expected to be {kind}, got: {value}")]
    TypeMismatch {
        key: String,
        kind: VarKind,
        value: String,
    },

    /// Lookup of a key that was never declared
    #[error("environment variable {key} was never registered")]
    UnknownVar { key: String },

    /// The registry was read before `initialize` ran
    #[error("variable registry has not been initialized")]
    NotInitialized,

    /// A kind name outside string/int/float/bool
    #[error("unknown variable kind: {value}")]
    UnknownKind { value: String },
}
