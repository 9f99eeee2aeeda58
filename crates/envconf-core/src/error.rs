//! Error types for envconf-core

/// Result type for envconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during configuration and secret resolution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A template token survived processing
    #[error("could not find context data for templated value: {value}")]
    UnresolvedTemplate { value: String },

    /// An ambient context key collides with one selected from `$context`
    #[error("context key {key} is already defined by the $context declaration")]
    DuplicateContextKey { key: String },

    /// Access to a category that was never discovered or required
    #[error("unknown configuration category: {category}")]
    UnknownCategory { category: String },

    /// Access to a secret category that was never required
    #[error("unknown secret category: {category}")]
    UnknownSecret { category: String },

    /// None of the candidate environments exist upstream
    #[error("no configuration environment found, tried: {}", .tried.join(", "))]
    EnvironmentNotFound { tried: Vec<String> },

    /// The registry was used before a loader was injected
    #[error("no configuration loader has been injected")]
    LoaderNotInjected,

    /// The secret store was used before a reader was injected
    #[error("no secret reader has been injected")]
    ReaderNotInjected,

    /// Loader transport failure crossing the trait boundary
    #[error("configuration loader failure: {source}")]
    Loader { source: Source },

    /// Secret fetch failure for a storage path
    #[error("failed to fetch secret at {path}: {source}")]
    SecretFetch { path: String, source: Source },

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an upstream loader failure
    pub fn loader(source: impl Into<Source>) -> Self {
        Self::Loader {
            source: source.into(),
        }
    }

    /// Wrap an upstream secret failure for `path`
    pub fn secret_fetch(path: impl Into<String>, source: impl Into<Source>) -> Self {
        Self::SecretFetch {
            path: path.into(),
            source: source.into(),
        }
    }
}
