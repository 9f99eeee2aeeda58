//! Error types for envconf-vault

/// Result type for envconf-vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the Vault API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-success response from Vault
    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// A secret response without the `data` envelope
    #[error("secret at {path} has no data envelope")]
    MissingData { path: String },

    /// Transport-level failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A computed endpoint is not a valid URL
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
