//! Error types for envconf-github

/// Result type for envconf-github operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the configuration repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-success response outside the handled status codes
    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// Transport-level failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A computed endpoint is not a valid URL
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
