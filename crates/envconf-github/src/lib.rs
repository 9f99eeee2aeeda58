//! GitHub-backed configuration loader.
//!
//! Configuration lives in a git repository where branches are environments
//! and root-level `*.json` files are categories. [`GithubStore`] implements
//! [`envconf_core::ConfigLoader`] over that layout: branch existence checks
//! go through the GitHub API, category payloads come from the raw content
//! host. All requests are synchronous; startup either has its data or it
//! does not.

pub mod error;
pub mod store;

pub use error::{Error, Result};
pub use store::{GithubSettings, GithubStore};
