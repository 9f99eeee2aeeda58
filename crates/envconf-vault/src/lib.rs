//! Vault-backed secret reader.
//!
//! [`VaultReader`] implements [`envconf_core::SecretReader`] against the
//! Vault HTTP API: a userpass login on first use, then plain reads of
//! `v1/{path}` with the session token. Payload caching and per-environment
//! overrides are the store's concern, not this crate's.

pub mod error;
pub mod reader;

pub use error::{Error, Result};
pub use reader::{DEFAULT_ADDR, VaultReader, VaultSettings};
