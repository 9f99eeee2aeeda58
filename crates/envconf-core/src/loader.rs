//! Loader seam between the registry and remote configuration stores.

use std::fmt;

use serde_json::Value;

use crate::error::Result;

/// Remote category source consumed by [`ConfigRegistry`](crate::ConfigRegistry).
///
/// An implementation commits to one environment during [`verify_env`] and
/// serves category listings and payloads from it afterwards. Category names
/// passed to [`load`] are the registry's lower-cased lookup keys; file
/// extensions are the implementation's concern.
///
/// [`verify_env`]: ConfigLoader::verify_env
/// [`load`]: ConfigLoader::load
pub trait ConfigLoader: Send {
    /// Probe `candidates` in order and commit the first environment that
    /// exists upstream.
    ///
    /// Returns `false` when none exist. No candidate after the first hit is
    /// probed.
    fn verify_env(&mut self, candidates: &[String]) -> Result<bool>;

    /// The committed environment identifier, empty until [`verify_env`]
    /// succeeds.
    ///
    /// [`verify_env`]: ConfigLoader::verify_env
    fn env(&self) -> &str;

    /// Names of the category files available at the committed environment.
    fn list_categories(&mut self) -> Result<Vec<String>>;

    /// Raw payload for one category.
    ///
    /// Fetch and parse failures degrade to an empty tree inside the
    /// implementation; an `Err` from this method is a transport-level
    /// failure the registry treats as fatal.
    fn load(&mut self, category: &str) -> Result<Value>;

    /// Select the path-layout revision used to locate category files.
    fn set_version(&mut self, version: u32);

    /// The active path-layout revision.
    fn version(&self) -> u32;
}

/// Opaque formatting so boxed loaders can sit inside `Debug` contexts.
impl fmt::Debug for dyn ConfigLoader + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader").finish_non_exhaustive()
    }
}
