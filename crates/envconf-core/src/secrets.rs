//! Secret materialization with per-role overrides.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::role::ContextRole;
use crate::value::deep_merge;

/// Payload key holding per-role overrides inside a secret document.
pub const ENVS_OVERRIDE_KEY: &str = "envs";

/// Backend that fetches one secret document per path.
///
/// Implementations wrap transport failures in [`Error::SecretFetch`]
/// themselves so the path that failed survives into the message.
pub trait SecretReader: Send {
    fn read(&mut self, path: &str) -> Result<Value>;
}

/// Role-aware secret cache.
///
/// Raw documents are cached per backend path, so two categories mapped to
/// the same path share a single fetch. The per-category view has the
/// [`ENVS_OVERRIDE_KEY`] block removed and the block matching the session
/// role deep-merged over the base payload.
pub struct SecretStore {
    inner: Mutex<SecretsInner>,
}

struct SecretsInner {
    role: ContextRole,
    reader: Option<Box<dyn SecretReader>>,
    /// Lower-cased category to role-adjusted payload.
    by_category: BTreeMap<String, Value>,
    /// Backend path to raw payload, overrides intact.
    by_path: HashMap<String, Value>,
}

impl SecretStore {
    /// Create a store resolving overrides for the role of `env_id`.
    pub fn new(env_id: &str) -> Self {
        Self {
            inner: Mutex::new(SecretsInner {
                role: ContextRole::from_env_id(env_id),
                reader: None,
                by_category: BTreeMap::new(),
                by_path: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SecretsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject the secret backend.
    pub fn set_reader(&self, reader: Box<dyn SecretReader>) {
        self.lock().reader = Some(reader);
    }

    /// Map `category` to the document at `path` and materialize it now.
    ///
    /// Re-requiring a category re-applies the role override from the raw
    /// cache without touching the backend again.
    pub fn require_secret(&self, category: &str, path: &str) -> Result<()> {
        let mut inner = self.lock();
        let raw = inner.fetch_path(path)?;
        let adjusted = apply_role_override(raw, inner.role);
        inner
            .by_category
            .insert(category.to_lowercase(), adjusted);
        Ok(())
    }

    /// Role-adjusted payload for a required category.
    pub fn get(&self, category: &str) -> Result<Value> {
        let inner = self.lock();
        inner
            .by_category
            .get(&category.to_lowercase())
            .cloned()
            .ok_or_else(|| Error::UnknownSecret {
                category: category.to_string(),
            })
    }

    /// Raw payload straight from the backend, overrides intact.
    pub fn get_by_path(&self, path: &str) -> Result<Value> {
        self.lock().fetch_path(path)
    }
}

impl SecretsInner {
    fn fetch_path(&mut self, path: &str) -> Result<Value> {
        if let Some(payload) = self.by_path.get(path) {
            debug!(path = %path, "secret cache hit");
            return Ok(payload.clone());
        }
        let reader = self.reader.as_mut().ok_or(Error::ReaderNotInjected)?;
        let payload = reader.read(path)?;
        debug!(path = %path, "secret fetched");
        self.by_path.insert(path.to_string(), payload.clone());
        Ok(payload)
    }
}

/// Strip the override block and merge the entry for `role` over the base.
///
/// The block is removed whether or not it contains an entry for the
/// current role; secrets handed to the application never expose sibling
/// environments' values.
fn apply_role_override(mut payload: Value, role: ContextRole) -> Value {
    let overrides = match payload.as_object_mut() {
        Some(map) => map.shift_remove(ENVS_OVERRIDE_KEY),
        None => None,
    };
    if let Some(overrides) = overrides {
        if let Some(override_tree) = overrides.get(role.as_str()) {
            debug!(role = %role, "applying secret role override");
            deep_merge(&mut payload, override_tree);
        }
    }
    payload
}
