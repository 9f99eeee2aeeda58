//! Category registry: discovery, lazy loading, and hierarchical access.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::context::EnvContext;
use crate::error::{Error, Result};
use crate::loader::ConfigLoader;
use crate::role::DEFAULT_FALLBACK_ENV;
use crate::value::flatten;

/// Environment-scoped configuration store.
///
/// Categories are discovered eagerly when a loader is injected and loaded
/// lazily after that, at most once each. Raw payloads are run through the
/// session's [`EnvContext`] before caching, so callers only ever see
/// resolved trees. All state sits behind a mutex: a registry shared across
/// threads keeps the one-fetch-per-category guarantee.
///
/// # Example
///
/// ```no_run
/// use envconf_core::{ConfigRegistry, EnvContext};
/// # fn loader() -> Box<dyn envconf_core::ConfigLoader> { unimplemented!() }
///
/// # fn main() -> envconf_core::Result<()> {
/// let registry = ConfigRegistry::new(EnvContext::new("staging"));
/// registry.set_loader(loader())?;
/// let timeout = registry.get("system", Some("api"), Some("timeout"), None)?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigRegistry {
    inner: Mutex<Inner>,
}

struct Inner {
    env_id: String,
    fallback: Vec<String>,
    context: EnvContext,
    loader: Option<Box<dyn ConfigLoader>>,
    /// Lower-cased lookup key to display name.
    categories: BTreeMap<String, String>,
    /// Lower-cased lookup key to resolved tree.
    cache: BTreeMap<String, Value>,
}

impl ConfigRegistry {
    /// Create a registry for the context's environment with the default
    /// fallback chain.
    pub fn new(context: EnvContext) -> Self {
        Self {
            inner: Mutex::new(Inner {
                env_id: context.env_id().to_string(),
                fallback: vec![DEFAULT_FALLBACK_ENV.to_string()],
                context,
                loader: None,
                categories: BTreeMap::new(),
                cache: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The environment identifier this registry resolves for.
    pub fn env_id(&self) -> String {
        self.lock().env_id.clone()
    }

    /// The environment the loader committed to, once one is injected.
    pub fn committed_env(&self) -> Option<String> {
        self.lock()
            .loader
            .as_ref()
            .map(|loader| loader.env().to_string())
    }

    /// Override the environment used for upstream verification.
    ///
    /// The session context keeps the running environment; only the branch
    /// the configuration is pulled from changes.
    pub fn set_env(&self, env_id: impl Into<String>) {
        self.lock().env_id = env_id.into();
    }

    /// Replace the fallback chain consulted at verification time.
    pub fn set_env_fallback(&self, fallback: Vec<String>) {
        self.lock().fallback = fallback;
    }

    /// Add an ambient context entry visible to subsequent category loads.
    pub fn add_context(&self, key: impl Into<String>, value: Value) {
        self.lock().context.add(key, value);
    }

    /// Inject the category loader.
    ///
    /// Verifies the environment against `[env_id] + fallback` and eagerly
    /// discovers the category names available there; their data stays
    /// unloaded until first access. Fails with
    /// [`Error::EnvironmentNotFound`] when no candidate exists upstream.
    pub fn set_loader(&self, mut loader: Box<dyn ConfigLoader>) -> Result<()> {
        let mut inner = self.lock();

        let mut candidates = vec![inner.env_id.clone()];
        candidates.extend(inner.fallback.iter().cloned());
        if !loader.verify_env(&candidates)? {
            return Err(Error::EnvironmentNotFound { tried: candidates });
        }
        info!(env = %loader.env(), "configuration environment verified");

        for name in loader.list_categories()? {
            let display_name = normalize_category(&name);
            debug!(category = %display_name, "discovered category");
            inner
                .categories
                .insert(display_name.to_lowercase(), display_name);
        }
        inner.loader = Some(loader);
        Ok(())
    }

    /// Register `category` if discovery did not, and load it now.
    pub fn require(&self, category: &str) -> Result<()> {
        let mut inner = self.lock();
        let key = category.to_lowercase();
        if !inner.categories.contains_key(&key) {
            inner
                .categories
                .insert(key.clone(), normalize_category(category));
        }
        inner.resolved_tree(&key)?;
        Ok(())
    }

    /// Resolve a value from a known category.
    ///
    /// With no `section` the whole category tree is returned; with a
    /// section and no `key`, the section sub-tree. A missing section or key
    /// yields `default` (null when none is supplied). Category names match
    /// case-insensitively; a category that was never discovered or required
    /// fails with [`Error::UnknownCategory`] regardless of `default`.
    pub fn get(
        &self,
        category: &str,
        section: Option<&str>,
        key: Option<&str>,
        default: Option<Value>,
    ) -> Result<Value> {
        let mut inner = self.lock();
        let lookup = category.to_lowercase();
        if !inner.categories.contains_key(&lookup) {
            return Err(Error::UnknownCategory {
                category: category.to_string(),
            });
        }
        let tree = inner.resolved_tree(&lookup)?;

        let Some(section) = section else {
            return Ok(tree);
        };
        let Some(section_tree) = tree.get(section) else {
            return Ok(default.unwrap_or(Value::Null));
        };
        let Some(key) = key else {
            return Ok(section_tree.clone());
        };
        match section_tree.get(key) {
            Some(leaf) => Ok(leaf.clone()),
            None => Ok(default.unwrap_or(Value::Null)),
        }
    }

    /// Sorted display names of every known category.
    pub fn categories(&self) -> Vec<String> {
        self.lock().categories.values().cloned().collect()
    }

    /// Flatten resolved configuration into dotted-path entries.
    ///
    /// Scoped to one category when `category` is given, loading it on
    /// demand. The unscoped form covers every loaded category, each path
    /// prefixed with the lower-cased category name.
    pub fn to_flat_map(&self, category: Option<&str>) -> Result<Map<String, Value>> {
        let mut inner = self.lock();
        match category {
            Some(category) => {
                let lookup = category.to_lowercase();
                if !inner.categories.contains_key(&lookup) {
                    return Err(Error::UnknownCategory {
                        category: category.to_string(),
                    });
                }
                let tree = inner.resolved_tree(&lookup)?;
                Ok(flatten(&tree))
            }
            None => {
                let mut flat = Map::new();
                for (key, tree) in &inner.cache {
                    for (path, leaf) in flatten(tree) {
                        flat.insert(format!("{key}.{path}"), leaf);
                    }
                }
                Ok(flat)
            }
        }
    }
}

impl Inner {
    /// Resolved tree for a known category, loading and processing it on
    /// first access.
    fn resolved_tree(&mut self, key: &str) -> Result<Value> {
        if let Some(tree) = self.cache.get(key) {
            debug!(category = %key, "category cache hit");
            return Ok(tree.clone());
        }
        let loader = self.loader.as_mut().ok_or(Error::LoaderNotInjected)?;
        let raw = loader.load(key)?;
        let processed = self.context.process(&raw)?;
        debug!(category = %key, "category loaded and processed");
        self.cache.insert(key.to_string(), processed.clone());
        Ok(processed)
    }
}

/// Display form of a category name: one `.json` suffix stripped, upper-cased.
fn normalize_category(file_name: &str) -> String {
    let name = file_name.to_uppercase();
    match name.strip_suffix(".JSON") {
        Some(base) => base.to_string(),
        None => name,
    }
}
