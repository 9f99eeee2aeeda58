//! Shared test doubles for the envconf workspace.
//!
//! Both doubles are cheap to clone: counters and logs live behind shared
//! handles, so a test can keep a clone for inspection after boxing the
//! other clone into a registry or store.
//!
//! - [`MemoryLoader`] stands in for a remote configuration store
//! - [`MemoryReader`] stands in for a secret backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use envconf_core::{ConfigLoader, Error, Result, SecretReader};

/// In-memory [`ConfigLoader`] scripted with environments and categories.
#[derive(Clone)]
pub struct MemoryLoader {
    existing: Vec<String>,
    env: String,
    version: u32,
    categories: HashMap<String, Value>,
    probed: Arc<Mutex<Vec<String>>>,
    loads: Arc<Mutex<HashMap<String, usize>>>,
}

impl MemoryLoader {
    /// A loader whose upstream knows exactly `existing` environments.
    pub fn new(existing: &[&str]) -> Self {
        Self {
            existing: existing.iter().map(|s| s.to_string()).collect(),
            env: String::new(),
            version: 1,
            categories: HashMap::new(),
            probed: Arc::new(Mutex::new(Vec::new())),
            loads: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Script a category tree; the name is stored as a lower-cased key.
    pub fn with_category(mut self, name: &str, tree: Value) -> Self {
        self.categories.insert(name.to_lowercase(), tree);
        self
    }

    /// Every environment probed so far, in probe order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }

    /// How many times `category` was loaded from upstream.
    pub fn load_count(&self, category: &str) -> usize {
        self.loads
            .lock()
            .unwrap()
            .get(&category.to_lowercase())
            .copied()
            .unwrap_or(0)
    }
}

impl ConfigLoader for MemoryLoader {
    fn verify_env(&mut self, candidates: &[String]) -> Result<bool> {
        for candidate in candidates {
            self.probed.lock().unwrap().push(candidate.clone());
            if self.existing.contains(candidate) {
                self.env = candidate.clone();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn env(&self) -> &str {
        &self.env
    }

    fn list_categories(&mut self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .categories
            .keys()
            .map(|name| format!("{name}.json"))
            .collect();
        names.sort();
        Ok(names)
    }

    fn load(&mut self, category: &str) -> Result<Value> {
        *self
            .loads
            .lock()
            .unwrap()
            .entry(category.to_string())
            .or_insert(0) += 1;
        Ok(self
            .categories
            .get(category)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    fn version(&self) -> u32 {
        self.version
    }
}

/// In-memory [`SecretReader`] scripted with path/payload pairs.
#[derive(Clone)]
pub struct MemoryReader {
    secrets: HashMap<String, Value>,
    fetches: Arc<Mutex<HashMap<String, usize>>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self {
            secrets: HashMap::new(),
            fetches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Script the payload served for `path`.
    pub fn with_secret(mut self, path: &str, payload: Value) -> Self {
        self.secrets.insert(path.to_string(), payload);
        self
    }

    /// How many times `path` was fetched.
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

impl Default for MemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretReader for MemoryReader {
    fn read(&mut self, path: &str) -> Result<Value> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;
        self.secrets
            .get(path)
            .cloned()
            .ok_or_else(|| Error::secret_fetch(path, "no secret stored at path"))
    }
}
