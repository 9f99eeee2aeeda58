//! Contextual template processing for configuration trees.
//!
//! A raw category payload may declare per-role override data under the
//! reserved `$context` key and reference context values anywhere in its
//! strings through `{{ token }}` placeholders:
//!
//! ```json
//! {
//!   "$context": {
//!     "staging": { "host": "stage.internal" },
//!     "production": { "host": "prod.internal" }
//!   },
//!   "service": { "endpoint": "https://{{ host }}/api" }
//! }
//! ```
//!
//! [`EnvContext`] selects the declaration block matching the running
//! environment, layers the ambient session data on top, substitutes every
//! placeholder, strips the declaration, and rejects any output that still
//! carries a token.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::role::{ContextRole, FIXED_ENVS, strip_dynamic_prefix};

/// Reserved top-level key declaring per-role context data in a raw tree.
pub const CONTEXT_DECLARATION_KEY: &str = "$context";

/// Ambient context key holding the authoritative environment role.
pub const ENV_ROLE_KEY: &str = "APP_ENV";

/// Ambient context key holding the environment name without the dynamic prefix.
const ENV_NAME_KEY: &str = "ENV_NAME";

/// Ambient context key holding the hyphen-prefixed domain suffix.
const ENV_NAME_FOR_DOMAIN_KEY: &str = "ENV_NAME_FOR_DOMAIN";

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w.-]+)\s*\}\}").unwrap());

/// One environment session's ambient context data and template engine.
///
/// Ambient entries are kept in insertion order; role matching and the
/// collision checks below depend on that order being stable.
#[derive(Debug, Clone)]
pub struct EnvContext {
    env_id: String,
    role: ContextRole,
    data: Map<String, Value>,
}

impl EnvContext {
    /// Create a context for the given environment identifier.
    ///
    /// Seeds the ambient data with the environment role plus two derived
    /// keys used to compose environment-qualified names: `ENV_NAME` (the
    /// identifier without the dynamic prefix) and `ENV_NAME_FOR_DOMAIN`
    /// (empty for fixed environments, otherwise the stripped identifier
    /// prefixed with a hyphen).
    pub fn new(env_id: impl Into<String>) -> Self {
        let env_id = env_id.into();
        let role = ContextRole::from_env_id(&env_id);

        let env_name = strip_dynamic_prefix(&env_id).to_string();
        let domain_suffix = if FIXED_ENVS.contains(&env_name.as_str()) {
            String::new()
        } else {
            format!("-{env_name}")
        };

        let mut data = Map::new();
        data.insert(
            ENV_ROLE_KEY.to_string(),
            Value::String(role.as_str().to_string()),
        );
        data.insert(ENV_NAME_KEY.to_string(), Value::String(env_name));
        data.insert(
            ENV_NAME_FOR_DOMAIN_KEY.to_string(),
            Value::String(domain_suffix),
        );

        Self { env_id, role, data }
    }

    /// The raw environment identifier this context was created for.
    pub fn env_id(&self) -> &str {
        &self.env_id
    }

    /// The resolved context role.
    pub fn role(&self) -> ContextRole {
        self.role
    }

    /// Whether this session runs under the production role.
    pub fn is_production(&self) -> bool {
        self.role == ContextRole::Production
    }

    /// The ambient context entries, in insertion order.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Insert or overwrite an ambient context entry.
    ///
    /// The environment-role key cannot be spoofed: writes to
    /// [`ENV_ROLE_KEY`] ignore `value` and recompute the role from the
    /// environment identifier.
    pub fn add(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let value = if key == ENV_ROLE_KEY {
            Value::String(ContextRole::from_env_id(&self.env_id).as_str().to_string())
        } else {
            value
        };
        self.data.insert(key, value);
    }

    /// Process one raw configuration tree.
    ///
    /// Works on a copy; the input is never mutated. The `$context`
    /// declaration, when present, is matched against the ambient data
    /// ([`Self::select_declared`]), the winning block plus the ambient
    /// entries form the current context, and every `{{ token }}` in the
    /// tree is substituted from it. The declaration never survives into the
    /// output, and any remaining token fails validation with
    /// [`Error::UnresolvedTemplate`].
    ///
    /// A declared `$context` that matches no ambient value skips
    /// substitution entirely, so stray tokens surface at validation instead
    /// of being masked.
    pub fn process(&self, tree: &Value) -> Result<Value> {
        let mut result = tree.clone();

        let declaration = match result.as_object_mut() {
            Some(map) => map.shift_remove(CONTEXT_DECLARATION_KEY),
            None => None,
        };

        match declaration {
            None => {
                let context = self.layer_ambient(Map::new())?;
                substitute_node(&mut result, &context);
            }
            Some(declaration) => match self.select_declared(&declaration) {
                Some(selected) => {
                    let context = self.layer_ambient(selected)?;
                    substitute_node(&mut result, &context);
                }
                None => {
                    debug!(env_id = %self.env_id, "no $context role matched ambient data");
                }
            },
        }

        validate_no_token_left(&result)?;
        Ok(result)
    }

    /// Select override data from a `$context` declaration.
    ///
    /// Declared role names are compared case-insensitively against the
    /// string values held in ambient data. Every matching declaration
    /// contributes, in declaration order, but keys selected by an earlier
    /// declaration are kept (first found wins). Returns `None` when no
    /// declaration matched at all.
    fn select_declared(&self, declaration: &Value) -> Option<Map<String, Value>> {
        let roles = declaration.as_object()?;

        let mut selected: Option<Map<String, Value>> = None;
        for (role_name, role_data) in roles {
            let matched = self.data.values().any(|ambient| {
                ambient
                    .as_str()
                    .is_some_and(|s| s.to_lowercase() == role_name.to_lowercase())
            });
            if !matched {
                continue;
            }
            debug!(role = %role_name, "selected $context declaration");
            let current = selected.get_or_insert_with(Map::new);
            if let Value::Object(role_data) = role_data {
                for (key, value) in role_data {
                    if !current.contains_key(key) {
                        current.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        selected
    }

    /// Layer the ambient entries onto role-selected context data.
    ///
    /// An ambient key already present in the selected data is a collision
    /// and fails with [`Error::DuplicateContextKey`].
    fn layer_ambient(&self, selected: Map<String, Value>) -> Result<Map<String, Value>> {
        let mut current = selected;
        for (key, value) in &self.data {
            if current.contains_key(key) {
                return Err(Error::DuplicateContextKey { key: key.clone() });
            }
            current.insert(key.clone(), value.clone());
        }
        Ok(current)
    }
}

/// Substitute tokens in every string reachable from `node`.
fn substitute_node(node: &mut Value, context: &Map<String, Value>) {
    let resolved = match &*node {
        Value::String(text) => resolve_string(text, context),
        _ => None,
    };
    if let Some(resolved) = resolved {
        *node = resolved;
        return;
    }
    match node {
        Value::Object(map) => {
            for (_, child) in map.iter_mut() {
                substitute_node(child, context);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                substitute_node(item, context);
            }
        }
        _ => {}
    }
}

/// Resolve the tokens inside one string leaf.
///
/// A token bound to a non-string context value replaces the whole leaf
/// (typed substitution); string values splice into the text and the scan
/// continues, so composed tokens like `"{{ a }}, {{ b }}"` resolve in one
/// call. An unknown token ends the scan and is left for validation. The
/// scan is bounded by the token count of the original text so
/// self-referential context data cannot loop.
fn resolve_string(text: &str, context: &Map<String, Value>) -> Option<Value> {
    let budget = TOKEN_PATTERN.find_iter(text).count();
    if budget == 0 {
        return None;
    }

    let mut current = text.to_string();
    for _ in 0..budget {
        let (token, name) = match TOKEN_PATTERN.captures(&current) {
            Some(caps) => (caps[0].to_string(), caps[1].to_string()),
            None => break,
        };
        match context.get(&name) {
            Some(Value::String(value)) => {
                current = current.replacen(&token, value, 1);
            }
            Some(value) => return Some(value.clone()),
            None => break,
        }
    }
    Some(Value::String(current))
}

/// Reject any string leaf still carrying a template token.
fn validate_no_token_left(node: &Value) -> Result<()> {
    match node {
        Value::Object(map) => map.values().try_for_each(validate_no_token_left),
        Value::Array(items) => items.iter().try_for_each(validate_no_token_left),
        Value::String(text) if TOKEN_PATTERN.is_match(text) => Err(Error::UnresolvedTemplate {
            value: text.clone(),
        }),
        _ => Ok(()),
    }
}
