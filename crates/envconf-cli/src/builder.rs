//! Startup assembly: manifest to runtime objects.
//!
//! The assembly order matters and mirrors how a service boots: variables
//! are declared and validated first, then secrets are materialized (the
//! configuration store token may live there), then the configuration
//! loader is built and injected and the manifest's categories are loaded.

use serde_json::Value;
use tracing::{debug, warn};

use envconf_core::{ConfigLoader, ConfigRegistry, EnvContext, SecretStore};
use envconf_github::{GithubSettings, GithubStore};
use envconf_vars::{VarKind, VarRegistry};
use envconf_vault::{VaultReader, VaultSettings};

use crate::error::{CliError, Result};
use crate::manifest::{ConfigSection, Manifest};

/// Variable naming the running environment.
pub const ENV_VAR_KEY: &str = "APP_ENV";
/// Overrides the environment used for configuration verification.
pub const BASE_ENV_OVERRIDE_VAR: &str = "CONFIG_BASE_ENV";
/// Access token for the configuration repository.
pub const GIT_TOKEN_VAR: &str = "GIT_CONFIG_TOKEN";

const VAULT_ADDR_VAR: &str = "VAULT_ADDR";
const VAULT_USER_VAR: &str = "VAULT_USER";
const VAULT_PASS_VAR: &str = "VAULT_PASSWORD";

/// Fully assembled runtime for one invocation.
pub struct Runtime {
    pub vars: VarRegistry,
    pub registry: ConfigRegistry,
    pub secrets: SecretStore,
}

/// Register built-in and manifest-declared variables.
///
/// Does not touch the process environment, so usage listings work even
/// when mandatory variables are missing.
pub fn declare_vars(manifest: &Manifest) -> Result<VarRegistry> {
    let mut vars = VarRegistry::new();
    vars.register_mandatory(ENV_VAR_KEY, "name of the running environment", VarKind::String)?;

    if has_required_secrets(manifest) {
        vars.register_mandatory(VAULT_USER_VAR, "vault user name", VarKind::String)?;
        vars.register_mandatory(VAULT_PASS_VAR, "vault password", VarKind::String)?;
        vars.register(
            VAULT_ADDR_VAR,
            "vault server address",
            VarKind::String,
            Some(envconf_vault::DEFAULT_ADDR),
        )?;
    }

    for (key, decl) in &manifest.env_vars {
        if vars.is_registered(key) {
            debug!(key = %key, "manifest re-declares a built-in variable, skipping");
            continue;
        }
        let kind: VarKind = decl.kind.parse().map_err(|error: envconf_vars::Error| {
            CliError::user(format!("invalid declaration for {key}: {error}"))
        })?;
        vars.declare(key, &decl.description, kind, decl.is_mandatory, decl.default_raw())?;
    }
    Ok(vars)
}

/// Declare and validate against the process environment.
///
/// `env_override` wins over an exported `APP_ENV`, so `--env` behaves the
/// same whether or not the variable is set.
pub fn build_vars(manifest: &Manifest, env_override: Option<&str>) -> Result<VarRegistry> {
    let mut vars = declare_vars(manifest)?;
    vars.initialize_with(|key| {
        if key == ENV_VAR_KEY {
            if let Some(env) = env_override {
                return Some(env.to_string());
            }
        }
        std::env::var(key).ok()
    })?;
    Ok(vars)
}

/// Assemble the full runtime for the manifest.
pub fn build(
    manifest: &Manifest,
    env_override: Option<&str>,
    context_pairs: &[String],
) -> Result<Runtime> {
    let vars = build_vars(manifest, env_override)?;

    let env_id = vars
        .get(ENV_VAR_KEY)?
        .and_then(|value| value.as_str().map(str::to_string))
        .ok_or_else(|| CliError::user("APP_ENV is not set"))?;

    let mut context = EnvContext::new(&env_id);
    for pair in context_pairs {
        let (key, value) = parse_context_pair(pair)?;
        context.add(key, value);
    }

    let secrets = SecretStore::new(&env_id);
    if let Some(section) = &manifest.secrets {
        if !section.required.is_empty() {
            secrets.set_reader(Box::new(vault_reader(&vars)?));
            for (category, path) in &section.required {
                secrets.require_secret(category, path)?;
            }
        }
    }

    let registry = ConfigRegistry::new(context);
    if let Some(section) = &manifest.config {
        if !section.parent_environments.is_empty() {
            registry.set_env_fallback(section.parent_environments.clone());
        }
        if let Ok(base_env) = std::env::var(BASE_ENV_OVERRIDE_VAR) {
            debug!(env = %base_env, "overriding configuration base environment");
            registry.set_env(base_env);
        }
        registry.set_loader(make_loader(section, &secrets)?)?;
        for category in &section.categories {
            registry.require(category)?;
        }
    }

    Ok(Runtime {
        vars,
        registry,
        secrets,
    })
}

fn has_required_secrets(manifest: &Manifest) -> bool {
    manifest
        .secrets
        .as_ref()
        .is_some_and(|section| !section.required.is_empty())
}

fn vault_reader(vars: &VarRegistry) -> Result<VaultReader> {
    let user = vars
        .get(VAULT_USER_VAR)?
        .and_then(|value| value.as_str().map(str::to_string))
        .ok_or_else(|| CliError::user("VAULT_USER is not set"))?;
    let password = vars
        .get(VAULT_PASS_VAR)?
        .and_then(|value| value.as_str().map(str::to_string))
        .ok_or_else(|| CliError::user("VAULT_PASSWORD is not set"))?;

    let mut settings = VaultSettings::new(user, password);
    if let Some(addr) = vars
        .get(VAULT_ADDR_VAR)?
        .and_then(|value| value.as_str().map(str::to_string))
    {
        settings.addr = addr;
    }
    Ok(VaultReader::new(settings))
}

/// Build the loader named by the manifest's config section.
fn make_loader(section: &ConfigSection, secrets: &SecretStore) -> Result<Box<dyn ConfigLoader>> {
    match section.provider.as_str() {
        "github" => {
            let repository = section.repository.as_deref().ok_or_else(|| {
                CliError::user("config.repository is required for the github provider")
            })?;
            let (account, repo) = repository.split_once('/').ok_or_else(|| {
                CliError::user(format!(
                    "config.repository must be owner/name, got: {repository}"
                ))
            })?;
            let mut store = GithubStore::new(GithubSettings::new(account, repo, github_token(secrets)));
            if let Some(version) = section.version {
                store.set_version(version);
            }
            Ok(Box::new(store))
        }
        other => Err(CliError::user(format!(
            "unknown configuration provider: {other}"
        ))),
    }
}

/// Repository token from the environment, else from the common secrets
/// category. Requests go out anonymous when neither holds one.
fn github_token(secrets: &SecretStore) -> Option<String> {
    if let Ok(token) = std::env::var(GIT_TOKEN_VAR) {
        if !token.trim().is_empty() {
            return Some(token);
        }
    }
    if let Ok(common) = secrets.get("common") {
        if let Some(token) = common.get(GIT_TOKEN_VAR).and_then(Value::as_str) {
            return Some(token.to_string());
        }
    }
    warn!("no configuration repo token found, requests will be anonymous");
    None
}

/// Split `KEY=VALUE`; the value is parsed as JSON when possible so typed
/// context entries survive whole-value substitution.
fn parse_context_pair(pair: &str) -> Result<(String, Value)> {
    let Some((key, value)) = pair.split_once('=') else {
        return Err(CliError::user(format!(
            "context entries must be KEY=VALUE, got: {pair}"
        )));
    };
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}
