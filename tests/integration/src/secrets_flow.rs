//! End-to-end secret flows: an in-memory backend feeding a store across
//! several categories and roles.

use envconf_core::SecretStore;
use envconf_test_utils::MemoryReader;
use pretty_assertions::assert_eq;
use serde_json::json;

fn backend() -> MemoryReader {
    MemoryReader::new()
        .with_secret(
            "secret/common",
            json!({
                "GIT_CONFIG_TOKEN": "tok-base",
                "envs": {
                    "staging": { "GIT_CONFIG_TOKEN": "tok-staging" },
                    "production": { "GIT_CONFIG_TOKEN": "tok-prod" }
                }
            }),
        )
        .with_secret(
            "secret/db",
            json!({
                "db": { "user": "svc", "password": "base-pass" },
                "envs": {
                    "production": { "db": { "password": "prod-pass" } }
                }
            }),
        )
}

#[test]
fn test_staging_session_resolves_staging_values() {
    let reader = backend();
    let probe = reader.clone();

    let store = SecretStore::new("staging");
    store.set_reader(Box::new(reader));
    store.require_secret("common", "secret/common").unwrap();
    store.require_secret("db", "secret/db").unwrap();

    assert_eq!(
        store.get("common").unwrap(),
        json!({ "GIT_CONFIG_TOKEN": "tok-staging" })
    );
    // no staging entry for db, base survives with the block stripped
    assert_eq!(
        store.get("db").unwrap(),
        json!({ "db": { "user": "svc", "password": "base-pass" } })
    );
    assert_eq!(probe.fetch_count("secret/common"), 1);
    assert_eq!(probe.fetch_count("secret/db"), 1);
}

#[test]
fn test_production_session_merges_nested_overrides() {
    let store = SecretStore::new("production");
    store.set_reader(Box::new(backend()));
    store.require_secret("db", "secret/db").unwrap();

    assert_eq!(
        store.get("db").unwrap(),
        json!({ "db": { "user": "svc", "password": "prod-pass" } })
    );
}

#[test]
fn test_dynamic_session_resolves_as_development() {
    let reader = MemoryReader::new().with_secret(
        "secret/common",
        json!({
            "token": "base",
            "envs": { "dev": { "token": "dev-token" } }
        }),
    );
    let store = SecretStore::new("dynamic-pr12");
    store.set_reader(Box::new(reader));
    store.require_secret("common", "secret/common").unwrap();

    assert_eq!(store.get("common").unwrap(), json!({ "token": "dev-token" }));
}

#[test]
fn test_categories_sharing_a_path_fetch_once() {
    let reader = backend();
    let probe = reader.clone();

    let store = SecretStore::new("dev");
    store.set_reader(Box::new(reader));
    store.require_secret("alpha", "secret/common").unwrap();
    store.require_secret("beta", "secret/common").unwrap();
    store.require_secret("alpha", "secret/common").unwrap();

    assert_eq!(probe.fetch_count("secret/common"), 1);
    assert_eq!(store.get("alpha").unwrap(), store.get("beta").unwrap());
}

#[test]
fn test_raw_view_keeps_sibling_environments() {
    let store = SecretStore::new("staging");
    store.set_reader(Box::new(backend()));
    store.require_secret("common", "secret/common").unwrap();

    let raw = store.get_by_path("secret/common").unwrap();
    assert_eq!(
        raw.get("envs").and_then(|envs| envs.get("production")),
        Some(&json!({ "GIT_CONFIG_TOKEN": "tok-prod" }))
    );
    // the category view never exposes the block
    assert!(store.get("common").unwrap().get("envs").is_none());
}
