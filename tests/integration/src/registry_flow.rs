//! End-to-end configuration flows: an in-memory loader feeding a registry,
//! exercised the way an application would use it.

use envconf_core::{ConfigRegistry, EnvContext, Error};
use envconf_test_utils::MemoryLoader;
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_system() -> serde_json::Value {
    json!({
        "$context": {
            "staging": { "host": "stage.internal", "replicas": 2 },
            "production": { "host": "prod.internal", "replicas": 12 }
        },
        "api": {
            "url": "https://{{ host }}/v1",
            "replicas": "{{ replicas }}",
            "banner": "{{ ENV_NAME }} ({{ APP_ENV }})"
        }
    })
}

#[test]
fn test_staging_resolution_end_to_end() {
    let loader =
        MemoryLoader::new(&["staging", "master"]).with_category("system", sample_system());
    let probe = loader.clone();

    let registry = ConfigRegistry::new(EnvContext::new("staging"));
    registry.set_loader(Box::new(loader)).unwrap();

    let api = registry.get("SYSTEM", Some("api"), None, None).unwrap();
    assert_eq!(
        api,
        json!({
            "url": "https://stage.internal/v1",
            "replicas": 2,
            "banner": "staging (staging)"
        })
    );

    // repeated reads are served from the cache
    let url = registry.get("system", Some("api"), Some("url"), None).unwrap();
    assert_eq!(url, json!("https://stage.internal/v1"));
    assert_eq!(probe.load_count("system"), 1);
}

#[test]
fn test_dynamic_environment_falls_back_to_master() {
    let loader = MemoryLoader::new(&["master"])
        .with_category("system", json!({ "banner": "{{ ENV_NAME }} ({{ APP_ENV }})" }));
    let probe = loader.clone();

    let registry = ConfigRegistry::new(EnvContext::new("dynamic-billing"));
    registry.set_loader(Box::new(loader)).unwrap();
    assert_eq!(probe.probed(), vec!["dynamic-billing", "master"]);

    let banner = registry.get("system", Some("banner"), None, None).unwrap();
    assert_eq!(banner, json!("billing (dev)"));
}

#[test]
fn test_unknown_environment_reports_all_candidates() {
    let registry = ConfigRegistry::new(EnvContext::new("dynamic-pr7"));
    let result = registry.set_loader(Box::new(MemoryLoader::new(&["qa"])));
    match result {
        Err(Error::EnvironmentNotFound { tried }) => {
            assert_eq!(tried, vec!["dynamic-pr7".to_string(), "master".to_string()]);
        }
        other => panic!("expected EnvironmentNotFound, got {other:?}"),
    }
}

#[test]
fn test_app_context_selects_declaration() {
    let tree = json!({
        "$context": {
            "eu-central": { "bucket": "cfg-eu" },
            "us-east": { "bucket": "cfg-us" }
        },
        "storage": { "bucket": "{{ bucket }}" }
    });
    let loader = MemoryLoader::new(&["qa"]).with_category("system", tree);

    let mut context = EnvContext::new("qa");
    context.add("region", json!("EU-Central"));
    let registry = ConfigRegistry::new(context);
    registry.set_loader(Box::new(loader)).unwrap();

    let bucket = registry
        .get("system", Some("storage"), Some("bucket"), None)
        .unwrap();
    assert_eq!(bucket, json!("cfg-eu"));
}

#[test]
fn test_unresolved_template_is_fatal() {
    let loader = MemoryLoader::new(&["qa"])
        .with_category("system", json!({ "endpoint": "{{ does_not_exist }}" }));
    let registry = ConfigRegistry::new(EnvContext::new("qa"));
    registry.set_loader(Box::new(loader)).unwrap();

    assert!(matches!(
        registry.get("system", None, None, None),
        Err(Error::UnresolvedTemplate { .. })
    ));
}

#[test]
fn test_flat_dump_spans_loaded_categories() {
    let loader = MemoryLoader::new(&["qa"])
        .with_category("system", json!({ "db": { "port": 5432 } }))
        .with_category("global", json!({ "debug": false }));

    let registry = ConfigRegistry::new(EnvContext::new("qa"));
    registry.set_loader(Box::new(loader)).unwrap();
    registry.require("system").unwrap();
    registry.require("global").unwrap();

    let flat = registry.to_flat_map(None).unwrap();
    assert_eq!(flat.get("system.db.port"), Some(&json!(5432)));
    assert_eq!(flat.get("global.debug"), Some(&json!(false)));

    let scoped = registry.to_flat_map(Some("system")).unwrap();
    assert_eq!(scoped.get("db.port"), Some(&json!(5432)));
    assert!(!scoped.contains_key("global.debug"));
}
