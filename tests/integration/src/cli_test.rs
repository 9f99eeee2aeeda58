//! CLI behaviour through the compiled binary. Every test here stays
//! offline: flows that would reach a remote store assert the failure
//! surface instead.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VARS_MANIFEST: &str = "\
env-vars:
  COMPANY:
    description: company name
    type: String
    default: Acme
";

/// Command with a scrubbed environment: trigger variables and the
/// ambient environment name never leak in from the test runner.
#[allow(deprecated)]
fn envconf() -> Command {
    let mut cmd = Command::cargo_bin("envconf").unwrap();
    cmd.env_remove(envconf_vars::USAGE_TRIGGER_VAR)
        .env_remove(envconf_vars::DUMP_TRIGGER_VAR)
        .env_remove("APP_ENV")
        .env_remove("COMPANY");
    cmd
}

fn manifest_dir(content: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".envconfig.yml"), content).unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = envconf();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("dump"))
        .stdout(predicate::str::contains("vars"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_need_no_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = envconf();
    cmd.current_dir(dir.path()).args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("envconf"));
}

#[test]
fn test_missing_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = envconf();
    cmd.current_dir(dir.path()).arg("check");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("manifest not found"));
}

#[test]
fn test_vars_usage_lists_declarations() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path()).args(["vars", "--usage"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("APP_ENV"))
        .stdout(predicate::str::contains("COMPANY"))
        .stdout(predicate::str::contains("* - mandatory"));
}

#[test]
fn test_vars_dump_shows_resolved_values() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env("APP_ENV", "dev")
        .arg("vars");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("APP_ENV: dev"))
        .stdout(predicate::str::contains("COMPANY: Acme"));
}

#[test]
fn test_missing_mandatory_var_fails() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path()).arg("vars");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("APP_ENV"));
}

#[test]
fn test_usage_trigger_preempts_command() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env(envconf_vars::USAGE_TRIGGER_VAR, "1")
        .arg("dump");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("* - mandatory"));
}

#[test]
fn test_dump_trigger_prints_resolved_vars() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env("APP_ENV", "dev")
        .env(envconf_vars::DUMP_TRIGGER_VAR, "1")
        .arg("dump");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("COMPANY: Acme"));
}

#[test]
fn test_env_flag_overrides_ambient_name() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env("APP_ENV", "production")
        .args(["--env", "staging", "vars"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("APP_ENV: staging"));
}

#[test]
fn test_unknown_provider_is_reported() {
    let dir = manifest_dir(
        "config:\n  provider: consul\n  repository: acme/configuration\n  categories:\n    - system\n",
    );
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env("APP_ENV", "dev")
        .arg("check");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration provider: consul"));
}

#[test]
fn test_get_unknown_category_is_reported() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env("APP_ENV", "dev")
        .args(["get", "system"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration category"));
}

#[test]
fn test_malformed_context_pair_is_reported() {
    let dir = manifest_dir(VARS_MANIFEST);
    let mut cmd = envconf();
    cmd.current_dir(dir.path())
        .env("APP_ENV", "dev")
        .args(["dump", "--context", "oops"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}
