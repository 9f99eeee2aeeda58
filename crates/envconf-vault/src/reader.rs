//! Secret reader implementation over the Vault HTTP API.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use envconf_core::SecretReader;

use crate::error::{Error, Result};

/// Address used when `VAULT_ADDR` is not set, matching the Vault CLI.
pub const DEFAULT_ADDR: &str = "http://127.0.0.1:8200";

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Connection and login parameters.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    pub addr: String,
    pub user: String,
    pub password: String,
}

impl VaultSettings {
    /// Settings against [`DEFAULT_ADDR`].
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            user: user.into(),
            password: password.into(),
        }
    }
}

/// [`SecretReader`] with a lazily acquired userpass session token.
pub struct VaultReader {
    settings: VaultSettings,
    client: Client,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth: AuthInfo,
}

#[derive(Debug, Deserialize)]
struct AuthInfo {
    client_token: String,
}

impl VaultReader {
    pub fn new(settings: VaultSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
            token: None,
        }
    }

    fn login_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/v1/auth/userpass/login/{}",
            self.settings.addr, self.settings.user
        ))?)
    }

    fn secret_endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/v1/{path}", self.settings.addr))?)
    }

    /// Session token, logging in on first use.
    fn ensure_token(&mut self) -> Result<String> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        let url = self.login_endpoint()?;
        info!(addr = %self.settings.addr, user = %self.settings.user, "logging in to vault");
        let response = self
            .client
            .post(url.clone())
            .json(&serde_json::json!({ "password": self.settings.password }))
            .send()?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::Status {
                status,
                endpoint: url.to_string(),
            });
        }
        let login: LoginResponse = response.json()?;
        self.token = Some(login.auth.client_token.clone());
        Ok(login.auth.client_token)
    }

    fn fetch(&mut self, path: &str) -> Result<Value> {
        let token = self.ensure_token()?;
        let url = self.secret_endpoint(path)?;
        debug!(path = %path, "reading secret");
        let response = self
            .client
            .get(url.clone())
            .header(TOKEN_HEADER, token)
            .send()?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::Status {
                status,
                endpoint: url.to_string(),
            });
        }
        let payload: Value = response.json()?;
        unwrap_envelope(payload, path)
    }
}

/// Vault wraps every secret in a `data` envelope; unwrap or fail.
fn unwrap_envelope(payload: Value, path: &str) -> Result<Value> {
    match payload.get("data") {
        Some(data) => Ok(data.clone()),
        None => Err(Error::MissingData {
            path: path.to_string(),
        }),
    }
}

impl SecretReader for VaultReader {
    fn read(&mut self, path: &str) -> envconf_core::Result<Value> {
        self.fetch(path)
            .map_err(|error| envconf_core::Error::secret_fetch(path, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_settings_default_addr() {
        let settings = VaultSettings::new("svc", "hunter2");
        assert_eq!(settings.addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_endpoints() {
        let reader = VaultReader::new(VaultSettings::new("svc", "hunter2"));
        assert_eq!(
            reader.login_endpoint().unwrap().as_str(),
            "http://127.0.0.1:8200/v1/auth/userpass/login/svc"
        );
        assert_eq!(
            reader.secret_endpoint("secret/common").unwrap().as_str(),
            "http://127.0.0.1:8200/v1/secret/common"
        );
    }

    #[test]
    fn test_unwrap_envelope() {
        let payload = json!({ "data": { "k": "v" }, "lease_id": "" });
        assert_eq!(
            unwrap_envelope(payload, "secret/common").unwrap(),
            json!({ "k": "v" })
        );
    }

    #[test]
    fn test_unwrap_envelope_missing_data() {
        let err = unwrap_envelope(json!({ "errors": [] }), "secret/common").unwrap_err();
        assert!(matches!(err, Error::MissingData { .. }));
        assert!(err.to_string().contains("secret/common"));
    }

    #[test]
    fn test_login_response_parses() {
        let login: LoginResponse = serde_json::from_str(
            r#"{ "auth": { "client_token": "s.abc123", "policies": ["default"] } }"#,
        )
        .unwrap();
        assert_eq!(login.auth.client_token, "s.abc123");
    }
}
