//! Loader implementation over a GitHub configuration repository.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use envconf_core::{ConfigLoader, DYNAMIC_PREFIX, Result as CoreResult};

use crate::error::{Error, Result};

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";
/// Version 2 folder serving dynamic environments.
const DYNAMIC_BASE_FOLDER: &str = "dev";
const USER_AGENT: &str = "envconf";

/// Coordinates of the configuration repository.
#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub account: String,
    pub repo: String,
    pub token: Option<String>,
    pub api_base: String,
    pub raw_base: String,
}

impl GithubSettings {
    /// Settings against the public GitHub hosts.
    pub fn new(
        account: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            account: account.into(),
            repo: repo.into(),
            token,
            api_base: API_BASE.to_string(),
            raw_base: RAW_BASE.to_string(),
        }
    }
}

/// [`ConfigLoader`] reading branches and files of a configuration repo.
pub struct GithubStore {
    settings: GithubSettings,
    client: Client,
    env: String,
    version: u32,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GithubStore {
    pub fn new(settings: GithubSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
            env: String::new(),
            version: 1,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json");
        match &self.settings.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn branch_endpoint(&self, branch: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/repos/{}/{}/branches/{branch}",
            self.settings.api_base, self.settings.account, self.settings.repo
        ))?)
    }

    fn contents_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/repos/{}/{}/contents/?ref={}",
            self.settings.api_base, self.settings.account, self.settings.repo, self.env
        ))?)
    }

    fn raw_file_endpoint(&self, category: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/{}/{}/{}/{}{category}.json",
            self.settings.raw_base,
            self.settings.account,
            self.settings.repo,
            self.env,
            self.category_folder()
        ))?)
    }

    /// Folder prefix for category files.
    ///
    /// Version 2 keeps per-environment folders on each branch; dynamic
    /// environments read the base development folder.
    fn category_folder(&self) -> String {
        if self.version < 2 {
            return String::new();
        }
        if self.env.starts_with(DYNAMIC_PREFIX) {
            return format!("{DYNAMIC_BASE_FOLDER}/");
        }
        format!("{}/", self.env)
    }

    /// Tip commit of `branch`, `None` when the branch does not exist.
    fn branch_tip(&self, branch: &str) -> Result<Option<String>> {
        let url = self.branch_endpoint(branch)?;
        debug!(branch = %branch, "checking configuration branch");
        let response = self.request(self.client.get(url.clone())).send()?;
        match response.status().as_u16() {
            200 => {
                let info: BranchInfo = response.json()?;
                Ok(Some(info.commit.sha))
            }
            404 => Ok(None),
            status => Err(Error::Status {
                status,
                endpoint: url.to_string(),
            }),
        }
    }

    fn contents(&self) -> Result<Vec<ContentEntry>> {
        let url = self.contents_endpoint()?;
        debug!(url = %url, env = %self.env, "listing configuration repo contents");
        let response = self.request(self.client.get(url.clone())).send()?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::Status {
                status,
                endpoint: url.to_string(),
            });
        }
        Ok(response.json()?)
    }

    fn fetch_category(&self, category: &str) -> Result<Value> {
        let url = self.raw_file_endpoint(category)?;
        debug!(url = %url, env = %self.env, "fetching category file");
        let response = self.request(self.client.get(url.clone())).send()?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::Status {
                status,
                endpoint: url.to_string(),
            });
        }
        Ok(response.json()?)
    }
}

/// Root-level category files of a contents listing.
fn root_json_files(entries: Vec<ContentEntry>) -> Vec<String> {
    entries
        .into_iter()
        .filter(|entry| {
            entry.kind == "file" && entry.name.ends_with(".json") && !entry.path.contains('/')
        })
        .map(|entry| entry.name)
        .collect()
}

impl ConfigLoader for GithubStore {
    fn verify_env(&mut self, candidates: &[String]) -> CoreResult<bool> {
        for candidate in candidates {
            match self.branch_tip(candidate) {
                Ok(Some(sha)) => {
                    let short = sha.get(..6).unwrap_or(sha.as_str());
                    info!(branch = %candidate, commit = %short, "using configuration branch");
                    self.env = candidate.clone();
                    return Ok(true);
                }
                Ok(None) => {
                    debug!(branch = %candidate, "branch does not exist, trying next");
                }
                Err(error) => {
                    error!(branch = %candidate, %error, "branch verification failed");
                    return Ok(false);
                }
            }
        }
        Ok(false)
    }

    fn env(&self) -> &str {
        &self.env
    }

    fn list_categories(&mut self) -> CoreResult<Vec<String>> {
        let entries = self.contents().map_err(envconf_core::Error::loader)?;
        Ok(root_json_files(entries))
    }

    fn load(&mut self, category: &str) -> CoreResult<Value> {
        match self.fetch_category(category) {
            Ok(tree) => Ok(tree),
            Err(error) => {
                warn!(
                    category = %category,
                    env = %self.env,
                    %error,
                    "failed to load category, serving empty tree"
                );
                Ok(Value::Object(Map::new()))
            }
        }
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    fn version(&self) -> u32 {
        self.version
    }
}
