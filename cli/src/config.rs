//! `crm.toml` loading
//!
//! Resolution order: `--config <path>`, then `CRM_CONFIG`, then
//! `~/.config/crm/crm.toml`. A missing file yields defaults.
//!
//! ```toml
//! [client]
//! base_url = "https://records.example.com/api"
//! project_id = "proj-123"
//! public_key = "pk_live_..."
//! timeout_secs = 30
//!
//! [repository]
//! page_limit = 100
//! ```
//!
//! `CRM_BASE_URL`, `CRM_PROJECT_ID` and `CRM_PUBLIC_KEY` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crm_record_client::HttpClientConfig;
use serde::Deserialize;

use crate::errors::ConfigError;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrmConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,
}

/// Record store connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub project_id: Option<String>,

    /// Without a key the client stays uninitialized.
    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project_id: None,
            public_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Page size for list calls without an explicit limit
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_page_limit() -> u32 {
    crm_repository::DEFAULT_PAGE_LIMIT
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
        }
    }
}

impl CrmConfig {
    pub const ENV_CONFIG_PATH: &'static str = "CRM_CONFIG";
    pub const ENV_BASE_URL: &'static str = "CRM_BASE_URL";
    pub const ENV_PROJECT_ID: &'static str = "CRM_PROJECT_ID";
    pub const ENV_PUBLIC_KEY: &'static str = "CRM_PUBLIC_KEY";

    /// Load from the resolved path, apply environment overrides, validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit, |key| std::env::var(key).ok());

        let mut config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            tracing::info!(path = %path.display(), "crm config not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn resolve_config_path(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(path) = env(Self::ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .map(|h| h.join(".config").join("crm").join("crm.toml"))
            .unwrap_or_else(|| PathBuf::from("crm.toml"))
    }

    /// Apply `CRM_*` overrides; blank values are ignored.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        if let Some(base_url) = get(Self::ENV_BASE_URL) {
            self.client.base_url = base_url;
        }
        if let Some(project_id) = get(Self::ENV_PROJECT_ID) {
            self.client.project_id = Some(project_id);
        }
        if let Some(public_key) = get(Self::ENV_PUBLIC_KEY) {
            self.client.public_key = Some(public_key);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("client.base_url must not be empty"));
        }
        if self.repository.page_limit == 0 {
            return Err(ConfigError::invalid(
                "repository.page_limit must be at least 1",
            ));
        }

        if self.client.timeout_secs == 0 {
            tracing::warn!("client.timeout_secs is 0; every request will time out immediately");
        }
        if self.repository.page_limit > 1000 {
            tracing::warn!(
                page_limit = self.repository.page_limit,
                "repository.page_limit is unusually large; the record store may cap it"
            );
        }
        if self.client.public_key.is_none() {
            tracing::info!("no public key configured; record commands will be unavailable");
        }
        Ok(())
    }

    pub fn http_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig::new(self.client.base_url.clone())
            .with_timeout(Duration::from_secs(self.client.timeout_secs));
        if let Some(project_id) = &self.client.project_id {
            config = config.with_project_id(project_id.clone());
        }
        if let Some(public_key) = &self.client.public_key {
            config = config.with_public_key(public_key.clone());
        }
        config
    }
}
