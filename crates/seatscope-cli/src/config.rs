//! Configuration loading for the Seatscope CLI.
//!
//! The YAML file names organizations, the lookback window, and the
//! *environment variables* holding tokens; token values themselves never
//! live in the file. Configuration is resolved once at startup and passed
//! down — nothing below `main` reads the environment.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use seatscope_github::{GithubConfig, Lookback, SecureToken, TokenStore};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Organizations to inventory.
    #[serde(default)]
    pub organizations: Vec<String>,

    /// Enterprise slug for the enterprise-wide seat listing, if any.
    #[serde(default)]
    pub enterprise: Option<String>,

    /// Lookback window for repository activity.
    #[serde(default = "default_lookback")]
    pub lookback: Lookback,

    /// Directory for snapshots and report files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// GitHub API client settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Token environment-variable names.
    #[serde(default)]
    pub tokens: TokenConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_lookback() -> Lookback {
    Lookback::Month
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".output")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            organizations: Vec::new(),
            enterprise: None,
            lookback: default_lookback(),
            output_dir: default_output_dir(),
            github: GithubConfig::default(),
            tokens: TokenConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Fails unless at least one organization is configured.
    pub fn require_organizations(&self) -> Result<()> {
        if self.organizations.is_empty() {
            bail!("No organizations configured; set 'organizations' in the config file");
        }
        Ok(())
    }
}

/// Names of the environment variables holding GitHub tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Variable holding the default fine-grained token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Variable holding the classic token for enterprise endpoints.
    #[serde(default = "default_classic_token_env")]
    pub classic_token_env: String,

    /// Per-org variable names, for orgs needing their own token.
    #[serde(default)]
    pub by_org_env: HashMap<String, String>,
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_classic_token_env() -> String {
    "GITHUB_TOKEN_CLASSIC".to_string()
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            classic_token_env: default_classic_token_env(),
            by_org_env: HashMap::new(),
        }
    }
}

impl TokenConfig {
    /// Reads the named variables and builds the token store. The default
    /// token is required; the classic token is optional until an
    /// enterprise endpoint needs it; every configured per-org variable
    /// must be set.
    pub fn resolve(&self) -> Result<TokenStore> {
        let token = std::env::var(&self.token_env)
            .with_context(|| format!("Environment variable {} is not set", self.token_env))?;
        let mut store = TokenStore::new(SecureToken::from(token));

        if let Ok(classic) = std::env::var(&self.classic_token_env) {
            store = store.with_classic(SecureToken::from(classic));
        }

        for (org, var) in &self.by_org_env {
            let value = std::env::var(var)
                .with_context(|| format!("Environment variable {} is not set", var))?;
            store = store.with_org_token(org.clone(), SecureToken::from(value));
        }

        Ok(store)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}
