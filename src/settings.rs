use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::generator::DEFAULT_LOCAL_PORT;
use crate::output::{OutputFormat, expand_tilde};
use crate::subscription::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Fetcher};

// ============================================================================
// Settings Types
// ============================================================================

/// Defaults for the command line, parsed from a TOML file
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Output format, default "json"
    #[serde(default)]
    pub format: OutputFormat,

    /// Local SOCKS/HTTP port of the Hysteria2 client, default 1234
    #[serde(default = "default_socks_port")]
    pub socks_port: u16,

    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Skip certificate verification when fetching subscriptions
    #[serde(default)]
    pub insecure: bool,

    /// User agent sent with subscription requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Subscription request timeout in seconds, must be positive
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            socks_port: default_socks_port(),
            pretty: default_true(),
            insecure: false,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ============================================================================
// Settings Implementation
// ============================================================================

impl Settings {
    /// Parse settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content).context("Failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from file path
    pub async fn from_file(path: &Path) -> Result<Self> {
        let expanded = expand_tilde(&path.to_string_lossy());
        let content = tokio::fs::read_to_string(&expanded)
            .await
            .with_context(|| format!("Failed to read settings from {:?}", expanded))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than 0");
        }
        if self.user_agent.trim().is_empty() {
            bail!("user_agent must not be empty");
        }
        Ok(())
    }

    /// Subscription fetcher configured from these settings
    pub fn fetcher(&self) -> Fetcher {
        Fetcher::new()
            .with_user_agent(self.user_agent.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_insecure(self.insecure)
    }
}

fn default_socks_port() -> u16 {
    DEFAULT_LOCAL_PORT
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
