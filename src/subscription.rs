//! Subscription fetching and conversion
//!
//! A subscription is a URL returning a list of share links, usually base64
//! wrapped. [`Fetcher`] downloads it, [`decode`] unwraps it into lines and
//! [`Converter`] parses every line into a profile.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, trace, warn};

use crate::model::Profile;
use crate::parser::ProtocolRegistry;
use crate::util::decode_base64;

/// User agent most subscription providers recognise
pub const DEFAULT_USER_AGENT: &str = "v2rayN/6.0";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Decoding
// ============================================================================

/// Decodes subscription content into trimmed, non-blank lines.
///
/// Base64 content that decodes to non-empty UTF-8 is unwrapped first; any
/// other content is split as-is.
pub fn decode(content: &str) -> Vec<String> {
    let content = content.trim();
    if content.is_empty() {
        return Vec::new();
    }

    match decode_base64(content).map(String::from_utf8) {
        Ok(Ok(decoded)) if !decoded.is_empty() => {
            trace!("Subscription content is base64, {} bytes decoded", decoded.len());
            split_lines(&decoded)
        }
        _ => {
            trace!("Subscription content is plain text");
            split_lines(content)
        }
    }
}

/// Splits on `\r\n`, `\r` or `\n`, trimming and dropping blank lines
fn split_lines(content: &str) -> Vec<String> {
    content
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Fetcher
// ============================================================================

/// HTTP client for subscription URLs
#[derive(Debug, Clone)]
pub struct Fetcher {
    user_agent: String,
    timeout: Duration,
    insecure: bool,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure: false,
        }
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skips certificate verification when `insecure` is set
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    /// Downloads the body of `url` as text; non-success statuses are errors
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching subscription: {}", url);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .context("Failed to build HTTP client")?;

        let response = client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP request failed with status {}: {}", status, url);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from: {}", url))
    }
}

// ============================================================================
// Converter
// ============================================================================

/// Outcome of converting one subscription
#[derive(Debug, Default)]
pub struct ConvertResult {
    pub profiles: Vec<Profile>,
    pub errors: Vec<anyhow::Error>,
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Fetches a subscription and parses every line of it
pub struct Converter {
    fetcher: Fetcher,
    registry: ProtocolRegistry,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Fetcher::default())
    }
}

impl Converter {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            registry: ProtocolRegistry::with_builtin_parsers(),
        }
    }

    /// Parses already-downloaded subscription content
    pub fn convert_content(&self, content: &str) -> ConvertResult {
        let lines = decode(content);
        let mut result = ConvertResult {
            total: lines.len(),
            ..Default::default()
        };

        for (index, line) in lines.iter().enumerate() {
            match self.registry.parse_uri(line) {
                Ok(profile) => {
                    result.profiles.push(profile);
                    result.success += 1;
                }
                Err(e) => {
                    warn!("Failed to parse subscription line {}: {:#}", index + 1, e);
                    result.errors.push(e.context(format!("line {}", index + 1)));
                    result.failed += 1;
                }
            }
        }

        debug!(
            "Converted subscription: {} total, {} ok, {} failed",
            result.total, result.success, result.failed
        );
        result
    }

    /// Fetches `url` and parses its content
    pub async fn convert(&self, url: &str) -> Result<ConvertResult> {
        let content = self.fetcher.fetch(url).await?;
        Ok(self.convert_content(&content))
    }

    /// Like [`Converter::convert`], keeping only the profiles `filter` accepts.
    ///
    /// Counters still describe the unfiltered parse.
    pub async fn convert_with_filter<F>(&self, url: &str, filter: F) -> Result<ConvertResult>
    where
        F: Fn(&Profile) -> bool,
    {
        let mut result = self.convert(url).await?;
        result.profiles.retain(|profile| filter(profile));
        Ok(result)
    }
}
