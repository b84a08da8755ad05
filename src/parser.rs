//! Share-link parsing
//!
//! This module provides:
//! - The [`ProtocolParser`] trait implemented once per protocol kind
//! - An ordered [`ProtocolRegistry`] that routes a link to its parser by scheme
//! - Batch parsing that isolates per-line failures
//! - Document parsing that also recognises WireGuard config files

pub mod lenient;
pub mod link;
pub mod protocols;
pub mod query;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, warn};

use crate::model::{ConfigType, Profile};

pub use protocols::{
    HttpParser, Hysteria2Parser, ShadowsocksParser, SocksParser, TrojanParser, VLessParser,
    VMessParser, VMessQrCode, WireGuardParser, is_wireguard_conf, parse_wireguard_conf,
};

/// Longest input prefix echoed back in an unsupported-protocol error
const UNSUPPORTED_ECHO_CHARS: usize = 20;

// ============================================================================
// Protocol Parser Trait
// ============================================================================

/// Trait for parsing individual share links
pub trait ProtocolParser: Send + Sync {
    /// Kind of profile this parser produces
    fn config_type(&self) -> ConfigType;

    /// Link prefixes this parser accepts, e.g. `["hysteria2://", "hy2://"]`
    fn schemes(&self) -> &'static [&'static str];

    /// Parses one link into a profile
    fn parse(&self, uri: &str) -> Result<Profile>;

    /// Checks if this parser can handle the given link
    fn can_parse(&self, uri: &str) -> bool {
        self.schemes().iter().any(|scheme| uri.starts_with(scheme))
    }
}

// ============================================================================
// Batch Result
// ============================================================================

/// Outcome of parsing many links: every success plus every per-line error
#[derive(Debug, Default)]
pub struct BatchResult {
    pub profiles: Vec<Profile>,
    pub errors: Vec<anyhow::Error>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.profiles.len() + self.errors.len()
    }

    pub fn success(&self) -> usize {
        self.profiles.len()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Profiles, or an error when not a single line parsed
    pub fn into_profiles(self) -> Result<Vec<Profile>> {
        if self.profiles.is_empty() {
            match self.errors.into_iter().next() {
                Some(first) => return Err(first.context("no valid links")),
                None => bail!("no valid links"),
            }
        }
        Ok(self.profiles)
    }
}

// ============================================================================
// Protocol Registry
// ============================================================================

/// Ordered registry of protocol parsers
///
/// Lookup walks the parsers in registration order and picks the first one
/// whose scheme prefix matches.
#[derive(Default)]
pub struct ProtocolRegistry {
    parsers: Vec<Arc<dyn ProtocolParser>>,
}

impl ProtocolRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Creates a registry with all built-in parsers registered
    pub fn with_builtin_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VMessParser));
        registry.register(Arc::new(VLessParser));
        registry.register(Arc::new(ShadowsocksParser));
        registry.register(Arc::new(TrojanParser));
        registry.register(Arc::new(SocksParser));
        registry.register(Arc::new(HttpParser));
        registry.register(Arc::new(WireGuardParser));
        registry.register(Arc::new(Hysteria2Parser));
        registry
    }

    /// Registers a protocol parser after the existing ones
    pub fn register(&mut self, parser: Arc<dyn ProtocolParser>) {
        self.parsers.push(parser);
    }

    /// Gets the parser producing the given kind
    pub fn get(&self, config_type: ConfigType) -> Option<&Arc<dyn ProtocolParser>> {
        self.parsers.iter().find(|p| p.config_type() == config_type)
    }

    /// Finds the first parser accepting the link's prefix
    pub fn find(&self, uri: &str) -> Option<&Arc<dyn ProtocolParser>> {
        self.parsers.iter().find(|p| p.can_parse(uri))
    }

    /// Parses one link using the matching parser
    pub fn parse_uri(&self, uri: &str) -> Result<Profile> {
        let uri = uri.trim();
        if uri.is_empty() {
            bail!("empty uri");
        }

        let parser = self.find(uri).ok_or_else(|| {
            let preview: String = uri.chars().take(UNSUPPORTED_ECHO_CHARS).collect();
            anyhow!("unsupported protocol: {}", preview)
        })?;

        let kind = parser.config_type();
        let result = parser.parse(uri);
        match &result {
            Ok(profile) => debug!("Parsed {} link -> '{}'", kind, profile.remarks),
            Err(e) => debug!("Failed to parse {} link: {:#}", kind, e),
        }
        result
    }

    /// Parses newline-separated links; blank lines are skipped and a bad
    /// line is recorded without stopping the batch
    pub fn parse_batch(&self, content: &str) -> BatchResult {
        let mut batch = BatchResult::default();

        for (index, line) in content.split('\n').enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.parse_uri(line) {
                Ok(profile) => batch.profiles.push(profile),
                Err(e) => {
                    let e = e.context(format!("line {}", index + 1));
                    warn!("{:#}", e);
                    batch.errors.push(e);
                }
            }
        }

        debug!(
            "Batch parsing complete: {} total, {} successful, {} failed",
            batch.total(),
            batch.success(),
            batch.failed()
        );
        batch
    }

    /// Parses WireGuard config text as one profile, anything else as a batch
    pub fn parse_document(&self, content: &str) -> BatchResult {
        if !is_wireguard_conf(content) {
            return self.parse_batch(content);
        }

        debug!("Detected WireGuard config file");
        let mut batch = BatchResult::default();
        match parse_wireguard_conf(content).context("Failed to parse WireGuard config") {
            Ok(profile) => batch.profiles.push(profile),
            Err(e) => batch.errors.push(e),
        }
        batch
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Parses one share link with the built-in parsers
pub fn parse(uri: &str) -> Result<Profile> {
    ProtocolRegistry::with_builtin_parsers().parse_uri(uri)
}

/// Parses newline-separated share links with the built-in parsers
pub fn parse_batch(content: &str) -> BatchResult {
    ProtocolRegistry::with_builtin_parsers().parse_batch(content)
}

/// Parses a link list or a WireGuard config file with the built-in parsers
pub fn parse_document(content: &str) -> BatchResult {
    ProtocolRegistry::with_builtin_parsers().parse_document(content)
}
