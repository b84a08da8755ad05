//! Shadowsocks protocol parser
//!
//! Supports both SIP002 and the legacy format:
//! - SIP002: ss://BASE64(method:password)@host:port?plugin=...#remarks
//! - SIP002 with plain userinfo: ss://method:password@host:port#remarks
//! - Legacy: ss://BASE64(method:password@host:port)#remarks

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use tracing::trace;

use crate::model::{ConfigType, NO_REMARKS, NetworkKind, Profile};
use crate::parser::ProtocolParser;
use crate::parser::link;
use crate::parser::query::QueryParams;
use crate::util::decode_base64_string;

// ============================================================================
// Shadowsocks Parser
// ============================================================================

/// Parser for Shadowsocks (ss://) URIs
///
/// SIP002 is tried first; the legacy layout is the fallback.
pub struct ShadowsocksParser;

impl ProtocolParser for ShadowsocksParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::Shadowsocks
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["ss://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        let uri = uri.trim();
        trace!("Parsing Shadowsocks URI");

        match self.parse_sip002(uri) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                trace!("Not a SIP002 link ({:#}), trying legacy format", e);
                self.parse_legacy(uri)
            }
        }
    }
}

impl ShadowsocksParser {
    fn parse_sip002(&self, uri: &str) -> Result<Profile> {
        let url = link::parse_url(uri, "Shadowsocks")?;

        let userinfo = link::username(&url);
        if userinfo.is_empty() {
            bail!("Shadowsocks URI missing userinfo");
        }

        let (method, password) = match link::password(&url) {
            Some(password) => (userinfo, password),
            None => {
                let decoded = decode_base64_string(&userinfo)
                    .context("Failed to decode Shadowsocks userinfo")?;
                let (method, password) = decoded
                    .split_once(':')
                    .ok_or_else(|| anyhow!("Invalid Shadowsocks userinfo: missing method:password separator"))?;
                (method.to_string(), password.to_string())
            }
        };

        let mut profile = Profile::new(ConfigType::Shadowsocks);
        profile.remarks = link::remarks(&url);
        profile.server = link::server(&url, "Shadowsocks")?;
        profile.server_port = link::server_port(&url);
        profile.method = method;
        profile.password = password;

        let query = QueryParams::from_url(&url);
        let plugin = query.get("plugin");
        if !plugin.is_empty() {
            apply_plugin(&mut profile, plugin);
        }

        Ok(profile)
    }

    fn parse_legacy(&self, uri: &str) -> Result<Profile> {
        let content = uri
            .strip_prefix("ss://")
            .ok_or_else(|| anyhow!("Invalid Shadowsocks URI: missing ss:// prefix"))?;

        let (body, remarks) = match content.split_once('#') {
            Some((body, fragment)) => (body, link::decode_remarks(fragment)),
            None => (content, NO_REMARKS.to_string()),
        };

        let decoded =
            decode_base64_string(body).context("Failed to decode legacy Shadowsocks URI")?;

        let (userinfo, host_port) = decoded
            .rsplit_once('@')
            .ok_or_else(|| anyhow!("Invalid legacy Shadowsocks format: missing @"))?;
        let (method, password) = userinfo
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid Shadowsocks userinfo: missing method:password separator"))?;
        // Split on the last colon so unbracketed IPv6 hosts survive
        let (server, port) = host_port
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("Invalid legacy Shadowsocks format: missing port"))?;

        let mut profile = Profile::new(ConfigType::Shadowsocks);
        profile.remarks = remarks;
        profile.server = server.trim_matches(['[', ']']).to_string();
        profile.server_port = port.trim().to_string();
        profile.method = method.to_string();
        profile.password = password.to_string();
        Ok(profile)
    }
}

/// Maps an `obfs=http` SIP003 plugin onto a tcp transport with an http header
///
/// Other plugins are not representable and are ignored.
fn apply_plugin(profile: &mut Profile, plugin: &str) {
    if !plugin.contains("obfs=http") && !plugin.contains("obfs-local") {
        trace!("Ignoring unsupported Shadowsocks plugin: {}", plugin);
        return;
    }

    profile.network = NetworkKind::Tcp;
    profile.header_type = "http".to_string();

    let opts: HashMap<&str, &str> = plugin
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect();

    if let Some(host) = opts.get("obfs-host") {
        profile.host = host.to_string();
    }
    if let Some(path) = opts.get("path") {
        profile.path = path.to_string();
    }
}
