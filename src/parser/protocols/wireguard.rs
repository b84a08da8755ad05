//! WireGuard parser
//!
//! Two inputs produce the same profile shape:
//! - URI: wireguard://privateKey@host:port?publickey=...&address=...#remarks
//!   (`wg://` is an alias)
//! - Config-file text with `[Interface]` and `[Peer]` sections

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use tracing::{debug, trace};

use crate::model::{
    ConfigType, DEFAULT_LOCAL_ADDRESS, DEFAULT_RESERVED, DEFAULT_WIREGUARD_MTU, Profile,
};
use crate::parser::ProtocolParser;
use crate::parser::link;
use crate::parser::query::QueryParams;

// ============================================================================
// URI Parser
// ============================================================================

/// Parser for WireGuard (wireguard:// and wg://) URIs
pub struct WireGuardParser;

impl ProtocolParser for WireGuardParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::WireGuard
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["wireguard://", "wg://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        let uri = uri.trim();
        trace!("Parsing WireGuard URI");

        let normalized = match uri.strip_prefix("wg://") {
            Some(rest) => format!("wireguard://{}", rest),
            None => uri.to_string(),
        };
        let url = link::parse_url(&normalized, "WireGuard")?;
        let query = QueryParams::from_url(&url);

        let mut profile = Profile::new(ConfigType::WireGuard);
        profile.remarks = link::remarks(&url);
        profile.server = link::server(&url, "WireGuard")?;
        profile.server_port = link::server_port(&url);
        profile.password = link::username(&url);

        profile.peer_public_key = query.first_present(&["publickey", "peer"]).to_string();
        profile.local_address = or_default(query.get("address"), DEFAULT_LOCAL_ADDRESS);
        profile.reserved = or_default(query.get("reserved"), DEFAULT_RESERVED);
        profile.pre_shared_key = query.get("presharedkey").to_string();
        profile.mtu = parse_mtu(query.get("mtu"));

        Ok(profile)
    }
}

// ============================================================================
// Config-File Parser
// ============================================================================

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Interface,
    Peer,
}

/// Returns true when `content` looks like a WireGuard config file
pub fn is_wireguard_conf(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.trim().to_ascii_lowercase().starts_with("[interface]"))
}

/// Parses WireGuard config-file text into a profile.
///
/// Section headers are case-insensitive, keys are lowercased, and `#`
/// comments and blank lines are skipped. Config files carry no label, so
/// remarks default to the current Unix time in milliseconds.
pub fn parse_wireguard_conf(content: &str) -> Result<Profile> {
    let mut interface: HashMap<String, String> = HashMap::new();
    let mut peer: HashMap<String, String> = HashMap::new();
    let mut current: Option<Section> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let lower = line.to_ascii_lowercase();
        if lower.starts_with("[interface]") {
            current = Some(Section::Interface);
            continue;
        }
        if lower.starts_with("[peer]") {
            current = Some(Section::Peer);
            continue;
        }

        let Some(section) = current else {
            continue;
        };
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match section {
                Section::Interface => interface.insert(key, value),
                Section::Peer => peer.insert(key, value),
            };
        }
    }

    if !is_wireguard_conf(content) {
        bail!("WireGuard config has no [Interface] section");
    }

    let field = |map: &HashMap<String, String>, key: &str| -> String {
        map.get(key).cloned().unwrap_or_default()
    };

    let mut profile = Profile::new(ConfigType::WireGuard);
    profile.remarks = timestamp_millis();
    profile.password = field(&interface, "privatekey");
    profile.local_address = or_default(&field(&interface, "address"), DEFAULT_LOCAL_ADDRESS);
    profile.mtu = parse_mtu(&field(&interface, "mtu"));

    profile.peer_public_key = field(&peer, "publickey");
    profile.pre_shared_key = field(&peer, "presharedkey");
    profile.reserved = or_default(&field(&peer, "reserved"), DEFAULT_RESERVED);

    let endpoint = field(&peer, "endpoint");
    match endpoint.rsplit_once(':') {
        Some((host, port)) => {
            profile.server = host.trim_matches(['[', ']']).to_string();
            profile.server_port = port.to_string();
        }
        None => profile.server = endpoint.clone(),
    }

    debug!(
        "Parsed WireGuard config: endpoint={}:{}, address={}",
        profile.server, profile.server_port, profile.local_address
    );
    Ok(profile)
}

// ============================================================================
// Helpers
// ============================================================================

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Absent means the default MTU; an unparsable value degrades to 0
fn parse_mtu(raw: &str) -> u32 {
    if raw.is_empty() {
        DEFAULT_WIREGUARD_MTU
    } else {
        raw.trim().parse().unwrap_or(0)
    }
}

fn timestamp_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONF: &str = "\
[Interface]
PrivateKey = AAA
Address = 172.16.0.2/32, fd01::2/128
DNS = 1.1.1.1

# peer below
[Peer]
PublicKey = BBB
PresharedKey = CCC
AllowedIPs = 0.0.0.0/0
Endpoint = 10.0.0.1:51820
";

    #[test]
    fn test_wireguard_uri() {
        let uri = "wireguard://PRIV%2Bkey%3D@162.159.192.1:2408?publickey=PUB&address=172.16.0.2%2F32&reserved=1%2C2%2C3&mtu=1280&presharedkey=PSK#Warp";
        let profile = WireGuardParser.parse(uri).unwrap();
        assert_eq!(profile.config_type, ConfigType::WireGuard);
        assert_eq!(profile.password, "PRIV+key=");
        assert_eq!(profile.peer_public_key, "PUB");
        assert_eq!(profile.local_address, "172.16.0.2/32");
        assert_eq!(profile.reserved, "1,2,3");
        assert_eq!(profile.mtu, 1280);
        assert_eq!(profile.pre_shared_key, "PSK");
        assert_eq!(profile.remarks, "Warp");
    }

    #[test]
    fn test_wireguard_uri_defaults_and_alias() {
        let profile = WireGuardParser.parse("wg://KEY@1.2.3.4:51820?peer=PUB").unwrap();
        assert_eq!(profile.peer_public_key, "PUB");
        assert_eq!(profile.local_address, "10.0.0.2/32");
        assert_eq!(profile.reserved, "0,0,0");
        assert_eq!(profile.mtu, 1420);
    }

    #[test]
    fn test_wireguard_uri_bad_mtu_is_zero() {
        let profile = WireGuardParser.parse("wireguard://KEY@1.2.3.4:51820?mtu=big").unwrap();
        assert_eq!(profile.mtu, 0);
    }

    #[test]
    fn test_wireguard_conf() {
        let profile = parse_wireguard_conf(SAMPLE_CONF).unwrap();
        assert_eq!(profile.password, "AAA");
        assert_eq!(profile.local_address, "172.16.0.2/32, fd01::2/128");
        assert_eq!(profile.peer_public_key, "BBB");
        assert_eq!(profile.pre_shared_key, "CCC");
        assert_eq!(profile.server, "10.0.0.1");
        assert_eq!(profile.server_port, "51820");
        assert_eq!(profile.mtu, 1420);
        assert_eq!(profile.reserved, "0,0,0");
        assert!(profile.remarks.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_wireguard_conf_case_insensitive_and_ipv6_endpoint() {
        let conf = "[INTERFACE]\nprivatekey=K\nMTU = 1380\n[peer]\nendpoint = [2606:4700::1]:2408\n";
        let profile = parse_wireguard_conf(conf).unwrap();
        assert_eq!(profile.password, "K");
        assert_eq!(profile.mtu, 1380);
        assert_eq!(profile.server, "2606:4700::1");
        assert_eq!(profile.server_port, "2408");
    }

    #[test]
    fn test_wireguard_conf_requires_interface() {
        assert!(parse_wireguard_conf("[Peer]\nPublicKey = B\n").is_err());
        assert!(!is_wireguard_conf("vless://uuid@example.com:443"));
        assert!(is_wireguard_conf(SAMPLE_CONF));
    }
}
