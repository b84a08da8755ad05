//! The canonical proxy profile
//!
//! Every parser produces a `Profile` and every encoder and generator reads
//! one. Ports and most numeric knobs stay as text, with typed accessors that
//! fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::model::{ConfigType, NetworkKind, SecurityKind};
use crate::util::bracket_ipv6;
use crate::util::serde_helpers::{is_false, is_zero_u32};

/// Remarks used when a link carries no label
pub const NO_REMARKS: &str = "none";

/// WireGuard interface address when none is given
pub const DEFAULT_LOCAL_ADDRESS: &str = "10.0.0.2/32";

/// WireGuard reserved bytes when none are given
pub const DEFAULT_RESERVED: &str = "0,0,0";

/// WireGuard MTU when none is given
pub const DEFAULT_WIREGUARD_MTU: u32 = 1420;

/// Hysteria2 port-hopping interval in seconds when none is given
pub const DEFAULT_HOP_INTERVAL: &str = "30";

/// One proxy endpoint, normalised from any supported link format.
///
/// Values are kept as close to the link text as possible: the port stays a
/// string and multi-valued fields stay comma-joined. Typed views are
/// available through the accessor methods.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    // Identity
    pub config_type: ConfigType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subscription_id: String,
    #[serde(default)]
    pub remarks: String,

    // Endpoint
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub server_port: String,

    // Credentials
    /// UUID for VMess/VLESS, password for Shadowsocks/Trojan/Hysteria2/SOCKS/HTTP,
    /// private key for WireGuard
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flow: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub alter_id: u32,

    // Transport
    #[serde(default)]
    pub network: NetworkKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub header_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub seed: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quic_security: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quic_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authority: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub xhttp_mode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub xhttp_extra: String,

    // Security
    #[serde(default, skip_serializing_if = "SecurityKind::is_none")]
    pub security: SecurityKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alpn: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insecure: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mldsa65_verify: String,

    // Reality
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spider_x: String,

    // WireGuard
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub local_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub peer_public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pre_shared_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reserved: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub mtu: u32,

    // Hysteria2
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub obfs_password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port_hopping: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port_hopping_interval: String,
    #[serde(default, rename = "pinSHA256", skip_serializing_if = "String::is_empty")]
    pub pin_sha256: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bandwidth_down: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bandwidth_up: String,
}

impl Profile {
    /// Creates an empty profile of the given kind with the `none` remarks
    pub fn new(config_type: ConfigType) -> Self {
        Self {
            config_type,
            remarks: NO_REMARKS.to_string(),
            ..Default::default()
        }
    }

    /// Port as a number; unparsable text yields 0
    pub fn port(&self) -> u16 {
        self.server_port.trim().parse().unwrap_or(0)
    }

    /// `host:port`, with IPv6 hosts bracketed
    pub fn server_address_and_port(&self) -> String {
        format!("{}:{}", bracket_ipv6(&self.server), self.server_port)
    }

    /// ALPN protocols, trimmed, empty entries dropped
    pub fn alpn_list(&self) -> Vec<String> {
        split_and_trim(&self.alpn)
    }

    /// Reserved bytes; entries that are not numbers in 0..=255 are dropped
    pub fn reserved_bytes(&self) -> Vec<u8> {
        self.reserved
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }

    /// WireGuard interface addresses, defaulting to `10.0.0.2/32`
    pub fn local_addresses(&self) -> Vec<String> {
        if self.local_address.trim().is_empty() {
            return vec![DEFAULT_LOCAL_ADDRESS.to_string()];
        }
        self.local_address
            .split(',')
            .map(|s| s.trim().to_string())
            .collect()
    }

    /// Port-hopping interval in seconds as text, defaulting to `30`
    pub fn hop_interval(&self) -> &str {
        if self.port_hopping_interval.is_empty() {
            DEFAULT_HOP_INTERVAL
        } else {
            &self.port_hopping_interval
        }
    }
}

/// Splits a comma-joined list, trims each part and drops the empty ones
pub fn split_and_trim(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new(ConfigType::VLess);
        assert_eq!(profile.config_type, ConfigType::VLess);
        assert_eq!(profile.remarks, "none");
        assert_eq!(profile.network, NetworkKind::Tcp);
        assert_eq!(profile.security, SecurityKind::None);
    }

    #[test]
    fn test_port_is_lenient() {
        let mut profile = Profile::new(ConfigType::Socks);
        profile.server_port = "1080".to_string();
        assert_eq!(profile.port(), 1080);
        profile.server_port = "not-a-port".to_string();
        assert_eq!(profile.port(), 0);
        profile.server_port = "70000".to_string();
        assert_eq!(profile.port(), 0);
    }

    #[test]
    fn test_server_address_and_port_brackets_ipv6() {
        let mut profile = Profile::new(ConfigType::Trojan);
        profile.server = "2001:db8::1".to_string();
        profile.server_port = "443".to_string();
        assert_eq!(profile.server_address_and_port(), "[2001:db8::1]:443");
    }

    #[test]
    fn test_alpn_list() {
        let mut profile = Profile::new(ConfigType::VLess);
        profile.alpn = "h2, http/1.1,,".to_string();
        assert_eq!(profile.alpn_list(), vec!["h2", "http/1.1"]);
    }

    #[test]
    fn test_reserved_bytes_drop_garbage() {
        let mut profile = Profile::new(ConfigType::WireGuard);
        profile.reserved = "1, x, 300,4".to_string();
        assert_eq!(profile.reserved_bytes(), vec![1, 4]);
    }

    #[test]
    fn test_local_addresses_default() {
        let mut profile = Profile::new(ConfigType::WireGuard);
        assert_eq!(profile.local_addresses(), vec!["10.0.0.2/32"]);
        profile.local_address = "172.16.0.2/32, fd01::2/128".to_string();
        assert_eq!(profile.local_addresses(), vec!["172.16.0.2/32", "fd01::2/128"]);
    }

    #[test]
    fn test_hop_interval_default() {
        let mut profile = Profile::new(ConfigType::Hysteria2);
        assert_eq!(profile.hop_interval(), "30");
        profile.port_hopping_interval = "15".to_string();
        assert_eq!(profile.hop_interval(), "15");
    }

    #[test]
    fn test_json_field_names() {
        let mut profile = Profile::new(ConfigType::Hysteria2);
        profile.server = "example.com".to_string();
        profile.server_port = "443".to_string();
        profile.pin_sha256 = "AA:BB".to_string();
        profile.security = SecurityKind::Tls;
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["configType"], "hysteria2");
        assert_eq!(json["serverPort"], "443");
        assert_eq!(json["pinSHA256"], "AA:BB");
        assert_eq!(json["security"], "tls");
        assert_eq!(json["network"], "tcp");
        assert!(json.get("password").is_none());
        assert!(json.get("insecure").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut profile = Profile::new(ConfigType::VMess);
        profile.server = "example.com".to_string();
        profile.server_port = "443".to_string();
        profile.alter_id = 2;
        profile.network = NetworkKind::Grpc;
        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
