//! Xray outbound generation
//!
//! Every profile kind maps onto one outbound with the `proxy` tag and
//! multiplexing switched off. Hysteria2 is the exception in shape: the
//! outbound is a SOCKS client pointed at the local listener of a separately
//! generated Hysteria2 client config.

pub mod stream;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ConfigType, NetworkKind, Profile};
use crate::util::bracket_ipv6;
use crate::util::serde_helpers::is_zero_u32;

pub use stream::{StreamSettings, build_stream_settings, resolve_server_name};

/// User level attached to every generated user and server entry
pub const DEFAULT_LEVEL: u32 = 8;

/// Tag carried by every generated outbound
pub const OUTBOUND_TAG: &str = "proxy";

/// Loopback address the Hysteria2 client listens on
pub const LOOPBACK: &str = "127.0.0.1";

// ============================================================================
// Descriptor Types
// ============================================================================

/// Top-level wrapper holding one or more outbounds
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct XrayConfig {
    pub outbounds: Vec<XrayOutbound>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct XrayOutbound {
    pub mux: Mux,
    pub protocol: String,
    pub settings: OutboundSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<StreamSettings>,
    pub tag: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Mux {
    pub enabled: bool,
    pub concurrency: i32,
}

impl Default for Mux {
    fn default() -> Self {
        Self {
            enabled: false,
            concurrency: -1,
        }
    }
}

/// Protocol settings block; its shape depends on the protocol
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum OutboundSettings {
    Vnext { vnext: Vec<VnextServer> },
    Servers { servers: Vec<ServerEntry> },
    WireGuard(WireGuardSettings),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VnextServer {
    pub address: String,
    pub port: u16,
    pub users: Vec<VnextUser>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VnextUser {
    pub id: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
    /// Always present for VLESS, even when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub alter_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ServerEntry {
    pub address: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<ServerUser>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerUser {
    pub user: String,
    pub pass: String,
    pub level: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireGuardSettings {
    pub secret_key: String,
    pub address: Vec<String>,
    pub peers: Vec<WireGuardPeer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved: Vec<u8>,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub mtu: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireGuardPeer {
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pre_shared_key: String,
    pub endpoint: String,
}

impl XrayOutbound {
    fn new(protocol: &str, settings: OutboundSettings, stream: Option<StreamSettings>) -> Self {
        Self {
            mux: Mux::default(),
            protocol: protocol.to_string(),
            settings,
            stream_settings: stream,
            tag: OUTBOUND_TAG.to_string(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ============================================================================
// Generation
// ============================================================================

/// Builds the outbound for one profile.
///
/// `local_port` is only used for Hysteria2, whose outbound targets the SOCKS
/// listener of the local Hysteria2 client.
pub fn generate_outbound(profile: &Profile, local_port: u16) -> Result<XrayOutbound> {
    debug!("Generating Xray outbound for {} profile '{}'", profile.config_type, profile.remarks);

    let outbound = match profile.config_type {
        ConfigType::VLess => vless_outbound(profile),
        ConfigType::VMess => vmess_outbound(profile),
        ConfigType::Shadowsocks => shadowsocks_outbound(profile),
        ConfigType::Trojan => trojan_outbound(profile),
        ConfigType::Socks => socks_outbound(
            &profile.server,
            profile.port(),
            &profile.username,
            &profile.password,
        ),
        ConfigType::Http => http_outbound(profile),
        ConfigType::WireGuard => wireguard_outbound(profile),
        ConfigType::Hysteria2 => socks_outbound(LOOPBACK, local_port, "", ""),
        ConfigType::Custom => bail!("custom profiles have no Xray outbound"),
    };
    Ok(outbound)
}

/// Wraps a single profile's outbound in a config
pub fn generate_config(profile: &Profile, local_port: u16) -> Result<XrayConfig> {
    Ok(XrayConfig {
        outbounds: vec![generate_outbound(profile, local_port)?],
    })
}

/// Wraps every profile's outbound in one config; profiles that cannot be
/// generated are skipped with a warning
pub fn generate_batch_config(profiles: &[Profile], local_port: u16) -> XrayConfig {
    let outbounds = profiles
        .iter()
        .filter_map(|profile| match generate_outbound(profile, local_port) {
            Ok(outbound) => Some(outbound),
            Err(e) => {
                warn!("Skipping '{}': {:#}", profile.remarks, e);
                None
            }
        })
        .collect();
    XrayConfig { outbounds }
}

fn vless_outbound(p: &Profile) -> XrayOutbound {
    let user = VnextUser {
        id: p.password.clone(),
        level: DEFAULT_LEVEL,
        encryption: Some(p.method.clone()),
        flow: Some(p.flow.clone()),
        ..Default::default()
    };
    XrayOutbound::new(
        "vless",
        OutboundSettings::Vnext {
            vnext: vec![VnextServer {
                address: p.server.clone(),
                port: p.port(),
                users: vec![user],
            }],
        },
        Some(build_stream_settings(p)),
    )
}

fn vmess_outbound(p: &Profile) -> XrayOutbound {
    let security = if p.method.is_empty() { "auto" } else { &p.method };
    let user = VnextUser {
        id: p.password.clone(),
        level: DEFAULT_LEVEL,
        alter_id: p.alter_id,
        security: Some(security.to_string()),
        ..Default::default()
    };
    XrayOutbound::new(
        "vmess",
        OutboundSettings::Vnext {
            vnext: vec![VnextServer {
                address: p.server.clone(),
                port: p.port(),
                users: vec![user],
            }],
        },
        Some(build_stream_settings(p)),
    )
}

fn shadowsocks_outbound(p: &Profile) -> XrayOutbound {
    let server = ServerEntry {
        address: p.server.clone(),
        port: p.port(),
        method: non_empty(&p.method),
        password: non_empty(&p.password),
        level: Some(DEFAULT_LEVEL),
        ..Default::default()
    };
    // plain shadowsocks carries no stream settings
    let stream = (p.header_type == "http" || p.network != NetworkKind::Tcp)
        .then(|| build_stream_settings(p));
    XrayOutbound::new(
        "shadowsocks",
        OutboundSettings::Servers {
            servers: vec![server],
        },
        stream,
    )
}

fn trojan_outbound(p: &Profile) -> XrayOutbound {
    let server = ServerEntry {
        address: p.server.clone(),
        port: p.port(),
        password: non_empty(&p.password),
        level: Some(DEFAULT_LEVEL),
        flow: non_empty(&p.flow),
        ..Default::default()
    };
    XrayOutbound::new(
        "trojan",
        OutboundSettings::Servers {
            servers: vec![server],
        },
        Some(build_stream_settings(p)),
    )
}

fn credentials(username: &str, password: &str) -> Vec<ServerUser> {
    if username.is_empty() {
        return Vec::new();
    }
    vec![ServerUser {
        user: username.to_string(),
        pass: password.to_string(),
        level: DEFAULT_LEVEL,
    }]
}

fn socks_outbound(server: &str, port: u16, username: &str, password: &str) -> XrayOutbound {
    let server = ServerEntry {
        address: server.to_string(),
        port,
        level: Some(DEFAULT_LEVEL),
        users: credentials(username, password),
        ..Default::default()
    };
    XrayOutbound::new(
        "socks",
        OutboundSettings::Servers {
            servers: vec![server],
        },
        None,
    )
}

fn http_outbound(p: &Profile) -> XrayOutbound {
    let server = ServerEntry {
        address: p.server.clone(),
        port: p.port(),
        users: credentials(&p.username, &p.password),
        ..Default::default()
    };
    XrayOutbound::new(
        "http",
        OutboundSettings::Servers {
            servers: vec![server],
        },
        None,
    )
}

fn wireguard_outbound(p: &Profile) -> XrayOutbound {
    let settings = WireGuardSettings {
        secret_key: p.password.clone(),
        address: p.local_addresses(),
        peers: vec![WireGuardPeer {
            public_key: p.peer_public_key.clone(),
            pre_shared_key: p.pre_shared_key.clone(),
            endpoint: format!("{}:{}", bracket_ipv6(&p.server), p.port()),
        }],
        reserved: p.reserved_bytes(),
        mtu: p.mtu,
    };
    XrayOutbound::new("wireguard", OutboundSettings::WireGuard(settings), None)
}
