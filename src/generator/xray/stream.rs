//! Stream settings: one transport block plus an optional TLS or Reality block
//!
//! The transport builder returns its settings together with the server-name
//! candidate it derived, and [`resolve_server_name`] decides between that
//! candidate, the explicit SNI and the server address.

use serde::{Deserialize, Serialize};

use crate::model::{NetworkKind, Profile, SecurityKind};
use crate::model::profile::split_and_trim;
use crate::util::is_domain_name;
use crate::util::serde_helpers::is_false;

// ============================================================================
// Stream Settings
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StreamSettings {
    pub network: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub security: String,

    #[serde(flatten)]
    pub transport: Option<TransportSettings>,

    #[serde(flatten)]
    pub security_settings: Option<SecuritySettings>,
}

/// Exactly one transport block, keyed by its Xray settings name
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum TransportSettings {
    #[serde(rename = "tcpSettings")]
    Tcp(TcpSettings),
    #[serde(rename = "kcpSettings")]
    Kcp(KcpSettings),
    #[serde(rename = "wsSettings")]
    Ws(WsSettings),
    #[serde(rename = "httpupgradeSettings")]
    HttpUpgrade(HttpUpgradeSettings),
    #[serde(rename = "xhttpSettings")]
    Xhttp(XhttpSettings),
    #[serde(rename = "httpSettings")]
    H2(HttpSettings),
    #[serde(rename = "grpcSettings")]
    Grpc(GrpcSettings),
}

/// TLS and Reality share one settings shape; only the key differs
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum SecuritySettings {
    #[serde(rename = "tlsSettings")]
    Tls(TlsSettings),
    #[serde(rename = "realitySettings")]
    Reality(TlsSettings),
}

// ============================================================================
// Transport Blocks
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TcpSettings {
    pub header: TcpHeader,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TcpHeader {
    #[serde(rename = "type")]
    pub header_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<TcpRequest>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TcpRequest {
    pub headers: TcpHeaders,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TcpHeaders {
    #[serde(rename = "Host", default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KcpSettings {
    pub mtu: u32,
    pub tti: u32,
    pub uplink_capacity: u32,
    pub downlink_capacity: u32,
    pub congestion: bool,
    pub read_buffer_size: u32,
    pub write_buffer_size: u32,
    pub header: KcpHeader,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub seed: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KcpHeader {
    #[serde(rename = "type")]
    pub header_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WsSettings {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<WsHeaders>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WsHeaders {
    #[serde(rename = "Host")]
    pub host: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HttpUpgradeSettings {
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct XhttpSettings {
    pub host: String,
    pub mode: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HttpSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,
    pub path: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GrpcSettings {
    #[serde(rename = "serviceName", default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authority: String,
    #[serde(rename = "multiMode", default, skip_serializing_if = "is_false")]
    pub multi_mode: bool,
    pub idle_timeout: u32,
    pub health_check_timeout: u32,
}

// ============================================================================
// TLS Block
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TlsSettings {
    pub allow_insecure: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_id: String,
    pub show: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spider_x: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mldsa65_verify: String,
}

// ============================================================================
// Builders
// ============================================================================

const KCP_MTU: u32 = 1350;
const KCP_TTI: u32 = 50;
const KCP_UPLINK_CAPACITY: u32 = 12;
const KCP_DOWNLINK_CAPACITY: u32 = 100;
const GRPC_IDLE_TIMEOUT: u32 = 60;
const GRPC_HEALTH_CHECK_TIMEOUT: u32 = 20;

/// Builds the complete stream settings for a profile
pub fn build_stream_settings(profile: &Profile) -> StreamSettings {
    let (network, transport, candidate) = build_transport(profile);
    StreamSettings {
        network: network.to_string(),
        security: profile.security.as_str().to_string(),
        transport,
        security_settings: build_security(profile, &candidate),
    }
}

/// Builds the transport block for the profile's network.
///
/// Returns the network name to emit, the block (none for networks without
/// one) and the server-name candidate derived from transport fields.
pub fn build_transport(profile: &Profile) -> (&'static str, Option<TransportSettings>, String) {
    match profile.network {
        NetworkKind::Tcp => {
            let (settings, candidate) = build_tcp(profile);
            ("tcp", Some(TransportSettings::Tcp(settings)), candidate)
        }
        NetworkKind::Kcp => {
            let settings = KcpSettings {
                mtu: KCP_MTU,
                tti: KCP_TTI,
                uplink_capacity: KCP_UPLINK_CAPACITY,
                downlink_capacity: KCP_DOWNLINK_CAPACITY,
                congestion: false,
                read_buffer_size: 1,
                write_buffer_size: 1,
                header: KcpHeader {
                    header_type: or_default(&profile.header_type, "none"),
                    domain: profile.host.clone(),
                },
                seed: profile.seed.clone(),
            };
            ("kcp", Some(TransportSettings::Kcp(settings)), String::new())
        }
        NetworkKind::Ws => {
            let settings = WsSettings {
                path: or_default(&profile.path, "/"),
                headers: (!profile.host.is_empty()).then(|| WsHeaders {
                    host: profile.host.clone(),
                }),
            };
            ("ws", Some(TransportSettings::Ws(settings)), profile.host.clone())
        }
        NetworkKind::HttpUpgrade => {
            let settings = HttpUpgradeSettings {
                path: or_default(&profile.path, "/"),
                host: profile.host.clone(),
            };
            (
                "httpupgrade",
                Some(TransportSettings::HttpUpgrade(settings)),
                profile.host.clone(),
            )
        }
        NetworkKind::Xhttp => {
            let settings = XhttpSettings {
                host: profile.host.clone(),
                mode: or_default(&profile.xhttp_mode, "auto"),
                path: or_default(&profile.path, "/"),
                // malformed extra JSON is dropped
                extra: serde_json::from_str(&profile.xhttp_extra).ok(),
            };
            ("xhttp", Some(TransportSettings::Xhttp(settings)), profile.host.clone())
        }
        NetworkKind::H2 | NetworkKind::Http => {
            let hosts = split_and_trim(&profile.host);
            let candidate = hosts.first().cloned().unwrap_or_default();
            let settings = HttpSettings {
                host: hosts,
                path: or_default(&profile.path, "/"),
            };
            ("h2", Some(TransportSettings::H2(settings)), candidate)
        }
        NetworkKind::Grpc => {
            let settings = GrpcSettings {
                service_name: profile.service_name.clone(),
                authority: profile.authority.clone(),
                multi_mode: profile.mode == "multi",
                idle_timeout: GRPC_IDLE_TIMEOUT,
                health_check_timeout: GRPC_HEALTH_CHECK_TIMEOUT,
            };
            ("grpc", Some(TransportSettings::Grpc(settings)), profile.authority.clone())
        }
        NetworkKind::Quic => ("quic", None, String::new()),
    }
}

fn build_tcp(profile: &Profile) -> (TcpSettings, String) {
    if profile.header_type != "http" {
        let settings = TcpSettings {
            header: TcpHeader {
                header_type: "none".to_string(),
                request: None,
            },
        };
        return (settings, profile.host.clone());
    }

    let mut candidate = String::new();
    let request = if profile.host.is_empty() && profile.path.is_empty() {
        None
    } else {
        let hosts = split_and_trim(&profile.host);
        candidate = hosts.first().cloned().unwrap_or_default();
        Some(TcpRequest {
            headers: TcpHeaders { host: hosts },
            path: split_and_trim(&profile.path),
        })
    };

    let settings = TcpSettings {
        header: TcpHeader {
            header_type: "http".to_string(),
            request,
        },
    };
    (settings, candidate)
}

/// Picks the TLS server name.
///
/// Priority: explicit SNI, then a domain-shaped candidate, then a
/// domain-shaped server address, then the candidate as-is.
pub fn resolve_server_name(sni: &str, candidate: &str, server: &str) -> String {
    if !sni.is_empty() {
        sni.to_string()
    } else if is_domain_name(candidate) {
        candidate.to_string()
    } else if is_domain_name(server) {
        server.to_string()
    } else {
        candidate.to_string()
    }
}

/// Builds the TLS or Reality block; none when security is off
pub fn build_security(profile: &Profile, candidate: &str) -> Option<SecuritySettings> {
    if profile.security.is_none() {
        return None;
    }

    let mut tls = TlsSettings {
        allow_insecure: profile.insecure,
        server_name: resolve_server_name(&profile.sni, candidate, &profile.server),
        fingerprint: profile.fingerprint.clone(),
        alpn: profile.alpn_list(),
        ..Default::default()
    };

    match profile.security {
        SecurityKind::Reality => {
            tls.public_key = profile.public_key.clone();
            tls.short_id = profile.short_id.clone();
            tls.spider_x = profile.spider_x.clone();
            tls.mldsa65_verify = profile.mldsa65_verify.clone();
            Some(SecuritySettings::Reality(tls))
        }
        SecurityKind::Tls => Some(SecuritySettings::Tls(tls)),
        SecurityKind::None => None,
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
