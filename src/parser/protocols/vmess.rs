//! VMess protocol parser
//!
//! VMess links come in two shapes:
//! - vmess://BASE64({"v":"2","ps":"name","add":"host","port":"443",...})
//! - vmess://uuid@host:port?params#remarks (same layout as VLESS)

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{ConfigType, NetworkKind, Profile, SecurityKind};
use crate::parser::ProtocolParser;
use crate::parser::lenient::LenientJson;
use crate::parser::link;
use crate::parser::query::{QueryParams, absorb_transport_and_tls};
use crate::util::decode_base64_string;

// ============================================================================
// VMess JSON Payload
// ============================================================================

/// The base64-wrapped JSON body of a VMess link
///
/// Every field is text. Numbers are accepted on input and kept as their
/// decimal form.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct VMessQrCode {
    #[serde(default, deserialize_with = "string_or_number")]
    pub v: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub ps: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub add: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub aid: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub scy: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub net: String,
    #[serde(default, rename = "type", deserialize_with = "string_or_number")]
    pub header_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub host: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub path: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tls: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sni: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub alpn: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub fp: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub insecure: String,
}

impl VMessQrCode {
    /// Builds the payload by scanning text the strict decoder rejected
    pub fn from_lenient(json: &LenientJson<'_>) -> Self {
        Self {
            v: json.field("v").to_string(),
            ps: json.field("ps").to_string(),
            add: json.field("add").to_string(),
            port: json.field("port").to_string(),
            id: json.field("id").to_string(),
            aid: json.field("aid").to_string(),
            scy: json.field("scy").to_string(),
            net: json.field("net").to_string(),
            header_type: json.field("type").to_string(),
            host: json.field("host").to_string(),
            path: json.field("path").to_string(),
            tls: json.field("tls").to_string(),
            sni: json.field("sni").to_string(),
            alpn: json.field("alpn").to_string(),
            fp: json.field("fp").to_string(),
            insecure: json.field("insecure").to_string(),
        }
    }

    /// Builds the payload for a profile, remapping the kcp and grpc fields
    pub fn from_profile(profile: &Profile) -> Self {
        let mut qr = Self {
            v: "2".to_string(),
            ps: profile.remarks.clone(),
            add: profile.server.clone(),
            port: profile.server_port.clone(),
            id: profile.password.clone(),
            aid: profile.alter_id.to_string(),
            scy: profile.method.clone(),
            net: profile.network.as_str().to_string(),
            header_type: profile.header_type.clone(),
            host: profile.host.clone(),
            path: profile.path.clone(),
            tls: String::new(),
            sni: profile.sni.clone(),
            alpn: profile.alpn.clone(),
            fp: profile.fingerprint.clone(),
            insecure: String::new(),
        };

        if profile.security == SecurityKind::Tls {
            qr.tls = "tls".to_string();
        }
        if profile.insecure {
            qr.insecure = "1".to_string();
        }

        match profile.network {
            NetworkKind::Kcp => qr.path = profile.seed.clone(),
            NetworkKind::Grpc => {
                qr.header_type = profile.mode.clone();
                qr.path = profile.service_name.clone();
                qr.host = profile.authority.clone();
            }
            _ => {}
        }

        qr
    }

    pub fn into_profile(self) -> Profile {
        let mut profile = Profile::new(ConfigType::VMess);
        profile.remarks = link::decode_plain_remarks(&self.ps);
        profile.server = self.add;
        profile.server_port = self.port;
        profile.password = self.id;
        profile.alter_id = self.aid.trim().parse().unwrap_or(0);
        profile.method = if self.scy.is_empty() {
            "auto".to_string()
        } else {
            self.scy
        };

        profile.network = NetworkKind::parse(&self.net);
        match profile.network {
            NetworkKind::Kcp => profile.seed = self.path.clone(),
            NetworkKind::Grpc => {
                profile.mode = self.header_type.clone();
                profile.service_name = self.path.clone();
                profile.authority = self.host.clone();
            }
            _ => {}
        }
        profile.header_type = self.header_type;
        profile.host = self.host;
        profile.path = self.path;

        if self.tls == "tls" {
            profile.security = SecurityKind::Tls;
        }
        profile.sni = self.sni;
        profile.alpn = self.alpn;
        profile.fingerprint = self.fp;
        profile.insecure = self.insecure == "1";

        profile
    }
}

// ============================================================================
// VMess Parser
// ============================================================================

/// Parser for VMess (vmess://) URIs
pub struct VMessParser;

impl ProtocolParser for VMessParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::VMess
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["vmess://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        let uri = uri.trim();
        trace!("Parsing VMess URI");

        let body = uri
            .strip_prefix("vmess://")
            .ok_or_else(|| anyhow!("Invalid VMess URI: missing vmess:// prefix"))?;

        match decode_base64_string(body) {
            Ok(decoded) if decoded.contains('"') => Ok(self.parse_json(&decoded)),
            _ => {
                trace!("VMess body is not base64 JSON, parsing as VLESS-shaped link");
                self.parse_link(uri)
            }
        }
    }
}

impl VMessParser {
    /// Strict decode first, field scan when the payload is not valid JSON
    fn parse_json(&self, decoded: &str) -> Profile {
        trace!("Decoded VMess JSON: {}", decoded);
        let qr = match serde_json::from_str::<VMessQrCode>(decoded) {
            Ok(qr) => qr,
            Err(e) => {
                trace!("Strict VMess JSON decode failed ({}), scanning fields", e);
                VMessQrCode::from_lenient(&LenientJson::new(decoded))
            }
        };
        qr.into_profile()
    }

    fn parse_link(&self, uri: &str) -> Result<Profile> {
        let url = link::parse_url(uri, "VMess")?;
        let query = QueryParams::from_url(&url);

        let mut profile = Profile::new(ConfigType::VMess);
        profile.remarks = link::remarks(&url);
        profile.server = link::server(&url, "VMess")?;
        profile.server_port = link::server_port(&url);
        profile.password = link::username(&url);
        profile.method = "auto".to_string();

        absorb_transport_and_tls(&mut profile, &query);
        Ok(profile)
    }
}

// ============================================================================
// Deserialization Helpers
// ============================================================================

/// Accepts a JSON string, number or null and yields text
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextValue {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<TextValue>::deserialize(deserializer)? {
        Some(TextValue::String(s)) => s,
        Some(TextValue::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
