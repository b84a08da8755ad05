//! Native Hysteria2 client config generation

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ConfigType, Profile};
use crate::util::bracket_ipv6;
use crate::util::serde_helpers::is_false;

use super::xray::LOOPBACK;

pub const OBFS_SALAMANDER: &str = "salamander";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hysteria2Config {
    pub server: String,
    pub auth: String,
    pub lazy: bool,
    pub socks5: Listener,
    pub http: Listener,
    pub tls: Hysteria2Tls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs: Option<Obfs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<Bandwidth>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Listener {
    pub listen: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hysteria2Tls {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sni: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insecure: bool,
    #[serde(rename = "pinSHA256", default, skip_serializing_if = "String::is_empty")]
    pub pin_sha256: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Obfs {
    #[serde(rename = "type")]
    pub obfs_type: String,
    pub salamander: Salamander,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Salamander {
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transport {
    #[serde(rename = "type")]
    pub transport_type: String,
    pub udp: UdpTransport,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UdpTransport {
    pub hop_interval: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Bandwidth {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub up: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub down: String,
}

/// Builds the client config for a Hysteria2 profile.
///
/// The SOCKS5 and HTTP listeners share `127.0.0.1:<local_port>`.
pub fn generate_hysteria2_config(profile: &Profile, local_port: u16) -> Result<Hysteria2Config> {
    if profile.config_type != ConfigType::Hysteria2 {
        bail!(
            "Hysteria2 config requires a hysteria2 profile, got {}",
            profile.config_type
        );
    }
    debug!("Generating Hysteria2 config for '{}'", profile.remarks);

    let listen = format!("{}:{}", LOOPBACK, local_port);
    let sni = if profile.sni.is_empty() {
        profile.server.clone()
    } else {
        profile.sni.clone()
    };

    let mut server = profile.server_address_and_port();
    let mut transport = None;
    if !profile.port_hopping.is_empty() {
        server = format!("{}:{}", bracket_ipv6(&profile.server), profile.port_hopping);
        transport = Some(Transport {
            transport_type: "udp".to_string(),
            udp: UdpTransport {
                hop_interval: format!("{}s", profile.hop_interval()),
            },
        });
    }

    let obfs = (!profile.obfs_password.is_empty()).then(|| Obfs {
        obfs_type: OBFS_SALAMANDER.to_string(),
        salamander: Salamander {
            password: profile.obfs_password.clone(),
        },
    });

    let bandwidth = (!profile.bandwidth_up.is_empty() || !profile.bandwidth_down.is_empty())
        .then(|| Bandwidth {
            up: profile.bandwidth_up.clone(),
            down: profile.bandwidth_down.clone(),
        });

    Ok(Hysteria2Config {
        server,
        auth: profile.password.clone(),
        lazy: true,
        socks5: Listener {
            listen: listen.clone(),
        },
        http: Listener { listen },
        tls: Hysteria2Tls {
            sni,
            insecure: profile.insecure,
            pin_sha256: profile.pin_sha256.clone(),
        },
        obfs,
        transport,
        bandwidth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> Profile {
        let mut p = Profile::new(ConfigType::Hysteria2);
        p.server = "hy.example.com".to_string();
        p.server_port = "443".to_string();
        p.password = "secret".to_string();
        p
    }

    #[test]
    fn test_minimal_config() {
        let value = serde_json::to_value(generate_hysteria2_config(&profile(), 1080).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "server": "hy.example.com:443",
                "auth": "secret",
                "lazy": true,
                "socks5": {"listen": "127.0.0.1:1080"},
                "http": {"listen": "127.0.0.1:1080"},
                "tls": {"sni": "hy.example.com"}
            })
        );
    }

    #[test]
    fn test_empty_sni_is_omitted() {
        let tls = Hysteria2Tls {
            sni: String::new(),
            insecure: true,
            pin_sha256: String::new(),
        };
        assert_eq!(serde_json::to_value(&tls).unwrap(), json!({"insecure": true}));
        let back: Hysteria2Tls = serde_json::from_str(r#"{"insecure":true}"#).unwrap();
        assert_eq!(back, tls);
    }

    #[test]
    fn test_full_config() {
        let mut p = profile();
        p.sni = "cdn.example.com".to_string();
        p.insecure = true;
        p.pin_sha256 = "AB:CD".to_string();
        p.obfs_password = "ob".to_string();
        p.port_hopping = "20000-30000".to_string();
        p.bandwidth_down = "100 mbps".to_string();

        let value = serde_json::to_value(generate_hysteria2_config(&p, 1234).unwrap()).unwrap();
        assert_eq!(value["server"], "hy.example.com:20000-30000");
        assert_eq!(value["tls"], json!({"sni": "cdn.example.com", "insecure": true, "pinSHA256": "AB:CD"}));
        assert_eq!(value["obfs"], json!({"type": "salamander", "salamander": {"password": "ob"}}));
        assert_eq!(value["transport"], json!({"type": "udp", "udp": {"hopInterval": "30s"}}));
        assert_eq!(value["bandwidth"], json!({"down": "100 mbps"}));
    }

    #[test]
    fn test_port_hopping_ipv6_and_interval() {
        let mut p = profile();
        p.server = "2001:db8::1".to_string();
        p.port_hopping = "443,8443".to_string();
        p.port_hopping_interval = "15".to_string();
        let config = generate_hysteria2_config(&p, 1234).unwrap();
        assert_eq!(config.server, "[2001:db8::1]:443,8443");
        assert_eq!(config.transport.unwrap().udp.hop_interval, "15s");
    }

    #[test]
    fn test_rejects_other_kinds() {
        let p = Profile::new(ConfigType::Trojan);
        assert!(generate_hysteria2_config(&p, 1234).is_err());
    }
}
