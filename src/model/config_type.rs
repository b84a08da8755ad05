use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocol kind of a profile
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    VMess,
    VLess,
    Shadowsocks,
    Socks,
    Http,
    Trojan,
    WireGuard,
    Hysteria2,
    #[default]
    Custom,
}

impl ConfigType {
    /// Every kind, in declaration order
    pub const ALL: [ConfigType; 9] = [
        ConfigType::VMess,
        ConfigType::VLess,
        ConfigType::Shadowsocks,
        ConfigType::Socks,
        ConfigType::Http,
        ConfigType::Trojan,
        ConfigType::WireGuard,
        ConfigType::Hysteria2,
        ConfigType::Custom,
    ];

    /// Lowercase label, also used as the serialized form
    pub fn label(self) -> &'static str {
        match self {
            ConfigType::VMess => "vmess",
            ConfigType::VLess => "vless",
            ConfigType::Shadowsocks => "shadowsocks",
            ConfigType::Socks => "socks",
            ConfigType::Http => "http",
            ConfigType::Trojan => "trojan",
            ConfigType::WireGuard => "wireguard",
            ConfigType::Hysteria2 => "hysteria2",
            ConfigType::Custom => "custom",
        }
    }

    /// Canonical share-link prefix; custom profiles have none
    pub fn scheme(self) -> Option<&'static str> {
        match self {
            ConfigType::VMess => Some("vmess://"),
            ConfigType::VLess => Some("vless://"),
            ConfigType::Shadowsocks => Some("ss://"),
            ConfigType::Socks => Some("socks://"),
            ConfigType::Http => Some("http://"),
            ConfigType::Trojan => Some("trojan://"),
            ConfigType::WireGuard => Some("wireguard://"),
            ConfigType::Hysteria2 => Some("hysteria2://"),
            ConfigType::Custom => None,
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
