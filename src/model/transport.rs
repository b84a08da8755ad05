//! Transport and security kinds
//!
//! Both are closed sets. Raw link values are normalised on the way in, so the
//! rest of the crate can match exhaustively.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Network Kind
// ============================================================================

/// Transport carrying the proxy protocol
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum NetworkKind {
    #[default]
    Tcp,
    Kcp,
    Ws,
    Http,
    H2,
    Grpc,
    Quic,
    HttpUpgrade,
    Xhttp,
}

impl NetworkKind {
    /// Normalises a raw network value through the alias table.
    ///
    /// Unknown or empty values fall back to `tcp`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "kcp" => NetworkKind::Kcp,
            "ws" | "websocket" => NetworkKind::Ws,
            "http" => NetworkKind::Http,
            "h2" | "http2" => NetworkKind::H2,
            "grpc" | "gun" => NetworkKind::Grpc,
            "quic" => NetworkKind::Quic,
            "httpupgrade" => NetworkKind::HttpUpgrade,
            "xhttp" | "splithttp" => NetworkKind::Xhttp,
            _ => NetworkKind::Tcp,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkKind::Tcp => "tcp",
            NetworkKind::Kcp => "kcp",
            NetworkKind::Ws => "ws",
            NetworkKind::Http => "http",
            NetworkKind::H2 => "h2",
            NetworkKind::Grpc => "grpc",
            NetworkKind::Quic => "quic",
            NetworkKind::HttpUpgrade => "httpupgrade",
            NetworkKind::Xhttp => "xhttp",
        }
    }
}

impl From<String> for NetworkKind {
    fn from(raw: String) -> Self {
        NetworkKind::parse(&raw)
    }
}

impl From<NetworkKind> for String {
    fn from(kind: NetworkKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Security Kind
// ============================================================================

/// Transport security; anything other than TLS or Reality counts as none
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum SecurityKind {
    #[default]
    None,
    Tls,
    Reality,
}

impl SecurityKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "tls" => SecurityKind::Tls,
            "reality" => SecurityKind::Reality,
            _ => SecurityKind::None,
        }
    }

    /// Empty string for [`SecurityKind::None`]
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityKind::None => "",
            SecurityKind::Tls => "tls",
            SecurityKind::Reality => "reality",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == SecurityKind::None
    }
}

impl From<String> for SecurityKind {
    fn from(raw: String) -> Self {
        SecurityKind::parse(&raw)
    }
}

impl From<SecurityKind> for String {
    fn from(kind: SecurityKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_aliases() {
        assert_eq!(NetworkKind::parse("websocket"), NetworkKind::Ws);
        assert_eq!(NetworkKind::parse("http2"), NetworkKind::H2);
        assert_eq!(NetworkKind::parse("gun"), NetworkKind::Grpc);
        assert_eq!(NetworkKind::parse("splithttp"), NetworkKind::Xhttp);
        assert_eq!(NetworkKind::parse("http"), NetworkKind::Http);
    }

    #[test]
    fn test_network_unknown_falls_back_to_tcp() {
        assert_eq!(NetworkKind::parse(""), NetworkKind::Tcp);
        assert_eq!(NetworkKind::parse("carrier-pigeon"), NetworkKind::Tcp);
        assert_eq!(NetworkKind::default(), NetworkKind::Tcp);
    }

    #[test]
    fn test_network_canonical_names_roundtrip() {
        let all = [
            NetworkKind::Tcp,
            NetworkKind::Kcp,
            NetworkKind::Ws,
            NetworkKind::Http,
            NetworkKind::H2,
            NetworkKind::Grpc,
            NetworkKind::Quic,
            NetworkKind::HttpUpgrade,
            NetworkKind::Xhttp,
        ];
        for kind in all {
            assert_eq!(NetworkKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_network_serde_normalises() {
        let kind: NetworkKind = serde_json::from_str(r#""websocket""#).unwrap();
        assert_eq!(kind, NetworkKind::Ws);
        assert_eq!(serde_json::to_string(&NetworkKind::HttpUpgrade).unwrap(), r#""httpupgrade""#);
    }

    #[test]
    fn test_security_restricted() {
        assert_eq!(SecurityKind::parse("tls"), SecurityKind::Tls);
        assert_eq!(SecurityKind::parse("reality"), SecurityKind::Reality);
        assert_eq!(SecurityKind::parse("xtls"), SecurityKind::None);
        assert_eq!(SecurityKind::parse("none"), SecurityKind::None);
        assert_eq!(SecurityKind::None.as_str(), "");
    }
}
