//! Trojan protocol parser
//!
//! Format: trojan://password@host:port?params#remarks

use anyhow::Result;
use tracing::trace;

use crate::model::{ConfigType, Profile, SecurityKind};
use crate::parser::ProtocolParser;
use crate::parser::link;
use crate::parser::query::{QueryParams, absorb_transport_and_tls};

/// Parser for Trojan (trojan://) URIs
///
/// Security is `tls` unless the link names one explicitly.
pub struct TrojanParser;

impl ProtocolParser for TrojanParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::Trojan
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["trojan://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        trace!("Parsing Trojan URI");
        let url = link::parse_url(uri, "Trojan")?;
        let query = QueryParams::from_url(&url);

        let mut profile = Profile::new(ConfigType::Trojan);
        profile.remarks = link::remarks(&url);
        profile.server = link::server(&url, "Trojan")?;
        profile.server_port = link::server_port(&url);
        profile.password = link::username(&url);

        absorb_transport_and_tls(&mut profile, &query);
        profile.security = match query.get("security") {
            "" => SecurityKind::Tls,
            raw => SecurityKind::parse(raw),
        };

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NetworkKind;

    #[test]
    fn test_trojan_defaults_to_tls() {
        let profile = TrojanParser.parse("trojan://secret@example.com:443#Node").unwrap();
        assert_eq!(profile.password, "secret");
        assert_eq!(profile.security, SecurityKind::Tls);
        assert_eq!(profile.network, NetworkKind::Tcp);
        assert_eq!(profile.remarks, "Node");
    }

    #[test]
    fn test_trojan_with_params_still_tls() {
        let profile = TrojanParser
            .parse("trojan://secret@example.com:443?type=ws&path=%2Ftr&sni=cdn.example.com")
            .unwrap();
        assert_eq!(profile.security, SecurityKind::Tls);
        assert_eq!(profile.network, NetworkKind::Ws);
        assert_eq!(profile.path, "/tr");
        assert_eq!(profile.sni, "cdn.example.com");
    }

    #[test]
    fn test_trojan_explicit_security() {
        let profile = TrojanParser
            .parse("trojan://secret@example.com:443?security=reality&pbk=KEY")
            .unwrap();
        assert_eq!(profile.security, SecurityKind::Reality);

        let profile = TrojanParser
            .parse("trojan://secret@example.com:80?security=none")
            .unwrap();
        assert_eq!(profile.security, SecurityKind::None);
    }

    #[test]
    fn test_trojan_insecure() {
        let profile = TrojanParser
            .parse("trojan://secret@example.com:443?allowInsecure=1")
            .unwrap();
        assert!(profile.insecure);
    }
}
