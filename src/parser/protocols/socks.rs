//! SOCKS protocol parser
//!
//! Format: socks://[user:pass@]host:port#remarks

use anyhow::Result;
use tracing::trace;

use crate::model::{ConfigType, Profile};
use crate::parser::ProtocolParser;
use crate::parser::link;

/// Parser for SOCKS (socks://) URIs
pub struct SocksParser;

impl ProtocolParser for SocksParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::Socks
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["socks://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        trace!("Parsing SOCKS URI");
        parse_with_credentials(uri, ConfigType::Socks, "SOCKS")
    }
}

/// Shared by the SOCKS and HTTP parsers: endpoint plus optional `user:pass`
pub(super) fn parse_with_credentials(
    uri: &str,
    config_type: ConfigType,
    protocol: &str,
) -> Result<Profile> {
    let url = link::parse_url(uri, protocol)?;

    let mut profile = Profile::new(config_type);
    profile.remarks = link::remarks(&url);
    profile.server = link::server(&url, protocol)?;
    profile.server_port = link::server_port(&url);
    profile.username = link::username(&url);
    if let Some(password) = link::password(&url) {
        profile.password = password;
    }

    Ok(profile)
}
