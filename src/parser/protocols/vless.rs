//! VLESS protocol parser
//!
//! Format: vless://uuid@host:port?params#remarks

use anyhow::Result;
use tracing::trace;

use crate::model::{ConfigType, Profile};
use crate::parser::ProtocolParser;
use crate::parser::link;
use crate::parser::query::{QueryParams, absorb_transport_and_tls};

// ============================================================================
// VLESS Parser
// ============================================================================

/// Parser for VLESS (vless://) URIs
pub struct VLessParser;

impl ProtocolParser for VLessParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::VLess
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["vless://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        trace!("Parsing VLESS URI");
        let url = link::parse_url(uri, "VLESS")?;
        let query = QueryParams::from_url(&url);

        let mut profile = Profile::new(ConfigType::VLess);
        profile.remarks = link::remarks(&url);
        profile.server = link::server(&url, "VLESS")?;
        profile.server_port = link::server_port(&url);
        profile.password = link::username(&url);

        absorb_transport_and_tls(&mut profile, &query);

        profile.method = match query.get("encryption") {
            "" => "none".to_string(),
            method => method.to_string(),
        };

        Ok(profile)
    }
}
