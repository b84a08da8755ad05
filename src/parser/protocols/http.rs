//! HTTP proxy parser
//!
//! Format: http://[user:pass@]host:port#remarks

use anyhow::Result;
use tracing::trace;

use crate::model::{ConfigType, Profile};
use crate::parser::ProtocolParser;

use super::socks::parse_with_credentials;

/// Parser for HTTP proxy (http://) URIs
pub struct HttpParser;

impl ProtocolParser for HttpParser {
    fn config_type(&self) -> ConfigType {
        ConfigType::Http
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["http://"]
    }

    fn parse(&self, uri: &str) -> Result<Profile> {
        trace!("Parsing HTTP proxy URI");
        parse_with_credentials(uri, ConfigType::Http, "HTTP")
    }
}
