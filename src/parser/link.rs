//! Helpers shared by every URI-shaped parser
//!
//! Share links are handed to [`url::Url`] after minimal repair. These helpers
//! pull out the pieces a [`Profile`](crate::model::Profile) needs in the form
//! the model stores them: bare hosts, textual ports, decoded credentials.

use std::ops::Deref;

use anyhow::{Context, Result, bail};
use url::{Host, Url};

use crate::model::NO_REMARKS;
use crate::util::uri::decode_unicode_escapes;
use crate::util::{fix_illegal_url, percent_decode, url_decode};

/// A parsed share link
///
/// `url::Url` refuses ports above 65535. Such a port is cut out before
/// parsing and kept here as raw text, so the rest of the link still parses.
#[derive(Debug, Clone)]
pub struct Link {
    url: Url,
    raw_port: Option<String>,
}

impl Deref for Link {
    type Target = Url;

    fn deref(&self) -> &Url {
        &self.url
    }
}

/// Parses a share link after percent-encoding spaces
pub fn parse_url(uri: &str, protocol: &str) -> Result<Link> {
    let fixed = fix_illegal_url(uri.trim());
    let err = match Url::parse(&fixed) {
        Ok(url) => return Ok(Link { url, raw_port: None }),
        Err(err) => err,
    };

    if let Some((stripped, port)) = strip_out_of_range_port(&fixed)
        && let Ok(url) = Url::parse(&stripped)
    {
        return Ok(Link {
            url,
            raw_port: Some(port),
        });
    }
    Err(err).with_context(|| format!("Failed to parse {} URI", protocol))
}

/// Removes an all-digit port that does not fit in `u16`, returning the link
/// without it and the port text
fn strip_out_of_range_port(uri: &str) -> Option<(String, String)> {
    let authority_start = uri.find("://")? + 3;
    let rest = &uri[authority_start..];
    let authority_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_len];

    let host_start = authority.rfind('@').map_or(0, |at| at + 1);
    let host_port = &authority[host_start..];
    let colon = match host_port.rfind(']') {
        Some(bracket) => bracket + host_port[bracket..].find(':')?,
        None => host_port.rfind(':')?,
    };
    let port = &host_port[colon + 1..];
    if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) || port.parse::<u16>().is_ok() {
        return None;
    }

    let cut_start = authority_start + host_start + colon;
    let cut_end = authority_start + authority_len;
    let stripped = format!("{}{}", &uri[..cut_start], &uri[cut_end..]);
    Some((stripped, port.to_string()))
}

/// Decodes a raw remarks value; an empty result becomes `none`
pub fn decode_remarks(raw: &str) -> String {
    let remarks = url_decode(raw);
    if remarks.is_empty() {
        NO_REMARKS.to_string()
    } else {
        remarks
    }
}

/// Decodes remarks carried inside a JSON payload, where `+` is literal
pub fn decode_plain_remarks(raw: &str) -> String {
    let remarks = decode_unicode_escapes(&percent_decode(raw));
    if remarks.is_empty() {
        NO_REMARKS.to_string()
    } else {
        remarks
    }
}

/// Remarks taken from the URL fragment
pub fn remarks(url: &Url) -> String {
    decode_remarks(url.fragment().unwrap_or_default())
}

/// Host without IPv6 brackets
pub fn server(url: &Url, protocol: &str) -> Result<String> {
    let server = match url.host() {
        // opaque hosts of non-special schemes keep non-ASCII percent-encoded
        Some(Host::Domain(domain)) => percent_decode(domain),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    };
    if server.is_empty() {
        bail!("{} URI missing host", protocol);
    }
    Ok(server)
}

/// Port as text; an out-of-range port is kept verbatim, a missing one falls
/// back to the scheme's well-known port, else empty
pub fn server_port(link: &Link) -> String {
    if let Some(port) = &link.raw_port {
        return port.clone();
    }
    link.port_or_known_default()
        .map(|port| port.to_string())
        .unwrap_or_default()
}

/// Percent-decoded userinfo name
pub fn username(url: &Url) -> String {
    percent_decode(url.username())
}

/// Percent-decoded userinfo password, if the link carries one
pub fn password(url: &Url) -> Option<String> {
    url.password().map(percent_decode)
}
