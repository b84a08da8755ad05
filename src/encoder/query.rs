//! Query-string and URI assembly shared by the link encoders

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::model::{NetworkKind, Profile, SecurityKind};
use crate::util::{bracket_ipv6, percent_encode, url_encode};

/// Query parameters keyed in sorted order, so links are reproducible
pub type QueryMap = BTreeMap<&'static str, String>;

/// Inserts `value` only when it is non-empty
pub fn insert_non_empty(query: &mut QueryMap, key: &'static str, value: &str) {
    if !value.is_empty() {
        query.insert(key, value.to_string());
    }
}

/// Builds the transport and TLS parameters shared by VLESS and Trojan links
pub fn build_query_params(profile: &Profile) -> QueryMap {
    let mut query = QueryMap::new();

    let security = match profile.security {
        SecurityKind::None => "none",
        other => other.as_str(),
    };
    query.insert("security", security.to_string());
    insert_non_empty(&mut query, "sni", &profile.sni);
    insert_non_empty(&mut query, "alpn", &profile.alpn);
    insert_non_empty(&mut query, "fp", &profile.fingerprint);
    insert_non_empty(&mut query, "flow", &profile.flow);
    insert_non_empty(&mut query, "pqv", &profile.mldsa65_verify);
    if profile.security == SecurityKind::Tls {
        let flag = if profile.insecure { "1" } else { "0" };
        query.insert("allowInsecure", flag.to_string());
    }

    // Reality
    insert_non_empty(&mut query, "pbk", &profile.public_key);
    insert_non_empty(&mut query, "sid", &profile.short_id);
    insert_non_empty(&mut query, "spx", &profile.spider_x);

    query.insert("type", profile.network.as_str().to_string());
    match profile.network {
        NetworkKind::Tcp => {
            insert_non_empty(&mut query, "headerType", &profile.header_type);
            insert_non_empty(&mut query, "host", &profile.host);
        }
        NetworkKind::Kcp => {
            insert_non_empty(&mut query, "headerType", &profile.header_type);
            insert_non_empty(&mut query, "seed", &profile.seed);
        }
        NetworkKind::Ws | NetworkKind::HttpUpgrade => {
            insert_non_empty(&mut query, "host", &profile.host);
            insert_non_empty(&mut query, "path", &profile.path);
        }
        NetworkKind::Http | NetworkKind::H2 => {
            query.insert("type", "http".to_string());
            insert_non_empty(&mut query, "host", &profile.host);
            insert_non_empty(&mut query, "path", &profile.path);
        }
        NetworkKind::Grpc => {
            insert_non_empty(&mut query, "mode", &profile.mode);
            insert_non_empty(&mut query, "authority", &profile.authority);
            insert_non_empty(&mut query, "serviceName", &profile.service_name);
        }
        NetworkKind::Xhttp => {
            insert_non_empty(&mut query, "host", &profile.host);
            insert_non_empty(&mut query, "path", &profile.path);
            insert_non_empty(&mut query, "mode", &profile.xhttp_mode);
            insert_non_empty(&mut query, "extra", &profile.xhttp_extra);
        }
        NetworkKind::Quic => {
            insert_non_empty(&mut query, "headerType", &profile.header_type);
            insert_non_empty(&mut query, "quicSecurity", &profile.quic_security);
            insert_non_empty(&mut query, "key", &profile.quic_key);
        }
    }

    query
}

/// Assembles `scheme userinfo@host:port?query#remarks`.
///
/// Empty userinfo drops the `@`, an empty query drops the `?`. IPv6 hosts
/// are bracketed.
pub fn build_uri(scheme: &str, userinfo: &str, profile: &Profile, query: &QueryMap) -> String {
    let mut uri = String::from(scheme);
    if !userinfo.is_empty() {
        uri.push_str(userinfo);
        uri.push('@');
    }
    uri.push_str(&bracket_ipv6(&profile.server));
    uri.push(':');
    uri.push_str(&profile.server_port);

    if !query.is_empty() {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter())
            .finish();
        uri.push('?');
        uri.push_str(&encoded);
    }

    uri.push('#');
    uri.push_str(&url_encode(&profile.remarks));
    uri
}

/// Percent-encoded `user:pass` pair; the password part is dropped when empty
/// and a lone password is written as `:pass`
pub fn credentials(username: &str, password: &str) -> String {
    if username.is_empty() {
        if password.is_empty() {
            return String::new();
        }
        return format!(":{}", percent_encode(password));
    }
    if password.is_empty() {
        percent_encode(username)
    } else {
        format!("{}:{}", percent_encode(username), percent_encode(password))
    }
}
