//! Query-string absorption shared by the VLESS, Trojan and VMess parsers

use std::collections::HashMap;

use url::Url;

use crate::model::{NetworkKind, Profile, SecurityKind};

/// Parameter names consulted for the insecure flag, highest priority first
pub const INSECURE_KEYS: [&str; 3] = ["insecure", "allowInsecure", "allow_insecure"];

/// Decoded query parameters; only the first value of a repeated key is kept
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    pub fn from_url(url: &Url) -> Self {
        let mut values = HashMap::new();
        for (key, value) in url.query_pairs() {
            values
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { values }
    }

    /// Value of `key`, or the empty string when absent
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or_default()
    }

    /// First non-empty value among `keys`, in order
    pub fn first_present(&self, keys: &[&str]) -> &str {
        keys.iter()
            .map(|key| self.get(key))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolves the insecure flag from `keys`; only `1` means true
    pub fn insecure(&self, keys: &[&str]) -> bool {
        self.first_present(keys) == "1"
    }
}

/// Copies the transport, TLS and Reality parameters into `profile`
pub fn absorb_transport_and_tls(profile: &mut Profile, query: &QueryParams) {
    // Transport
    profile.network = NetworkKind::parse(query.get("type"));
    profile.header_type = query.get("headerType").to_string();
    profile.host = query.get("host").to_string();
    profile.path = query.get("path").to_string();
    profile.seed = query.get("seed").to_string();
    profile.quic_security = query.get("quicSecurity").to_string();
    profile.quic_key = query.get("key").to_string();
    profile.mode = query.get("mode").to_string();
    profile.xhttp_mode = query.get("mode").to_string();
    profile.service_name = query.get("serviceName").to_string();
    profile.authority = query.get("authority").to_string();
    profile.xhttp_extra = query.get("extra").to_string();

    // TLS
    profile.security = SecurityKind::parse(query.get("security"));
    profile.sni = query.get("sni").to_string();
    profile.alpn = query.get("alpn").to_string();
    profile.fingerprint = query.get("fp").to_string();
    profile.flow = query.get("flow").to_string();
    profile.mldsa65_verify = query.get("pqv").to_string();
    profile.insecure = query.insecure(&INSECURE_KEYS);

    // Reality
    profile.public_key = query.get("pbk").to_string();
    profile.short_id = query.get("sid").to_string();
    profile.spider_x = query.get("spx").to_string();
}
