//! Per-protocol link encoders

use anyhow::{Context, Result};

use crate::model::Profile;
use crate::parser::VMessQrCode;
use crate::util::{encode_base64, encode_base64_url, percent_encode};

use super::query::{QueryMap, build_query_params, build_uri, credentials, insert_non_empty};

pub fn encode_vless(profile: &Profile) -> String {
    let mut query = build_query_params(profile);
    let encryption = if profile.method.is_empty() { "none" } else { &profile.method };
    query.insert("encryption", encryption.to_string());
    build_uri("vless://", &percent_encode(&profile.password), profile, &query)
}

/// `vmess://` followed by the base64 of the JSON payload
pub fn encode_vmess(profile: &Profile) -> Result<String> {
    let payload = serde_json::to_string(&VMessQrCode::from_profile(profile))
        .context("Failed to serialize VMess payload")?;
    Ok(format!("vmess://{}", encode_base64(&payload)))
}

/// SIP002 with URL-safe base64 userinfo. An http header on tcp is written
/// back as an `obfs-local` plugin.
pub fn encode_shadowsocks(profile: &Profile) -> String {
    let userinfo = encode_base64_url(&format!("{}:{}", profile.method, profile.password));
    let mut query = QueryMap::new();
    if profile.header_type == "http" {
        let mut plugin = String::from("obfs-local;obfs=http");
        if !profile.host.is_empty() {
            plugin.push_str(";obfs-host=");
            plugin.push_str(&profile.host);
        }
        if !profile.path.is_empty() {
            plugin.push_str(";path=");
            plugin.push_str(&profile.path);
        }
        query.insert("plugin", plugin);
    }
    build_uri("ss://", &userinfo, profile, &query)
}

pub fn encode_trojan(profile: &Profile) -> String {
    build_uri(
        "trojan://",
        &percent_encode(&profile.password),
        profile,
        &build_query_params(profile),
    )
}

pub fn encode_socks(profile: &Profile) -> String {
    let userinfo = credentials(&profile.username, &profile.password);
    build_uri("socks://", &userinfo, profile, &QueryMap::new())
}

pub fn encode_http(profile: &Profile) -> String {
    let userinfo = credentials(&profile.username, &profile.password);
    build_uri("http://", &userinfo, profile, &QueryMap::new())
}

/// Private key as userinfo; peer key and interface parameters in the query
pub fn encode_wireguard(profile: &Profile) -> String {
    let strip = |s: &str| s.replace(' ', "");

    let mut query = QueryMap::new();
    query.insert("publickey", profile.peer_public_key.clone());
    insert_non_empty(&mut query, "reserved", &strip(&profile.reserved));
    insert_non_empty(&mut query, "address", &strip(&profile.local_address));
    if profile.mtu > 0 {
        query.insert("mtu", profile.mtu.to_string());
    }
    insert_non_empty(&mut query, "presharedkey", &strip(&profile.pre_shared_key));

    build_uri("wireguard://", &percent_encode(&profile.password), profile, &query)
}

pub fn encode_hysteria2(profile: &Profile) -> String {
    let mut query = QueryMap::new();
    insert_non_empty(&mut query, "sni", &profile.sni);
    insert_non_empty(&mut query, "alpn", &profile.alpn);
    insert_non_empty(&mut query, "fp", &profile.fingerprint);
    let insecure = if profile.insecure { "1" } else { "0" };
    query.insert("insecure", insecure.to_string());

    if !profile.obfs_password.is_empty() {
        query.insert("obfs", "salamander".to_string());
        query.insert("obfs-password", profile.obfs_password.clone());
    }
    insert_non_empty(&mut query, "mport", &profile.port_hopping);
    insert_non_empty(&mut query, "mportHopInt", &profile.port_hopping_interval);
    insert_non_empty(&mut query, "pinSHA256", &profile.pin_sha256);
    insert_non_empty(&mut query, "up", &profile.bandwidth_up);
    insert_non_empty(&mut query, "down", &profile.bandwidth_down);

    build_uri("hysteria2://", &percent_encode(&profile.password), profile, &query)
}
