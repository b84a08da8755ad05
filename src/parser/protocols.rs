//! Protocol parsers module
//!
//! One parser per protocol kind. Each implements
//! [`ProtocolParser`](crate::parser::ProtocolParser) and turns a single share
//! link into a [`Profile`](crate::model::Profile).

mod http;
mod hysteria2;
mod shadowsocks;
mod socks;
mod trojan;
mod vless;
mod vmess;
mod wireguard;

pub use http::HttpParser;
pub use hysteria2::Hysteria2Parser;
pub use shadowsocks::ShadowsocksParser;
pub use socks::SocksParser;
pub use trojan::TrojanParser;
pub use vless::VLessParser;
pub use vmess::{VMessParser, VMessQrCode};
pub use wireguard::{WireGuardParser, is_wireguard_conf, parse_wireguard_conf};
