//! Config generator module
//!
//! Turns canonical profiles into client configs: a generic Xray outbound
//! descriptor for every kind, and a native client config for Hysteria2.

pub mod hysteria2;
pub mod xray;

// Re-exports
pub use hysteria2::{Hysteria2Config, generate_hysteria2_config};
pub use xray::{
    XrayConfig, XrayOutbound, generate_batch_config, generate_config, generate_outbound,
};

/// Local SOCKS/HTTP listener port used when the caller does not pick one
pub const DEFAULT_LOCAL_PORT: u16 = 1234;
