//! Canonical profile model
//!
//! Every supported share link is parsed into one [`Profile`]. Encoders and
//! generators only ever read profiles; they never mutate them.

pub mod config_type;
pub mod profile;
pub mod transport;

pub use config_type::ConfigType;
pub use profile::{
    DEFAULT_HOP_INTERVAL, DEFAULT_LOCAL_ADDRESS, DEFAULT_RESERVED, DEFAULT_WIREGUARD_MTU,
    NO_REMARKS, Profile,
};
pub use transport::{NetworkKind, SecurityKind};
