//! Text and encoding helpers shared by the parsers, encoders and generators.

pub mod encoding;
pub mod serde_helpers;
pub mod uri;

pub use encoding::{decode_base64, decode_base64_string, encode_base64, encode_base64_url};
pub use uri::{bracket_ipv6, fix_illegal_url, is_domain_name, percent_decode, percent_encode, url_decode, url_encode};
