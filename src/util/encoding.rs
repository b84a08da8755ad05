//! Base64 decoding utilities
//!
//! Share links and subscriptions come with every base64 flavour in the wild:
//! standard or URL-safe alphabet, with or without padding, sometimes wrapped
//! across several lines. The decoder here accepts all of them.

use anyhow::{Result, bail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::trace;

// ============================================================================
// Base64 Decoding
// ============================================================================

/// Decodes Base64 content, trying multiple variants
///
/// Attempts, in order:
/// 1. Standard Base64 (padding normalised)
/// 2. URL-safe Base64 (padding normalised)
/// 3. Standard Base64 without padding
/// 4. URL-safe Base64 without padding
///
/// Whitespace in the input is removed before decoding.
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    trace!(
        "Attempting Base64 decode, cleaned length: {} bytes",
        cleaned.len()
    );

    let padded = add_base64_padding(&cleaned);
    if let Ok(decoded) = STANDARD.decode(&padded) {
        trace!("Decoded using standard Base64");
        return Ok(decoded);
    }
    if let Ok(decoded) = URL_SAFE.decode(&padded) {
        trace!("Decoded using URL-safe Base64");
        return Ok(decoded);
    }

    let unpadded = cleaned.trim_end_matches('=');
    if let Ok(decoded) = STANDARD_NO_PAD.decode(unpadded) {
        trace!("Decoded using standard Base64 without padding");
        return Ok(decoded);
    }
    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(unpadded) {
        trace!("Decoded using URL-safe Base64 without padding");
        return Ok(decoded);
    }

    bail!("Failed to decode Base64 content")
}

/// Decodes Base64 content into text, replacing invalid UTF-8 sequences
pub fn decode_base64_string(content: &str) -> Result<String> {
    decode_base64(content).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Adds `=` padding until the length is a multiple of 4
///
/// Existing padding is stripped first so over-padded input is normalised too.
pub fn add_base64_padding(s: &str) -> String {
    let mut result = s.trim_end_matches('=').to_string();
    while !result.len().is_multiple_of(4) {
        result.push('=');
    }
    result
}

// ============================================================================
// Base64 Encoding
// ============================================================================

/// Standard alphabet with padding (VMess share links)
pub fn encode_base64(content: &str) -> String {
    STANDARD.encode(content)
}

/// URL-safe alphabet without padding (Shadowsocks SIP002 userinfo)
pub fn encode_base64_url(content: &str) -> String {
    URL_SAFE_NO_PAD.encode(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "aes-256-gcm:pa+ss/word?";

    #[test]
    fn test_decode_base64_standard() {
        let decoded = decode_base64("aGVsbG8gd29ybGQ=").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_without_padding() {
        let decoded = decode_base64("aGVsbG8gd29ybGQ").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_with_linebreaks() {
        let decoded = decode_base64("aGVs\nbG8g\r\nd29y\tbGQ=").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_all_variants_agree() {
        let variants = [
            STANDARD.encode(PLAIN),
            URL_SAFE.encode(PLAIN),
            STANDARD_NO_PAD.encode(PLAIN),
            URL_SAFE_NO_PAD.encode(PLAIN),
        ];
        for encoded in variants {
            let decoded = decode_base64(&encoded).unwrap();
            assert_eq!(decoded, PLAIN.as_bytes(), "variant {}", encoded);
        }
    }

    #[test]
    fn test_decode_base64_empty() {
        assert!(decode_base64("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_base64_invalid() {
        assert!(decode_base64("not valid base64!!!").is_err());
        assert!(decode_base64("uuid@example.com:443").is_err());
    }

    #[test]
    fn test_decode_base64_string_lossy() {
        let encoded = STANDARD.encode([0x68, 0x69, 0xff]);
        assert_eq!(decode_base64_string(&encoded).unwrap(), "hi\u{fffd}");
    }

    #[test]
    fn test_add_base64_padding() {
        assert_eq!(add_base64_padding("abcd"), "abcd");
        assert_eq!(add_base64_padding("abc"), "abc=");
        assert_eq!(add_base64_padding("ab"), "ab==");
        assert_eq!(add_base64_padding("ab===="), "ab==");
        assert_eq!(add_base64_padding(""), "");
    }

    #[test]
    fn test_encode_base64_url_is_unpadded() {
        let encoded = encode_base64_url("aes-128-gcm:test");
        assert!(!encoded.contains('='));
        assert_eq!(decode_base64(&encoded).unwrap(), b"aes-128-gcm:test");
    }

    #[test]
    fn test_encode_base64_standard_is_padded() {
        assert_eq!(encode_base64("hello world"), "aGVsbG8gd29ybGQ=");
    }
}
