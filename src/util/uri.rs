//! URL escaping helpers
//!
//! Remarks travel through share links in many shapes: form-encoded, plain
//! percent-encoded, and sometimes double-encoded as JSON `\uXXXX` escapes.

use url::form_urlencoded;

/// Form-style escaping (space becomes `+`), used for remarks and userinfo
pub fn url_encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Strict percent-encoding (space becomes `%20`), used for userinfo so that
/// it decodes back unchanged
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Form-style unescaping followed by `\uXXXX` decoding
///
/// `+` turns into a space before `%XX` sequences are decoded, so an encoded
/// `%2B` still yields a literal plus. Undecodable input is kept as-is.
pub fn url_decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string());
    decode_unicode_escapes(&decoded)
}

/// Percent-decoding without `+` translation, used for userinfo
pub fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Replaces `\uXXXX` escape sequences with the character they name
pub fn decode_unicode_escapes(s: &str) -> String {
    if !s.contains("\\u") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("\\u") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos + 2..];
        let hex = candidate.get(..4).filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()));
        match hex.and_then(|h| u32::from_str_radix(h, 16).ok()) {
            Some(code) => {
                result.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                rest = &candidate[4..];
            }
            None => {
                result.push_str("\\u");
                rest = candidate;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Wraps an IPv6 literal in brackets so it can be followed by `:port`
pub fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Percent-encodes characters that break URI parsing (currently spaces)
pub fn fix_illegal_url(uri: &str) -> String {
    uri.replace(' ', "%20")
}

/// Rough DNS-name check: contains a dot and no colon (rules out IPv6)
pub fn is_domain_name(s: &str) -> bool {
    !s.is_empty() && !s.contains(':') && s.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode_keeps_spaces_distinct_from_plus() {
        assert_eq!(percent_encode("a b+c"), "a%20b%2Bc");
        assert_eq!(percent_decode(&percent_encode("p@ss:w rd+")), "p@ss:w rd+");
    }

    #[test]
    fn test_url_decode_percent_and_plus() {
        assert_eq!(url_decode("My%20Node"), "My Node");
        assert_eq!(url_decode("My+Node"), "My Node");
        assert_eq!(url_decode("a%2Bb"), "a+b");
    }

    #[test]
    fn test_url_decode_unicode_escape() {
        assert_eq!(url_decode("\\u9999\\u6e2f 01"), "香港 01");
        assert_eq!(url_decode("%5Cu65e5%5Cu672c"), "日本");
    }

    #[test]
    fn test_url_decode_keeps_malformed_escape() {
        assert_eq!(url_decode("\\uZZZZ"), "\\uZZZZ");
        assert_eq!(url_decode("tail\\u12"), "tail\\u12");
    }

    #[test]
    fn test_url_decode_emoji() {
        assert_eq!(url_decode("%F0%9F%87%BA%F0%9F%87%B8%20US"), "🇺🇸 US");
    }

    #[test]
    fn test_url_encode_roundtrip() {
        let remarks = "香港 01 + fast/edge";
        assert_eq!(url_decode(&url_encode(remarks)), remarks);
        assert_eq!(url_encode("a b"), "a+b");
    }

    #[test]
    fn test_percent_decode_keeps_plus() {
        assert_eq!(percent_decode("abc+def%3D"), "abc+def=");
    }

    #[test]
    fn test_bracket_ipv6() {
        assert_eq!(bracket_ipv6("2001:db8::1"), "[2001:db8::1]");
        assert_eq!(bracket_ipv6("[::1]"), "[::1]");
        assert_eq!(bracket_ipv6("example.com"), "example.com");
        assert_eq!(bracket_ipv6("1.2.3.4"), "1.2.3.4");
    }

    #[test]
    fn test_fix_illegal_url() {
        assert_eq!(fix_illegal_url("vless://a@b:1#My Node"), "vless://a@b:1#My%20Node");
    }

    #[test]
    fn test_is_domain_name() {
        assert!(is_domain_name("example.com"));
        assert!(is_domain_name("1.2.3.4"));
        assert!(!is_domain_name("localhost"));
        assert!(!is_domain_name("2001:db8::1"));
        assert!(!is_domain_name(""));
    }
}
