//! Lenient field extraction for JSON-ish text that a strict decoder rejects
//!
//! Some generators emit VMess payloads with trailing commas, unquoted values
//! or stray control characters. [`LenientJson`] scans the raw text for
//! `"field":` occurrences instead of building a document tree.

/// Field reader over raw JSON-shaped text
#[derive(Debug, Clone, Copy)]
pub struct LenientJson<'a> {
    text: &'a str,
}

impl<'a> LenientJson<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Value of `field`, or the empty string when it cannot be found.
    ///
    /// A quoted value runs to the next quote. A bare value runs to the next
    /// `,` or `}` and is trimmed of whitespace and stray quotes.
    pub fn field(&self, field: &str) -> &'a str {
        let key = format!("\"{}\":", field);
        let Some(idx) = self.text.find(&key) else {
            return "";
        };
        let rest = self.text[idx + key.len()..].trim_start();

        if let Some(quoted) = rest.strip_prefix('"') {
            return quoted.find('"').map(|end| &quoted[..end]).unwrap_or_default();
        }
        rest.find([',', '}'])
            .map(|end| rest[..end].trim().trim_matches('"'))
            .unwrap_or_default()
    }
}
