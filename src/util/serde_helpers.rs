//! Utility functions for serde serialization.
//!
//! Helpers used with `skip_serializing_if` so generated configs only carry
//! the keys that mean something.

/// Returns `true` if the boolean value is `false`.
///
/// Used with `#[serde(skip_serializing_if = "is_false")]` to omit false values.
#[inline]
pub fn is_false(b: &bool) -> bool {
    !*b
}

/// Returns `true` if the u32 value is zero.
#[inline]
pub fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
