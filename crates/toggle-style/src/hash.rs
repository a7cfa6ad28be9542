//! Deterministic short identifiers for generated custom properties.
//!
//! Identifiers are derived from the JSON serialization of a value, so equal
//! inputs hash identically across runs and processes. The hash is not
//! cryptographic: it only needs to keep generated variable names apart.

use serde::Serialize;

use crate::Result;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hash any serializable value into a short identifier usable inside a CSS
/// custom property name.
///
/// The value is serialized as compact JSON and its UTF-16 code units are
/// folded with `hash = hash * 31 + unit`, keeping the low 31 bits after every
/// step. The result is base-36 encoded and prefixed with `a` if it would
/// otherwise start with a digit.
pub fn create_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(hash_str(&json))
}

/// Hash a string's UTF-16 code units.
///
/// [`create_hash`] applies this to the JSON serialization of its input.
pub fn hash_str(text: &str) -> String {
    let mut hash: u32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(u32::from(unit))
            & 0x7fff_ffff;
    }

    let encoded = to_base36(hash);
    if encoded.starts_with(|c: char| c.is_ascii_digit()) {
        format!("a{encoded}")
    } else {
        encoded
    }
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    // Only ASCII digits were pushed.
    digits.into_iter().map(char::from).collect()
}
