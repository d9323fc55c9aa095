//! Space separated hex byte notation
//!
//! The console reads bytes as uppercase two digit tokens (`pub 1251 2 A1 A2`)
//! and prints them lowercase (`1251 msg= a1 a2`). Decoding accepts either case.

use crate::error::{ProtocolError, Result};
use std::fmt::Write;

/// Append every byte as ` XX` (leading space, two uppercase digits)
pub fn push_hex_tokens(out: &mut String, bytes: &[u8]) {
    out.reserve(bytes.len() * 3);
    for byte in bytes {
        // Writing into a String cannot fail
        let _ = write!(out, " {:02X}", byte);
    }
}

/// Decode whitespace separated hex byte tokens
///
/// An empty or blank value decodes to an empty buffer.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidHex`] for any token that is not one or two
/// hex digits.
pub fn decode_hex_tokens(value: &str) -> Result<Vec<u8>> {
    value
        .split_whitespace()
        .map(|token| {
            if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(ProtocolError::InvalidHex(token.to_string()));
            }
            u8::from_str_radix(token, 16).map_err(|_| ProtocolError::InvalidHex(token.to_string()))
        })
        .collect()
}
