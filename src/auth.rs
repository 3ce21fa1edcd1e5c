//! Basic-auth header encoding.
//!
//! Credentials are encoded one byte per character (ISO-8859-1), which is what
//! browsers send for `Authorization: Basic`. Characters above U+00FF cannot
//! be represented and are rejected before any request is built.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{SaikuError, Result};

/// Builds the `Authorization` header value for `user:password`.
pub fn basic_auth_header(user: &str, password: &str) -> Result<String> {
    let credentials = format!("{user}:{password}");
    let bytes = latin1_bytes(&credentials)?;
    Ok(format!("Basic {}", STANDARD.encode(bytes)))
}

/// Converts a string to single-byte characters, failing on anything wider.
fn latin1_bytes(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                SaikuError::encoding(format!(
                    "character {c:?} in credentials is outside the single-byte range"
                ))
            })
        })
        .collect()
}
