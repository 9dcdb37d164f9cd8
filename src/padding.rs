//! Secret length normalization.
//!
//! Short secrets are repeated until they reach the key length expected by
//! the HMAC hash. This is not a key derivation function.

use crate::error::{Result, TotpError};

/// Repeat `raw` cyclically until exactly `required_length` bytes are produced.
///
/// # Errors
///
/// Returns `Err` if `raw` is empty or `required_length` is zero.
pub fn pad(raw: &[u8], required_length: usize) -> Result<Vec<u8>> {
    if raw.is_empty() {
        return Err(TotpError::invalid("secret", "secret must not be empty"));
    }

    if required_length == 0 {
        return Err(TotpError::invalid(
            "required_length",
            "length must be greater than 0",
        ));
    }

    Ok(raw.iter().copied().cycle().take(required_length).collect())
}
