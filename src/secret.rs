//! Shared TOTP secret.

use std::fmt;
use std::str::FromStr;

use base32::Alphabet;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{Result, TotpError};

const BASE32_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
/// Number of `=` characters allowed to close a padded 8 characters block.
const VALID_PADDING: [usize; 5] = [0, 1, 3, 4, 6];

/// TOTP secret value object.
///
/// Holds raw bytes, wiped from memory on drop. Its text form is uppercase
/// Base32 (RFC 4648) with `=` padding.
#[derive(Clone)]
pub struct Secret {
    bytes: Zeroizing<Vec<u8>>,
}

impl Secret {
    /// Default number of random bytes of a generated secret.
    pub const DEFAULT_LENGTH: usize = 16;

    /// Generate a new random secret from the OS entropy pool.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `byte_length` is zero or if the OS random source
    /// fails.
    pub fn generate(byte_length: usize) -> Result<Self> {
        Self::generate_with(&mut OsRng, byte_length)
    }

    /// Generate a new random secret with a provided cryptographic RNG.
    pub fn generate_with<R>(rng: &mut R, byte_length: usize) -> Result<Self>
    where
        R: RngCore + CryptoRng,
    {
        if byte_length == 0 {
            return Err(TotpError::invalid(
                "byte_length",
                "secret must contain at least one byte",
            ));
        }

        let mut bytes = Zeroizing::new(vec![0u8; byte_length]);
        rng.try_fill_bytes(&mut bytes).map_err(|err| {
            tracing::warn!(error = %err, "random source failed");
            TotpError::Entropy(err)
        })?;

        Ok(Self { bytes })
    }

    /// Import a Base32-encoded secret, regardless of case.
    ///
    /// # Errors
    ///
    /// Returns `Err` if text is empty, contains characters outside the
    /// Base32 alphabet or is badly padded.
    pub fn import(text: &str) -> Result<Self> {
        let text = Zeroizing::new(text.to_ascii_uppercase());
        let unpadded = text.trim_end_matches('=');

        if !Self::is_valid_base32(&text, unpadded) {
            return Err(TotpError::InvalidSecret);
        }

        // Unused trailing bits are dropped: `MFRGH===` imports as `MFRGG===`.
        let bytes = base32::decode(Alphabet::Rfc4648 { padding: false }, unpadded)
            .ok_or(TotpError::InvalidSecret)?;

        if bytes.is_empty() {
            return Err(TotpError::InvalidSecret);
        }

        Ok(Self {
            bytes: Zeroizing::new(bytes),
        })
    }

    #[inline]
    fn is_valid_base32(text: &str, unpadded: &str) -> bool {
        if unpadded.is_empty()
            || !unpadded.bytes().all(|b| BASE32_CHARS.contains(&b))
        {
            return false;
        }

        // Last block carries either 0, 2, 4, 5 or 7 characters.
        let padding = text.len() - unpadded.len();
        let missing = (8 - unpadded.len() % 8) % 8;
        if !VALID_PADDING.contains(&missing) {
            return false;
        }

        padding == 0 || padding == missing
    }

    /// Uppercase Base32 representation, padded to a multiple of 8
    /// characters.
    pub fn to_text(&self) -> String {
        base32::encode(Alphabet::Rfc4648 { padding: true }, &self.bytes)
    }

    /// Raw secret bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq::constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for Secret {}

impl From<&[u8]> for Secret {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes.to_vec()),
        }
    }
}

impl FromStr for Secret {
    type Err = TotpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::import(s)
    }
}

impl TryFrom<&str> for Secret {
    type Error = TotpError;

    fn try_from(value: &str) -> Result<Self> {
        Self::import(value)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
