//! Supported HMAC hash algorithms.

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::{Result, TotpError};

/// Supported TOTP algorithms.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Key length, in bytes, secrets are padded to before signing.
    pub fn secret_length(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Compute the HMAC of `message` keyed with `key`.
    pub(crate) fn sign(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Sha1 => sign::<Hmac<Sha1>>(key, message),
            Self::Sha256 => sign::<Hmac<Sha256>>(key, message),
            Self::Sha512 => sign::<Hmac<Sha512>>(key, message),
        }
    }
}

fn sign<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|err| TotpError::invalid("secret", err.to_string()))?;
    mac.update(message);

    Ok(mac.finalize().into_bytes().to_vec())
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TotpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(TotpError::invalid(
                "algorithm",
                format!("unsupported hash algorithm `{s}`"),
            )),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = TotpError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.as_str().to_owned()
    }
}
