//! Time-based one-time passwords (RFC 6238) over HMAC-SHA1, SHA256 and
//! SHA512.
//!
//! # Generate and check a code.
//!
//! ```rust
//! use totp::{Secret, Totp};
//!
//! let secret = Secret::generate(Secret::DEFAULT_LENGTH).unwrap();
//! let totp = Totp::default();
//!
//! let code = totp.generate(&secret).unwrap();
//! assert!(totp.verify_code(&secret, &code).unwrap());
//! ```

#![forbid(unsafe_code)]

pub mod algorithm;
pub mod clock;
pub mod config;
pub mod error;
pub mod padding;
pub mod secret;
pub mod telemetry;
pub mod totp;

pub use algorithm::Algorithm;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, TotpError};
pub use secret::Secret;
pub use totp::{Totp, TotpConfig, compute_code};
