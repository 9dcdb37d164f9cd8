//! TOTP code generation and drift-tolerant verification (RFC 6238).

use crate::algorithm::Algorithm;
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TotpError};
use crate::padding::pad;
use crate::secret::Secret;

/// Represents a TOTP (Time-based One-Time Password) configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpConfig {
    /// Time step in seconds (usually 30).
    time_step: u64,
    /// Number of digits in the code (usually 6).
    digits: u32,
    algorithm: Algorithm,
}

impl TotpConfig {
    pub const DEFAULT_DIGITS: u32 = 6;
    /// Default TOTP configuration as per RFC 6238.
    pub const DEFAULT_TIME_STEP: u64 = 30;

    /// Create a new TOTP configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `time_step` or `digits` is zero.
    pub fn new(
        time_step: u64,
        digits: u32,
        algorithm: Algorithm,
    ) -> Result<Self> {
        if time_step == 0 {
            return Err(TotpError::invalid(
                "time_step",
                "time step must be greater than 0",
            ));
        }

        validate_digits(digits)?;

        Ok(Self {
            time_step,
            digits,
            algorithm,
        })
    }

    /// Create default TOTP configuration (30s, 6 digits, SHA1).
    pub fn default_config() -> Self {
        Self {
            time_step: Self::DEFAULT_TIME_STEP,
            digits: Self::DEFAULT_DIGITS,
            algorithm: Algorithm::Sha1,
        }
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn validate_digits(digits: u32) -> Result<()> {
    if digits == 0 {
        return Err(TotpError::invalid("digits", "digits must be greater than 0"));
    }

    Ok(())
}

/// Compute the code of `secret` for the time step `step_count`.
///
/// The secret is padded to the key length of `algorithm`, signed over the
/// big-endian counter, then dynamically truncated (RFC 4226 section 5.3).
pub fn compute_code(
    secret: &Secret,
    step_count: u64,
    digits: u32,
    algorithm: Algorithm,
) -> Result<String> {
    validate_digits(digits)?;

    let key = zeroize::Zeroizing::new(pad(
        secret.as_bytes(),
        algorithm.secret_length(),
    )?);
    let digest = algorithm.sign(&key, &step_count.to_be_bytes())?;

    // Dynamic truncation.
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary_code = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);

    // Past 19 digits the modulus overflows but is larger than any 31 bits
    // value anyway.
    let code_int = match 10u64.checked_pow(digits) {
        Some(modulus) => u64::from(binary_code) % modulus,
        None => u64::from(binary_code),
    };

    Ok(format!("{:0>width$}", code_int, width = digits as usize))
}

/// Accepted drift, in time steps, on each side of the current step.
pub const DEFAULT_WINDOW: u32 = 4;

/// Offsets to test, closest first. On equal distance the past step wins.
fn drift_offsets(window: u32) -> impl Iterator<Item = i64> {
    std::iter::once(0)
        .chain((1..=i64::from(window)).flat_map(|tick| [-tick, tick]))
}

/// TOTP engine bound to a configuration and a clock.
#[derive(Debug, Clone)]
pub struct Totp<C = SystemClock> {
    config: TotpConfig,
    window: u32,
    clock: C,
}

impl Totp<SystemClock> {
    /// Create a new [`Totp`] reading the system clock.
    pub fn new(config: TotpConfig) -> Self {
        Self {
            config,
            window: DEFAULT_WINDOW,
            clock: SystemClock::new(),
        }
    }
}

impl Default for Totp<SystemClock> {
    fn default() -> Self {
        Self::new(TotpConfig::default())
    }
}

impl<C: Clock> Totp<C> {
    /// Replace the time source.
    pub fn with_clock<K: Clock>(self, clock: K) -> Totp<K> {
        Totp {
            config: self.config,
            window: self.window,
            clock,
        }
    }

    /// Update the number of steps tolerated on each side of now.
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn config(&self) -> &TotpConfig {
        &self.config
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    /// Time step containing the current time.
    pub fn current_step(&self) -> u64 {
        self.clock.now() / self.config.time_step
    }

    /// Seconds before the current code expires.
    pub fn remaining(&self) -> u64 {
        self.config.time_step - self.clock.now() % self.config.time_step
    }

    /// Compute a code of `digits` digits.
    ///
    /// Without `step_count`, the current time step is used.
    pub fn compute_code(
        &self,
        secret: &Secret,
        step_count: Option<u64>,
        digits: u32,
    ) -> Result<String> {
        let step = step_count.unwrap_or_else(|| self.current_step());
        tracing::trace!(
            step,
            digits,
            algorithm = %self.config.algorithm,
            "computing totp code"
        );

        compute_code(secret, step, digits, self.config.algorithm)
    }

    /// Generate the code for the current time.
    pub fn generate(&self, secret: &Secret) -> Result<String> {
        self.compute_code(secret, None, self.config.digits)
    }

    /// Generate the code valid at `timestamp` (Unix seconds).
    pub fn generate_at(&self, secret: &Secret, timestamp: u64) -> Result<String> {
        self.compute_code(
            secret,
            Some(timestamp / self.config.time_step),
            self.config.digits,
        )
    }

    /// Search the drift window for the step whose code equals `candidate`.
    ///
    /// The number of digits is given by `candidate` length. Steps are tested
    /// closest to now first.
    pub fn find_step(
        &self,
        secret: &Secret,
        candidate: &str,
    ) -> Result<Option<u64>> {
        let Ok(digits) = u32::try_from(candidate.len()) else {
            return Ok(None);
        };

        if digits == 0 {
            return Ok(None);
        }

        let base_step = self.current_step();

        for offset in drift_offsets(self.window) {
            let Some(step) = base_step.checked_add_signed(offset) else {
                continue;
            };

            let code =
                compute_code(secret, step, digits, self.config.algorithm)?;

            if constant_time_eq::constant_time_eq(
                code.as_bytes(),
                candidate.as_bytes(),
            ) {
                tracing::debug!(step, offset, "totp code matched");
                return Ok(Some(step));
            }
        }

        tracing::debug!(
            base_step,
            window = self.window,
            "totp code did not match"
        );

        Ok(None)
    }

    /// Check whether `candidate` is valid now, allowing for clock drift.
    pub fn verify_code(&self, secret: &Secret, candidate: &str) -> Result<bool> {
        Ok(self.find_step(secret, candidate)?.is_some())
    }

    /// Same as [`Totp::verify_code`] with a Base32-encoded secret.
    pub fn verify_encoded(&self, secret: &str, candidate: &str) -> Result<bool> {
        let secret = Secret::import(secret)?;
        self.verify_code(&secret, candidate)
    }
}
