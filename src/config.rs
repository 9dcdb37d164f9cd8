//! Configuration manager for totp.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TotpError};
use crate::secret::Secret;
use crate::totp::{DEFAULT_WINDOW, Totp, TotpConfig};

const DEFAULT_CONFIG_PATH: &str = "totp.yaml";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Related to MFA via TOTP configuration.
    #[serde(default)]
    pub totp: TotpSettings,
    #[serde(skip)]
    path: PathBuf,
}

/// TOTP configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpSettings {
    /// Hash name, `sha1`, `sha256` or `sha512`.
    pub algorithm: String,
    /// Number of digits for the code.
    pub digits: u32,
    /// Window for code usage, in seconds.
    pub period: i64,
    /// Tolerated drift, in periods, before and after now.
    pub window: u32,
    /// Random bytes of newly generated secrets.
    pub secret_length: usize,
}

impl Default for TotpSettings {
    fn default() -> Self {
        Self {
            algorithm: "sha1".into(),
            digits: TotpConfig::DEFAULT_DIGITS,
            period: TotpConfig::DEFAULT_TIME_STEP as i64,
            window: DEFAULT_WINDOW,
            secret_length: Secret::DEFAULT_LENGTH,
        }
    }
}

impl TotpSettings {
    /// Build a TOTP engine reading the system clock.
    pub fn engine(&self) -> Result<Totp> {
        Ok(Totp::new(TotpConfig::try_from(self)?).with_window(self.window))
    }

    /// Generate a secret of the configured length.
    pub fn generate_secret(&self) -> Result<Secret> {
        Secret::generate(self.secret_length)
    }
}

impl TryFrom<&TotpSettings> for TotpConfig {
    type Error = TotpError;

    fn try_from(settings: &TotpSettings) -> Result<Self> {
        let time_step = u64::try_from(settings.period)
            .map_err(|_| TotpError::invalid("period", "period must be positive"))?;

        TotpConfig::new(time_step, settings.digits, settings.algorithm.parse()?)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Parse a YAML document.
    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads the `totp.yaml` file from the specified path or the default
    /// location.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file exists but is not valid YAML.
    pub fn read(self) -> Result<Self> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(&file_path) {
            Ok(file) => {
                let config: Configuration = serde_yaml::from_reader(file)?;
                tracing::debug!(
                    path = %file_path.display(),
                    algorithm = %config.totp.algorithm,
                    "configuration loaded"
                );

                Ok(config.path(file_path))
            },
            Err(err) => Ok(self.error(err)),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: std::io::Error) -> Self {
        tracing::error!(
            error = %err,
            kind = ?err.kind(),
            "configuration file could not be opened"
        );
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Algorithm;

    #[test]
    fn test_default_settings() {
        let config = TotpConfig::try_from(&TotpSettings::default()).unwrap();

        assert_eq!(config, TotpConfig::default());
        assert_eq!(TotpSettings::default().engine().unwrap().window(), 4);
    }

    #[test]
    fn test_parse_settings() {
        let config = Configuration::parse(
            "totp:\n  algorithm: SHA512\n  digits: 8\n  period: 60\n  window: 2\n",
        )
        .unwrap();

        let totp = config.totp.engine().unwrap();
        assert_eq!(totp.config().algorithm(), Algorithm::Sha512);
        assert_eq!(totp.config().digits(), 8);
        assert_eq!(totp.config().time_step(), 60);
        assert_eq!(totp.window(), 2);
        assert_eq!(config.totp.secret_length, 16);
    }

    #[test]
    fn test_missing_section() {
        let config = Configuration::parse("{}").unwrap();
        assert_eq!(config.totp, TotpSettings::default());
    }

    #[test]
    fn test_invalid_hash() {
        let settings = TotpSettings {
            algorithm: "md5".into(),
            ..Default::default()
        };

        assert!(matches!(
            settings.engine(),
            Err(TotpError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_time_step_positive() {
        for period in [0, -30] {
            let settings = TotpSettings {
                period,
                ..Default::default()
            };

            assert!(matches!(
                TotpConfig::try_from(&settings),
                Err(TotpError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Configuration::parse("totp: [unterminated"),
            Err(TotpError::Config(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let config = Configuration::default()
            .path(PathBuf::from("does/not/exist.yaml"))
            .read()
            .unwrap();

        assert_eq!(config.totp, TotpSettings::default());
    }

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("totp-{}-{name}.yaml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_file() {
        let path = write_config(
            "valid",
            "totp:\n  algorithm: sha256\n  digits: 8\n  period: 60\n  window: 1\n  secret_length: 32\n",
        );

        let config = Configuration::default().path(path.clone()).read().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.path, path);
        assert_eq!(
            config.totp,
            TotpSettings {
                algorithm: "sha256".into(),
                digits: 8,
                period: 60,
                window: 1,
                secret_length: 32,
            }
        );
        assert_eq!(
            config.totp.engine().unwrap().config().algorithm(),
            Algorithm::Sha256
        );
    }

    #[test]
    fn test_read_malformed_file() {
        let path = write_config("malformed", "totp: [unterminated");

        let result = Configuration::default().path(path.clone()).read();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(TotpError::Config(_))));
    }

    #[test]
    fn test_generate_secret() {
        let settings = TotpSettings {
            secret_length: 20,
            ..Default::default()
        };

        assert_eq!(settings.generate_secret().unwrap().len(), 20);
    }
}
