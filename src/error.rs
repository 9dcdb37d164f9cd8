//! Error handler for totp.

pub type Result<T> = std::result::Result<T, TotpError>;

/// Enum representing TOTP errors.
#[derive(Debug, thiserror::Error)]
pub enum TotpError {
    #[error("random source failed to produce bytes")]
    Entropy(#[from] rand::Error),

    #[error("provided TOTP secret is invalid")]
    InvalidSecret,

    #[error("invalid `{field}`: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("configuration file is malformed")]
    Config(#[from] serde_yaml::Error),
}

impl TotpError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }
}
