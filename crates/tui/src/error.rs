//! Error types for the confirmation registry.

use thiserror::Error;

/// Result type for registry and provider operations.
pub type ConfirmResult<T> = Result<T, ConfirmError>;

/// Errors raised synchronously by the confirmation API.
///
/// None of these ever cross a [`crate::Confirmation`] boundary: a returned
/// confirmation only resolves to a boolean.
#[derive(Debug, Error)]
pub enum ConfirmError {
    /// A prompt targeted a scope that has no mounted provider.
    #[error(
        "no confirmation provider is mounted for scope `{scope}`; mount a ConfirmationProvider for this scope before prompting"
    )]
    MissingProvider { scope: String },

    /// A second provider was mounted for a scope while the duplicate policy is `reject`.
    #[error("a confirmation provider is already mounted for scope `{scope}`")]
    DuplicateProvider { scope: String },

    /// The TOML configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// An environment override had a value that could not be interpreted.
    #[error("invalid value `{value}` for {key}")]
    InvalidSetting { key: &'static str, value: String },

    /// Reading the configuration file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
