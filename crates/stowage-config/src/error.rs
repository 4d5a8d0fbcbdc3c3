//! # Design
//!
//! - Startup validation errors carry the offending field and a machine-readable reason.
//! - Messages stay constant; context lives in the variant fields.

use thiserror::Error;

/// Primary error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables were absent or empty.
    #[error("missing environment configuration")]
    MissingEnv {
        /// Names of every missing variable, in reporting order.
        names: Vec<&'static str>,
    },
    /// A variable was present but could not be interpreted.
    #[error("invalid configuration field")]
    InvalidField {
        /// Variable that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// The category map string was not a list of unique `key:value` pairs.
    #[error(
        "invalid category map; expected e.g. '{}'",
        crate::defaults::CATEGORY_MAP_EXAMPLE
    )]
    InvalidCategoryMap {
        /// Entry that failed to parse.
        entry: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
