//! Environment loading and validation.
//!
//! # Design
//! - Every required variable is checked before any is parsed so operators see the full
//!   list of gaps in one run.
//! - Lookup is injectable; tests never touch the process environment.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::defaults::{
    DEFAULT_CACHE_FILE, ENV_API_KEY, ENV_CACHE_FILE, ENV_CATEGORY_MAP, ENV_INTERVAL,
    ENV_PASSWORD, ENV_URL, ENV_USERNAME, REQUIRED_VARS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::{CategoryMap, Config, Credentials};

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| read(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv { names: missing });
        }

        let require = |name: &'static str| {
            read(name).ok_or_else(|| ConfigError::MissingEnv { names: vec![name] })
        };

        let endpoint = parse_endpoint(&require(ENV_URL)?)?;
        let credentials = Credentials {
            username: require(ENV_USERNAME)?,
            password: require(ENV_PASSWORD)?,
        };
        let poll_interval = parse_interval(&require(ENV_INTERVAL)?)?;
        let categories = CategoryMap::parse(&require(ENV_CATEGORY_MAP)?)?;
        let cache_path = read(ENV_CACHE_FILE)
            .map_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE), PathBuf::from);

        Ok(Self {
            endpoint,
            credentials,
            api_key: read(ENV_API_KEY),
            poll_interval,
            categories,
            cache_path,
        })
    }
}

fn parse_endpoint(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidField {
        field: ENV_URL,
        reason: "invalid_url",
        value: Some(raw.to_string()),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field: ENV_URL,
            reason: "unsupported_scheme",
            value: Some(raw.to_string()),
        });
    }
    Ok(url)
}

fn parse_interval(raw: &str) -> ConfigResult<Duration> {
    let seconds: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidField {
            field: ENV_INTERVAL,
            reason: "not_an_integer",
            value: Some(raw.to_string()),
        })?;
    if seconds == 0 {
        return Err(ConfigError::InvalidField {
            field: ENV_INTERVAL,
            reason: "not_positive",
            value: Some(raw.to_string()),
        });
    }
    Ok(Duration::from_secs(seconds))
}
