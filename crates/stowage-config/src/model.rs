//! Typed configuration produced once at startup.
//!
//! # Design
//! - Pure data carriers; loading and validation live in `loader.rs`.
//! - Immutable after construction and passed by reference to the services that need it.

use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::CategoryMap;

/// Validated watcher configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the qBittorrent WebUI API, possibly with a path prefix.
    pub endpoint: Url,
    /// Login credentials for the WebUI.
    pub credentials: Credentials,
    /// Optional API key sent as a bearer token on every request.
    pub api_key: Option<String>,
    /// Delay between reconciliation ticks; always non-zero.
    pub poll_interval: Duration,
    /// Category to destination directory mapping.
    pub categories: CategoryMap,
    /// Location of the durable dedup cache file.
    pub cache_path: PathBuf,
}

/// Username and password pair for the WebUI login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
