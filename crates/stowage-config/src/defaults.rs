//! Environment variable names and fallback values.
//!
//! # Design
//! - Keep every variable name in one place so the loader and its tests agree.

/// Base URL of the qBittorrent WebUI API.
pub const ENV_URL: &str = "QBITTORRENT_URL";
/// WebUI login user.
pub const ENV_USERNAME: &str = "QBITTORRENT_USERNAME";
/// WebUI login password.
pub const ENV_PASSWORD: &str = "QBITTORRENT_PASSWORD";
/// Optional API key forwarded as a bearer token.
pub const ENV_API_KEY: &str = "QBITTORRENT_API_KEY";
/// Poll interval in whole seconds.
pub const ENV_INTERVAL: &str = "CHECK_INTERVAL";
/// Comma separated `category:directory` pairs.
pub const ENV_CATEGORY_MAP: &str = "TAG_DEST_MAP";
/// Optional override for the dedup cache location.
pub const ENV_CACHE_FILE: &str = "CACHE_FILE";

/// Variables that must be present and non-empty, in reporting order.
pub const REQUIRED_VARS: &[&str] = &[
    ENV_URL,
    ENV_USERNAME,
    ENV_PASSWORD,
    ENV_INTERVAL,
    ENV_CATEGORY_MAP,
];

/// Dedup cache location used when `CACHE_FILE` is not set.
pub const DEFAULT_CACHE_FILE: &str = "/data/cache.json";

/// Example rendered in category map errors.
pub const CATEGORY_MAP_EXAMPLE: &str = "audiobook:/media/audiobooks,movies:/media/movies";
