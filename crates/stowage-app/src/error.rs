//! # Design
//!
//! - Centralize startup errors; every variant names the operation that failed.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Per-item and per-tick failures are logged by the reconciler, never surfaced here.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded from the environment.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: stowage_config::ConfigError,
    },
    /// Logging could not be installed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: stowage_telemetry::TelemetryError,
    },
    /// The qBittorrent session could not be established.
    #[error("torrent client operation failed")]
    Torrent {
        /// Operation identifier.
        operation: &'static str,
        /// Source torrent error.
        source: stowage_torrent_core::TorrentError,
    },
    /// The dedup cache could not be loaded.
    #[error("dedup cache operation failed")]
    Cache {
        /// Operation identifier.
        operation: &'static str,
        /// Source cache error.
        source: stowage_runtime::CacheError,
    },
    /// The async runtime could not be built.
    #[error("runtime operation failed")]
    Runtime {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: stowage_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: stowage_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn torrent(
        operation: &'static str,
        source: stowage_torrent_core::TorrentError,
    ) -> Self {
        Self::Torrent { operation, source }
    }

    pub(crate) const fn cache(operation: &'static str, source: stowage_runtime::CacheError) -> Self {
        Self::Cache { operation, source }
    }

    pub(crate) const fn runtime(operation: &'static str, source: io::Error) -> Self {
        Self::Runtime { operation, source }
    }
}
