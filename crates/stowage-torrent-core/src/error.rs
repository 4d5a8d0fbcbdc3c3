//! Error types for torrent client interactions.

use std::error::Error;

use thiserror::Error;

/// Primary error type for torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentError {
    /// The client could not be constructed.
    #[error("torrent client construction failed")]
    ClientBuild {
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Login did not return the success marker. Fatal at startup.
    #[error("torrent client authentication failed")]
    Authentication {
        /// Login URL that was called.
        url: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Underlying transport failure when available.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    /// A remote call failed at the transport, status, or decoding level.
    #[error("torrent client request failed")]
    Remote {
        /// Operation identifier.
        operation: &'static str,
        /// URL that was called.
        url: String,
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Underlying failure when available.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
}

/// Convenience alias for torrent operation results.
pub type TorrentResult<T> = Result<T, TorrentError>;
