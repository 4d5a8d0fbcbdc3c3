//! # Design
//!
//! - Keep cache error messages constant; the path and operation travel as fields.
//! - A corrupt cache file is not an error: it is logged and reset during load.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while loading or persisting the dedup cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem access to the cache file or its directory failed.
    #[error("cache io failure")]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The id set could not be serialised.
    #[error("cache encode failure")]
    Encode {
        /// Cache file being written.
        path: PathBuf,
        /// Underlying serialisation error.
        source: serde_json::Error,
    },
}

impl CacheError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_helper_keeps_context_out_of_message() {
        let err = CacheError::io("persist.write", "/data/cache.json", io::Error::other("disk"));
        assert_eq!(err.to_string(), "cache io failure");
        assert!(err.source().is_some());
        assert!(matches!(
            err,
            CacheError::Io {
                operation: "persist.write",
                ..
            }
        ));
    }
}
