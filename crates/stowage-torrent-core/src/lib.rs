//! Client-agnostic torrent interfaces and DTOs.
//!
//! Layout: `model.rs` (completed download records), `error.rs` (remote failures).

pub mod error;
pub mod model;

use async_trait::async_trait;

pub use error::{TorrentError, TorrentResult};
pub use model::CompletedItem;

/// Source of completed downloads polled by the reconciler.
#[async_trait]
pub trait CompletedCatalog: Send + Sync {
    /// List every download the client reports as completed, in the client's order.
    async fn list_completed(&self) -> TorrentResult<Vec<CompletedItem>>;
}
