#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Durable record of torrents that have already been staged into the library.
//!
//! Layout: `cache.rs` (JSON-backed id set with atomic rewrites), `error.rs` (cache errors).

pub mod cache;
pub mod error;

pub use cache::DedupCache;
pub use error::{CacheError, CacheResult};
