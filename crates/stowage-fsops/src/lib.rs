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

//! Copy engine that stages completed downloads into library directories.
//!
//! Layout: `service.rs` (single-file and recursive merge copy), `error.rs` (fsops errors).

pub mod error;
pub mod service;

pub use error::{FsOpsError, FsOpsResult};
pub use service::{CopyEngine, CopyReport};
