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

//! Environment-backed configuration for the Stowage watcher.
//!
//! Layout: `model.rs` (typed configuration), `categories.rs` (category to
//! destination mapping), `loader.rs` (environment lookup and validation),
//! `defaults.rs` (variable names and fallbacks).

pub mod categories;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use categories::CategoryMap;
pub use error::{ConfigError, ConfigResult};
pub use model::{Config, Credentials};
