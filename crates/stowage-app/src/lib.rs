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

//! Stowage application wiring.
//!
//! Layout: `bootstrap.rs` (startup sequence), `reconciler.rs` (poll, copy, record),
//! `signal.rs` (termination signals), `error.rs` (application errors).

/// Startup sequence and environment loading.
pub mod bootstrap;
/// Application error type.
pub mod error;
/// Poll loop that copies newly completed downloads.
pub mod reconciler;
/// Termination signal handling.
pub mod signal;

pub use bootstrap::{SHUTDOWN_GRACE, run_app, run_app_with, run_on_runtime};
pub use error::{AppError, AppResult};
pub use reconciler::{Reconciler, TickReport};
