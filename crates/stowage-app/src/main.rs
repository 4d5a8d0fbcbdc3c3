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

//! Binary entrypoint for the Stowage watcher.

use stowage_app::{AppResult, SHUTDOWN_GRACE, run_app, run_on_runtime};

/// Runs the watcher until SIGTERM/SIGINT; startup failures exit non-zero.
fn main() -> AppResult<()> {
    run_on_runtime(run_app(), SHUTDOWN_GRACE)
}
