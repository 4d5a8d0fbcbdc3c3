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

//! qBittorrent WebUI (`/api/v2`) session client.
//!
//! Layout: `client.rs` (session-holding HTTP client and the completed catalog).

pub mod client;

pub use client::QbClient;
