#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Command-line client for the NetBox DCIM REST API.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: generic CRUD handlers and payload loading
//! - `client.rs`: shared HTTP client, errors, and telemetry helpers
//! - `config.rs`: environments file lookup and resolution
//! - `endpoints.rs`: resource path table
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod endpoints;
pub(crate) mod output;

pub use cli::run;
