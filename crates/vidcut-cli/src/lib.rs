#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line front end for trimming video files to their final seconds.
//!
//! Layout:
//! - `cli.rs`: argument parsing, bootstrap and command dispatch
//! - `commands/`: command handlers
//! - `error.rs`: CLI errors and exit codes
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;
pub(crate) mod output;

pub use cli::run;
