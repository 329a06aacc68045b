#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Transcode engine capability and its ffmpeg-backed implementation.
//!
//! Layout: `engine.rs` (capability traits), `ffmpeg.rs` (process-backed engine),
//! `error.rs` (media errors).

pub mod engine;
pub mod error;
pub mod ffmpeg;

pub use engine::{EngineProvider, TranscodeEngine};
pub use error::{MediaError, MediaResult};
pub use ffmpeg::{FfmpegEngine, FfmpegProvider};
