#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! File and environment backed configuration for vidcut.
//!
//! Layout: `model.rs` (typed config and policy enums), `loader.rs` (file and
//! environment layering), `validate.rs` (validation helpers), `error.rs`.

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_CODEC_MODE, ENV_FFMPEG, ENV_FFPROBE, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_ON_CONFLICT,
    ENV_OUTPUT_PREFIX,
};
pub use model::{CodecMode, ConflictPolicy, TrimConfig};
pub use validate::validate_config;
