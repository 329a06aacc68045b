#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Tail-trim planning and batch orchestration.
//!
//! Layout: `model/` (requests and outcomes), `planner.rs` (seek start),
//! `output.rs` (output naming), `validate.rs` (free-text inputs),
//! `selection.rs` (caller state), `service.rs` (batch runner).

pub mod error;
pub mod model;
pub mod output;
pub mod planner;
pub mod selection;
pub mod service;
pub mod validate;

pub use error::{TrimError, TrimResult};
pub use model::{
    BatchResult, FailureKind, FileFailure, FileOutcome, FileStatus, PlanStatus, PlannedTrim,
    SourceRemoval, TrimRequest,
};
pub use output::derive_output_path;
pub use planner::compute_seek_start;
pub use selection::Selection;
pub use service::{TrimOptions, TrimService};
pub use validate::parse_retained_seconds;
