//! Command handlers grouped by subcommand.

pub(crate) mod cut;
pub(crate) mod plan;
