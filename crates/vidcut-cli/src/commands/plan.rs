//! `vidcut plan`: dry run that probes each file.

use vidcut_trim::{TrimRequest, parse_retained_seconds};

use crate::cli::{OutputFormat, PlanArgs, Service};
use crate::error::{CliError, CliResult, EXIT_FILES_FAILED};
use crate::output::render_plan;

pub(crate) async fn handle(
    service: &Service,
    args: PlanArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    if args.files.is_empty() {
        return Err(CliError::validation("no input files given"));
    }
    let retained_seconds = parse_retained_seconds(&args.keep)?;
    let request = TrimRequest::new(args.files, retained_seconds, false)?;
    let plans = service.plan_batch(&request).await?;
    render_plan(&plans, format)?;

    let blocked = plans.iter().any(|planned| planned.plan.failure().is_some());
    Ok(if blocked { EXIT_FILES_FAILED } else { 0 })
}
