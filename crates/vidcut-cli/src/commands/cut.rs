//! `vidcut cut`: run a trim batch with progress, confirmation and interrupt handling.

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use vidcut_events::Event;
use vidcut_trim::Selection;

use crate::cli::{CutArgs, OutputFormat, Service};
use crate::error::{CliError, CliResult, EXIT_FILES_FAILED};
use crate::output::{progress_line, render_batch};

pub(crate) async fn handle(
    service: Arc<Service>,
    args: CutArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut selection = Selection::new();
    selection.set_paths(args.files);
    selection.set_retained_seconds(args.keep);
    selection.set_delete_source_on_success(args.delete_originals);
    selection.validate()?;

    if selection.delete_source_on_success() && !args.yes {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(CliError::validation(
                "--delete-originals needs confirmation; pass --yes when stdin is not a terminal",
            ));
        }
        let confirmed = confirm_deletion(
            selection.paths().len(),
            &mut stdin.lock(),
            &mut io::stderr(),
        )
        .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}")))?;
        if !confirmed {
            selection.reset();
            eprintln!("cancelled; no files were touched");
            return Ok(0);
        }
    }

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping after the current file");
                cancel.cancel();
            }
        }
    });

    let mut stream = service.events().subscribe(None);
    let progress = tokio::spawn(async move {
        while let Some(envelope) = stream.next().await {
            if matches!(envelope.event, Event::SelectionReset) {
                break;
            }
            if let Some(line) = progress_line(&envelope.event) {
                eprintln!("{line}");
            }
        }
    });

    let batch = tokio::spawn({
        let service = Arc::clone(&service);
        let cancel = cancel.clone();
        async move {
            service
                .run_selection_with_cancel(&mut selection, &cancel)
                .await
        }
    })
    .await;
    interrupt.abort();

    let result = match batch {
        Ok(result) => {
            let _ = progress.await;
            result?
        }
        Err(err) => {
            progress.abort();
            return Err(CliError::failure(anyhow!("trim batch task failed: {err}")));
        }
    };

    render_batch(&result, format)?;
    Ok(if result.failed() > 0 { EXIT_FILES_FAILED } else { 0 })
}

/// Ask whether originals may be removed. Anything but `y`/`yes` declines.
pub(crate) fn confirm_deletion<R, W>(count: usize, input: &mut R, output: &mut W) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(
        output,
        "Delete {count} original file(s) after trimming? [y/N] "
    )?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(text: &str) -> io::Result<(bool, String)> {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        let confirmed = confirm_deletion(3, &mut input, &mut output)?;
        Ok((confirmed, String::from_utf8_lossy(&output).into_owned()))
    }

    #[test]
    fn confirmation_accepts_only_yes() -> io::Result<()> {
        let (confirmed, prompt) = answer("y\n")?;
        assert!(confirmed);
        assert_eq!(prompt, "Delete 3 original file(s) after trimming? [y/N] ");
        assert!(answer(" YES \n")?.0);
        assert!(!answer("\n")?.0);
        assert!(!answer("no\n")?.0);
        assert!(!answer("")?.0);
        Ok(())
    }
}
