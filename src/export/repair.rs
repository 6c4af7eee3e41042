//! Interactive repair of a malformed bulk export.
//!
//! When the export does not parse, its text is written to a recovery file and
//! the run blocks until the operator has fixed the file by hand. The wait is a
//! [`RepairPrompt`]: the terminal implementation resumes on Enter and aborts on
//! Ctrl-C or end of input.

use std::io;
use std::path::Path;
use std::thread;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{info, instrument, warn};

use super::error::ExportError;
use crate::bibtex::{Record, parse_records};

/// Recovery file written next to the working directory during a repair.
pub const DEFAULT_RECOVERY_FILE: &str = "bibtex-recovery.bib";

/// Maximum characters of the parse failure shown to the operator.
pub const DIAGNOSTIC_LIMIT: usize = 300;

/// What the operator chose while the run was suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairDecision {
    /// The recovery file was edited; parse it again.
    Retry,
    /// Give up on the run.
    Abort,
}

/// Blocking wait for an operator to fix the recovery file.
#[async_trait]
pub trait RepairPrompt: Send + Sync {
    /// Suspends until the operator signals a decision.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the operator channel itself fails.
    async fn wait_for_fix(
        &self,
        recovery_path: &Path,
        diagnostic: &str,
    ) -> Result<RepairDecision, ExportError>;
}

/// Prompts on stderr and waits for Enter on stdin.
///
/// The line is read on a detached thread, so an abandoned read never delays
/// process exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl RepairPrompt for TerminalPrompt {
    async fn wait_for_fix(
        &self,
        recovery_path: &Path,
        diagnostic: &str,
    ) -> Result<RepairDecision, ExportError> {
        eprintln!("The BibTeX export could not be parsed:\n  {diagnostic}");
        eprintln!(
            "Fix the file `{}` by hand, then press Enter to retry (Ctrl-C aborts).",
            recovery_path.display()
        );

        let line = read_stdin_line()?;
        tokio::select! {
            read = line => match read {
                Ok(Ok(0)) => {
                    warn!("stdin closed while waiting for BibTeX repair");
                    Ok(RepairDecision::Abort)
                }
                Ok(Ok(_)) => Ok(RepairDecision::Retry),
                Ok(Err(e)) => Err(ExportError::io(STDIN, e)),
                Err(_) => Err(ExportError::io(
                    STDIN,
                    io::Error::other("stdin reader stopped without a result"),
                )),
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted while waiting for BibTeX repair");
                Ok(RepairDecision::Abort)
            }
        }
    }
}

const STDIN: &str = "<stdin>";

/// Reads one line from stdin on a detached thread.
///
/// The thread is never joined; a pending read does not keep the process alive
/// once `main` returns.
fn read_stdin_line() -> Result<oneshot::Receiver<io::Result<usize>>, ExportError> {
    let (tx, rx) = oneshot::channel();
    thread::Builder::new()
        .name("repair-stdin".into())
        .spawn(move || {
            let mut line = String::new();
            // The receiver is gone when the wait was interrupted.
            let _ = tx.send(io::stdin().read_line(&mut line));
        })
        .map_err(|e| ExportError::io(STDIN, e))?;
    Ok(rx)
}

/// Parses `text`, looping through operator repairs until it parses.
///
/// Each failure writes the candidate text to `recovery_path` and waits on
/// `prompt`. On [`RepairDecision::Retry`] the file is read back as the new
/// candidate and deleted. There is no attempt limit.
///
/// # Errors
///
/// Returns [`ExportError::RepairAborted`] when the operator aborts (the
/// recovery file is kept), or [`ExportError::Io`] if the recovery file cannot
/// be written, read or removed.
#[instrument(skip(text, prompt), fields(text_len = text.len(), path = %recovery_path.display()))]
pub async fn parse_with_repair(
    text: String,
    recovery_path: &Path,
    prompt: &dyn RepairPrompt,
) -> Result<Vec<Record>, ExportError> {
    let mut candidate = text;
    let mut attempts = 0u32;

    loop {
        let err = match parse_records(&candidate) {
            Ok(records) => {
                if attempts > 0 {
                    info!(attempts, records = records.len(), "repaired BibTeX parsed");
                }
                return Ok(records);
            }
            Err(err) => err,
        };
        attempts += 1;

        tokio::fs::write(recovery_path, &candidate)
            .await
            .map_err(|e| ExportError::io(recovery_path, e))?;

        let diagnostic = truncate_diagnostic(&err.to_string());
        warn!(attempts, %diagnostic, "BibTeX export is malformed, waiting for manual repair");

        match prompt.wait_for_fix(recovery_path, &diagnostic).await? {
            RepairDecision::Retry => {
                candidate = tokio::fs::read_to_string(recovery_path)
                    .await
                    .map_err(|e| ExportError::io(recovery_path, e))?;
                tokio::fs::remove_file(recovery_path)
                    .await
                    .map_err(|e| ExportError::io(recovery_path, e))?;
            }
            RepairDecision::Abort => {
                return Err(ExportError::RepairAborted {
                    path: recovery_path.to_path_buf(),
                    source: err,
                });
            }
        }
    }
}

/// First [`DIAGNOSTIC_LIMIT`] characters of `message`, marked when cut.
#[must_use]
pub fn truncate_diagnostic(message: &str) -> String {
    if message.chars().count() <= DIAGNOSTIC_LIMIT {
        return message.to_string();
    }
    let shortened: String = message.chars().take(DIAGNOSTIC_LIMIT).collect();
    format!("{shortened}...")
}
