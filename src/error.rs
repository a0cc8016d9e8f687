//! Failure kinds and the uniform error reporter.
//!
//! The variants of [`ShellError`] exist for logs and tests only. Whatever goes
//! wrong, the user sees [`UNIFORM_ERROR`] and nothing else.

use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// The single diagnostic printed for every failure.
pub const UNIFORM_ERROR: &str = "An error has occurred\n";

/// Process exit status used when a failure terminates the shell.
pub const FAILURE_STATUS: i32 = 1;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("empty command")]
    EmptyCommand,

    #[error("malformed output redirection")]
    MalformedRedirection,

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error(transparent)]
    Builtin(#[from] anyhow::Error),

    #[error("cannot open {}: {source}", path.display())]
    OpenRedirect { path: PathBuf, source: io::Error },

    #[error("failed to spawn {command}: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("failed to wait for {command}: {source}")]
    Wait { command: String, source: io::Error },

    #[error("{command} exited with status {code}")]
    NonZeroExit { command: String, code: i32 },

    #[error("failed to start parallel worker: {0}")]
    Worker(io::Error),

    #[error("line editor: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("cannot read batch file {}: {source}", path.display())]
    BatchFile { path: PathBuf, source: io::Error },

    #[error("usage: {0}")]
    Usage(String),
}

/// Print the uniform error to stderr. Details only go to the debug log.
pub fn report(err: &ShellError) {
    tracing::debug!(error = %err, "command failed");
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_all(UNIFORM_ERROR.as_bytes());
    let _ = stderr.flush();
}

/// Report `err` and terminate the process.
pub fn fatal(err: &ShellError) -> ! {
    report(err);
    std::process::exit(FAILURE_STATUS)
}
