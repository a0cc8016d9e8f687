use crate::path_table::PathTable;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Mutable state shared by every command run in one shell.
///
/// The context contains:
/// - `path`: the directories searched to resolve command names.
/// - `current_dir`: the working directory children are started in.
///
/// The shell never changes the process-wide working directory. `cd` only moves
/// `current_dir`, so a cloned context is a fully independent snapshot: parallel
/// workers each get one and their built-ins cannot leak into the parent.
#[derive(Debug, Clone)]
pub struct ShellContext {
    /// Search path for external commands.
    pub path: PathTable,
    /// The logical working directory.
    pub current_dir: PathBuf,
}

impl ShellContext {
    /// Capture the process working directory and install the default path.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_dir(current_dir)
    }

    pub fn with_dir(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: PathTable::default(),
            current_dir: current_dir.into(),
        }
    }

    /// Resolve a command name through the path table.
    pub fn resolve(&self, command: &str) -> Option<PathBuf> {
        let found = self.path.search(command, &self.current_dir);
        tracing::debug!(command, found = ?found, "resolved command");
        found
    }

    /// Interpret `path` relative to the logical working directory.
    pub fn absolutize(&self, path: &Path) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for ShellContext {
    fn default() -> Self {
        Self::new()
    }
}
