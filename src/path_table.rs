use nix::unistd::{AccessFlags, access};
use std::path::{Path, PathBuf};

/// Directory installed whenever the table is reset.
pub const DEFAULT_SEARCH_DIR: &str = "/bin";

/// Ordered list of directories searched to resolve a command name.
///
/// The table is never empty: it always starts with [`DEFAULT_SEARCH_DIR`].
/// Entries are searched in insertion order and duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTable {
    dirs: Vec<String>,
}

impl Default for PathTable {
    fn default() -> Self {
        Self {
            dirs: vec![DEFAULT_SEARCH_DIR.to_string()],
        }
    }
}

impl PathTable {
    /// Drop every entry and install the single default directory.
    pub fn reset_to_default(&mut self) {
        self.dirs.clear();
        self.dirs.push(DEFAULT_SEARCH_DIR.to_string());
    }

    /// Reset the table, then append `new_entries` in order.
    ///
    /// With no entries this restores the default-only state; it never leaves
    /// the table empty.
    pub fn replace<I, S>(&mut self, new_entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reset_to_default();
        self.dirs.extend(new_entries.into_iter().map(Into::into));
        tracing::debug!(dirs = ?self.dirs, "search path replaced");
    }

    pub fn entries(&self) -> &[String] {
        &self.dirs
    }

    /// Resolve `command` to the first executable `dir + "/" + command`.
    ///
    /// Relative directories are taken relative to `cwd`. The candidate must be
    /// a regular file the current user may execute. Directory order is a hard
    /// tie-break.
    pub fn search(&self, command: &str, cwd: &Path) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| {
            let candidate = cwd.join(format!("{dir}/{command}"));
            is_executable(&candidate).then_some(candidate)
        })
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}
