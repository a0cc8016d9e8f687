use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdout};
use crate::env::ShellContext;
use crate::error::ShellError;
use crate::interpreter::Factory;
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins take their operands verbatim, the way the words appeared on the
/// command line: no option parsing, no help flags. They run directly against
/// the shell context without spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd" or "path".
    fn name() -> &'static str;

    /// Build the command from the words following its name.
    fn from_operands(operands: &[&str]) -> Self;

    /// Executes the command against the given context.
    fn execute(self, stdout: &mut dyn Write, ctx: &mut ShellContext) -> Result<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdout: Box<dyn Stdout>,
        ctx: &mut ShellContext,
    ) -> Result<ExitCode, ShellError> {
        <T as BuiltinCommand>::execute(*self, &mut stdout, ctx)?;
        Ok(0)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _ctx: &ShellContext,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(Box::new(T::from_operands(args)))
        } else {
            None
        }
    }
}

/// Change the current working directory.
///
/// Only the first operand is used; anything after it is ignored.
pub struct Cd {
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_operands(operands: &[&str]) -> Self {
        Self {
            target: operands.first().map(|t| t.to_string()),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, ctx: &mut ShellContext) -> Result<()> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => bail!("cd: missing directory operand"),
        };

        let new_dir = ctx.absolutize(&target);
        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;
        if !canonical.is_dir() {
            bail!("cd: {} is not a directory", canonical.display());
        }

        tracing::debug!(dir = %canonical.display(), "changed directory");
        ctx.current_dir = canonical;
        Ok(())
    }
}

/// Replace the executable search path. The default directory always stays
/// first; with no operands only the default remains.
pub struct PathCmd {
    /// directories to search after the default one, in order.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for PathCmd {
    fn name() -> &'static str {
        "path"
    }

    fn from_operands(operands: &[&str]) -> Self {
        Self {
            dirs: operands.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, ctx: &mut ShellContext) -> Result<()> {
        ctx.path.replace(self.dirs);
        Ok(())
    }
}
