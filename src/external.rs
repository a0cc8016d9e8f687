use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdout};
use crate::env::ShellContext;
use crate::error::ShellError;
use crate::interpreter::Factory;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Commands allowed to exit non-zero without failing the shell. Their own
/// diagnostics on stderr are considered enough.
pub const LENIENT_COMMANDS: &[&str] = &["ls"];

/// Command that is not a builtin, already resolved to an executable.
pub struct ExternalCommand {
    program: PathBuf,
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: PathBuf, name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program,
            name: name.into(),
            args,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        ctx: &ShellContext,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let program = ctx.resolve(name)?;
        Some(Box::new(ExternalCommand::new(
            program,
            name,
            args.iter().map(|x| x.to_string()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: Box<dyn Stdout>,
        ctx: &mut ShellContext,
    ) -> Result<ExitCode, ShellError> {
        let mut child = std::process::Command::new(&self.program)
            .arg0(&self.name)
            .args(&self.args)
            .stdout(stdout.stdio())
            .current_dir(&ctx.current_dir)
            .spawn()
            .map_err(|source| ShellError::Spawn {
                command: self.name.clone(),
                source,
            })?;
        tracing::debug!(command = %self.name, pid = child.id(), "spawned");

        let exit_status = child.wait().map_err(|source| ShellError::Wait {
            command: self.name.clone(),
            source,
        })?;
        // Only an exit status counts; a child killed by a signal did not exit
        // with one and is not judged.
        let code = match exit_status.code() {
            Some(x) => x,
            None => {
                tracing::debug!(
                    command = %self.name,
                    signal_code = terminated_by_signal(exit_status),
                    "terminated by signal"
                );
                0
            }
        };
        tracing::debug!(command = %self.name, code, "exited");
        Ok(code)
    }
}

/// Whether a non-zero exit of `name` is tolerated.
pub fn is_lenient(name: &str) -> bool {
    LENIENT_COMMANDS.contains(&name)
}

fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}

/// Open `path` for a redirected command: create with mode 0644 or truncate.
pub fn open_redirect_target(path: &Path) -> Result<File, ShellError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .map_err(|source| ShellError::OpenRedirect {
            path: path.to_path_buf(),
            source,
        })
}

/// Run `argv` with its standard output sent to `target`.
///
/// The file is opened before the command is resolved, so it is truncated even
/// when resolution fails. The exit status of the command is not inspected.
pub fn run_redirected(
    argv: &[String],
    target: &Path,
    ctx: &mut ShellContext,
) -> Result<(), ShellError> {
    let file = open_redirect_target(&ctx.absolutize(target))?;
    let name = &argv[0];
    let program = ctx
        .resolve(name)
        .ok_or_else(|| ShellError::CommandNotFound(name.clone()))?;

    let cmd = Box::new(ExternalCommand::new(program, name, argv[1..].to_vec()));
    let code = cmd.execute(Box::new(file), ctx)?;
    tracing::debug!(command = %name, code, target = %target.display(), "redirected command finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lock_processes, write_script};
    use std::fs;

    fn ctx_with_path(dir: &Path) -> ShellContext {
        let mut ctx = ShellContext::with_dir(dir);
        ctx.path.replace([dir.to_string_lossy().into_owned()]);
        ctx
    }

    #[test]
    fn test_factory_returns_none_for_unknown_command() {
        let ctx = ShellContext::with_dir("/");
        let factory = Factory::<ExternalCommand>::default();
        assert!(factory.try_create(&ctx, "no_such_command_xyz", &[]).is_none());
    }

    #[test]
    fn test_exit_code_is_reported() {
        let _lock = lock_processes();
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "exit_three", "exit 3");
        let mut ctx = ctx_with_path(tmp.path());

        let cmd = Factory::<ExternalCommand>::default()
            .try_create(&ctx, "exit_three", &[])
            .unwrap();
        assert_eq!(cmd.execute(Box::new(std::io::stdout()), &mut ctx).unwrap(), 3);
    }

    #[test]
    fn test_signal_death_has_no_exit_status() {
        let _lock = lock_processes();
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "self_kill", "kill -9 $$");
        let mut ctx = ctx_with_path(tmp.path());

        let cmd = Factory::<ExternalCommand>::default()
            .try_create(&ctx, "self_kill", &[])
            .unwrap();
        assert_eq!(cmd.execute(Box::new(std::io::stdout()), &mut ctx).unwrap(), 0);
    }

    #[test]
    fn test_child_sees_arg0_args_and_logical_cwd() {
        let _lock = lock_processes();
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "show_args", r#"echo "$0|$1|$2|$(pwd)""#);
        let mut ctx = ctx_with_path(tmp.path());

        let argv = vec!["show_args".to_string(), "a".to_string(), "b".to_string()];
        run_redirected(&argv, Path::new("out.txt"), &mut ctx).unwrap();

        let out = fs::read_to_string(tmp.path().join("out.txt")).unwrap();
        let (arg0, rest) = out.trim_end().split_once('|').unwrap();
        assert!(arg0.ends_with("show_args"));
        let cwd = fs::canonicalize(tmp.path()).unwrap();
        assert_eq!(rest, format!("a|b|{}", cwd.display()));
    }

    #[test]
    fn test_redirect_truncates_existing_file() {
        let _lock = lock_processes();
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "say_hi", "echo hi");
        fs::write(tmp.path().join("out.txt"), "old contents that are longer\n").unwrap();
        let mut ctx = ctx_with_path(tmp.path());

        let argv = vec!["say_hi".to_string()];
        run_redirected(&argv, Path::new("out.txt"), &mut ctx).unwrap();
        run_redirected(&argv, Path::new("out.txt"), &mut ctx).unwrap();

        assert_eq!(fs::read_to_string(tmp.path().join("out.txt")).unwrap(), "hi\n");
    }

    #[test]
    fn test_redirect_creates_file_even_if_command_missing() {
        let _lock = lock_processes();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("out.txt"), "stale").unwrap();
        let mut ctx = ctx_with_path(tmp.path());

        let argv = vec!["missing_tool".to_string()];
        let err = run_redirected(&argv, Path::new("out.txt"), &mut ctx).unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound(_)));
        assert_eq!(fs::read_to_string(tmp.path().join("out.txt")).unwrap(), "");
    }

    #[test]
    fn test_redirect_ignores_exit_status() {
        let _lock = lock_processes();
        let tmp = tempfile::tempdir().unwrap();
        write_script(tmp.path(), "fail_loudly", "echo partial; exit 7");
        let mut ctx = ctx_with_path(tmp.path());

        let argv = vec!["fail_loudly".to_string()];
        run_redirected(&argv, Path::new("out.txt"), &mut ctx).unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("out.txt")).unwrap(), "partial\n");
    }

    #[test]
    fn test_only_ls_is_lenient() {
        assert!(is_lenient("ls"));
        assert!(!is_lenient("cat"));
    }
}
