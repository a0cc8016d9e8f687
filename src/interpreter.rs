use crate::command::CommandFactory;
use crate::env::ShellContext;
use crate::error::{self, ShellError};
use crate::external;
use crate::lexer::{self, PARALLEL_MARKER};
use crate::parser::{self, Invocation};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;

/// Prompt shown by the interactive read loop.
pub const PROMPT: &str = "witsh> ";

/// Line that ends the shell when read by either loop.
pub const EXIT_LINE: &str = "exit";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: the builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What a read loop should do after handling one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A minimal shell interpreter that can execute built-in and external commands.
///
/// The interpreter maintains a [`ShellContext`] and a list of [`CommandFactory`]
/// objects that are queried in order to create commands by name. See
/// [`Interpreter::with_context`] for the factories included out of the box.
///
/// Example
/// ```no_run
/// use witshell::Interpreter;
/// let mut sh = Interpreter::default();
/// sh.execute_line("path /usr/bin").unwrap();
/// sh.execute_line("echo one & echo two").unwrap();
/// ```
pub struct Interpreter {
    ctx: ShellContext,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(ctx: ShellContext, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { ctx, commands }
    }

    /// Create an interpreter over `ctx` with the default set of commands:
    /// - built-ins: `cd`, `path`
    /// - external command launcher
    pub fn with_context(ctx: ShellContext) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(
            ctx,
            vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<PathCmd>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    /// Run one raw line. Lines containing `&` go to [`Interpreter::run_parallel`],
    /// everything else to [`Interpreter::execute`].
    pub fn execute_line(&mut self, line: &str) -> Result<(), ShellError> {
        if line.contains(PARALLEL_MARKER) {
            self.run_parallel(line)
        } else {
            self.execute(line)
        }
    }

    /// Execute exactly one command, which must not contain `&`.
    ///
    /// Redirection is checked first and always runs an external program, then
    /// built-ins, then ordinary external commands.
    pub fn execute(&mut self, line: &str) -> Result<(), ShellError> {
        let invocation = parser::parse_invocation(lexer::tokenize(line))?;
        match &invocation.redirect {
            Some(target) => {
                // Failures past validation only abandon this command.
                if let Err(e) = external::run_redirected(&invocation.argv, target, &mut self.ctx)
                {
                    error::report(&e);
                }
                Ok(())
            }
            None => self.run_plain(&invocation),
        }
    }

    fn run_plain(&mut self, invocation: &Invocation) -> Result<(), ShellError> {
        let name = invocation.name();
        let args: Vec<&str> = invocation.args().iter().map(String::as_str).collect();
        let cmd = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.ctx, name, &args))
            .ok_or_else(|| ShellError::CommandNotFound(name.to_string()))?;

        let code = cmd.execute(Box::new(std::io::stdout()), &mut self.ctx)?;
        if code != 0 && !external::is_lenient(name) {
            return Err(ShellError::NonZeroExit {
                command: name.to_string(),
                code,
            });
        }
        Ok(())
    }

    /// Run every `&`-separated command of `line` concurrently and wait for all
    /// of them.
    ///
    /// Each branch gets its own worker and its own copy of the context, so a
    /// `cd` or `path` inside a branch never affects this interpreter. A failing
    /// branch reports the uniform error and ends; the others are unaffected.
    pub fn run_parallel(&self, line: &str) -> Result<(), ShellError> {
        let commands = lexer::split_on(line, PARALLEL_MARKER);
        tracing::debug!(count = commands.len(), "starting parallel batch");

        thread::scope(|scope| {
            let mut workers = Vec::with_capacity(commands.len());
            for (i, command) in commands.iter().enumerate() {
                let snapshot = self.ctx.clone();
                let worker = thread::Builder::new()
                    .name(format!("parallel-{i}"))
                    .spawn_scoped(scope, move || {
                        let mut sh = Interpreter::with_context(snapshot);
                        if let Err(e) = sh.execute(command) {
                            error::report(&e);
                        }
                    })
                    .map_err(ShellError::Worker)?;
                workers.push(worker);
            }

            for worker in workers {
                if worker.join().is_err() {
                    tracing::warn!("parallel worker panicked");
                }
            }
            tracing::debug!("parallel batch finished");
            Ok(())
        })
    }

    /// Handle one line as read by either loop: trim it, skip blank and
    /// `&`-only lines, stop on `exit`, run anything else.
    pub fn handle_input_line(&mut self, raw: &str) -> Result<Flow, ShellError> {
        let line = raw.trim();
        if line.is_empty() || line == "&" {
            return Ok(Flow::Continue);
        }
        if line == EXIT_LINE {
            return Ok(Flow::Exit);
        }
        self.execute_line(line)?;
        Ok(Flow::Continue)
    }

    /// Feed every line of `reader` to the interpreter until it ends or `exit`.
    ///
    /// Lines are read as raw bytes; invalid UTF-8 is replaced rather than
    /// ending the script.
    pub fn run_script<R: BufRead>(&mut self, mut reader: R) -> Result<Flow, ShellError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| ShellError::BatchFile {
                    path: "<script>".into(),
                    source,
                })?;
            if read == 0 {
                return Ok(Flow::Continue);
            }
            let line = String::from_utf8_lossy(&buf);
            if self.handle_input_line(&line)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
    }

    /// Run the script at `path` in batch mode.
    pub fn run_batch_file(&mut self, path: &Path) -> Result<Flow, ShellError> {
        let file = File::open(path).map_err(|source| ShellError::BatchFile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(script = %path.display(), "running batch file");
        self.run_script(BufReader::new(file))
    }

    /// Interactive Read-Eval-Print Loop.
    ///
    /// Returns when the user types `exit`, closes input or interrupts. The first
    /// failing command ends the loop with its error.
    pub fn repl(&mut self) -> Result<(), ShellError> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if self.handle_input_line(&line)? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::with_context(ShellContext::new())
    }
}
