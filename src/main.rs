use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use witshell::cli::Args;
use witshell::{Flow, Interpreter, error};

/// Environment variable holding the log filter, e.g. `WITSH_LOG=debug`.
const LOG_ENV: &str = "WITSH_LOG";

fn main() -> ExitCode {
    // Logging is off unless asked for, so stderr only ever carries the
    // uniform error line.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("witsh");
    let rest: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();

    let args = Args::parse(program, &rest).unwrap_or_else(|e| error::fatal(&e));
    let mut shell = Interpreter::default();

    let outcome = match &args.script {
        Some(script) => shell.run_batch_file(script).map(|_: Flow| ()),
        None => shell.repl(),
    };
    if let Err(e) = outcome {
        error::fatal(&e);
    }
    ExitCode::SUCCESS
}
