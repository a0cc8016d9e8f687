use crate::error::ShellError;
use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs, Debug, PartialEq, Eq)]
/// A small Unix shell. Without arguments it reads commands interactively,
/// otherwise it runs the given script.
pub struct Args {
    #[argh(positional)]
    /// script to run in batch mode.
    pub script: Option<PathBuf>,
}

impl Args {
    /// Parse the arguments following the program name.
    ///
    /// Anything argh would print help or an error for, including a second
    /// positional argument, becomes [`ShellError::Usage`].
    pub fn parse(program: &str, args: &[&str]) -> Result<Self, ShellError> {
        Args::from_args(&[program], args).map_err(|early| ShellError::Usage(early.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_interactive() {
        assert_eq!(Args::parse("witsh", &[]).unwrap(), Args { script: None });
    }

    #[test]
    fn test_single_argument_is_batch() {
        let args = Args::parse("witsh", &["batch.txt"]).unwrap();
        assert_eq!(args.script, Some(PathBuf::from("batch.txt")));
    }

    #[test]
    fn test_two_arguments_are_rejected() {
        assert!(matches!(
            Args::parse("witsh", &["a.txt", "b.txt"]),
            Err(ShellError::Usage(_))
        ));
    }

    #[test]
    fn test_help_is_not_a_script() {
        assert!(Args::parse("witsh", &["--help"]).is_err());
    }
}
