use crate::error::ShellError;
use crate::lexer::Token;
use std::path::PathBuf;

/// One command ready to run: its argument vector and optional output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command name followed by its arguments. Never empty.
    pub argv: Vec<String>,
    /// File that receives the command's standard output.
    pub redirect: Option<PathBuf>,
}

impl Invocation {
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Turn a token sequence into an [`Invocation`].
///
/// A redirection is only accepted in the form `word+ > word`: exactly one
/// marker, at least one word before it and exactly one word after it.
pub fn parse_invocation(tokens: Vec<Token>) -> Result<Invocation, ShellError> {
    if tokens.is_empty() {
        return Err(ShellError::EmptyCommand);
    }

    let Some(marker) = tokens.iter().position(|t| *t == Token::RedirectOut) else {
        let argv = tokens.into_iter().map(|t| t.to_string()).collect();
        return Ok(Invocation {
            argv,
            redirect: None,
        });
    };

    let mut argv = Vec::with_capacity(marker);
    let mut rest = tokens.into_iter();
    for token in rest.by_ref().take(marker) {
        match token {
            Token::Word(w) => argv.push(w),
            Token::RedirectOut => unreachable!("marker index is the first marker"),
        }
    }
    rest.next(); // the marker itself

    let target = match (rest.next(), rest.next()) {
        (Some(Token::Word(file)), None) => PathBuf::from(file),
        _ => return Err(ShellError::MalformedRedirection),
    };
    if argv.is_empty() {
        return Err(ShellError::MalformedRedirection);
    }

    Ok(Invocation {
        argv,
        redirect: Some(target),
    })
}
