//! Lexical analysis of raw command lines.
//!
//! Two pure functions live here: [`tokenize`] turns one command into a token
//! sequence, and [`split_on`] cuts a line into sub-commands around a single
//! delimiter character.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Character that introduces output redirection.
pub const REDIRECT_MARKER: char = '>';

/// Character that separates commands meant to run concurrently.
pub const PARALLEL_MARKER: char = '&';

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n]+").expect("whitespace pattern is valid"));

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A non-empty run of text: a command name, an argument or a file name.
    Word(String),
    /// Output redirection symbol, `>`.
    RedirectOut,
}

impl Token {
    fn from_piece(piece: &str) -> Self {
        if piece.len() == 1 && piece.starts_with(REDIRECT_MARKER) {
            Token::RedirectOut
        } else {
            Token::Word(piece.to_string())
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::RedirectOut => write!(f, "{REDIRECT_MARKER}"),
        }
    }
}

/// Split a raw line into tokens.
///
/// The line is first cut on runs of whitespace (space, tab, carriage return,
/// newline). A fragment longer than one character that contains `>` is then cut
/// again at its first `>`, yielding the text before it (if any), the marker and
/// the text after it (if any). Only the first marker of a fragment is split off,
/// so `a>b>c` becomes `a`, `>`, `b>c`.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut out = Vec::new();
    for fragment in WHITESPACE.split(line).filter(|f| !f.is_empty()) {
        match fragment.split_once(REDIRECT_MARKER) {
            Some((before, after)) if fragment.len() > 1 => {
                if !before.is_empty() {
                    out.push(Token::from_piece(before));
                }
                out.push(Token::RedirectOut);
                if !after.is_empty() {
                    out.push(Token::from_piece(after));
                }
            }
            _ => out.push(Token::from_piece(fragment)),
        }
    }
    tracing::trace!(line, tokens = out.len(), "tokenized");
    out
}

/// Split `line` on every `delimiter`, trimming spaces and tabs from each piece
/// and dropping pieces that end up empty.
///
/// A leading, trailing or doubled delimiter therefore contributes nothing.
pub fn split_on(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter)
        .map(|piece| piece.trim_matches(|c| c == ' ' || c == '\t'))
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
