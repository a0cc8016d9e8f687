//! A small Unix command shell.
//!
//! Lines are split into tokens, resolved against a replaceable search path and
//! run as child processes. A command may send its standard output to a file
//! with `>`, and several commands separated by `&` run concurrently. Every
//! failure is reported with the same fixed diagnostic.
//!
//! The main entry point is [`Interpreter`], which owns a [`ShellContext`] and
//! executes raw command lines against it. The [`lexer`] module exposes the pure
//! tokenizing functions and [`path_table`] the executable search.

mod builtin;
pub mod cli;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod lexer;
mod parser;
pub mod path_table;

pub use env::ShellContext;
pub use error::ShellError;
/// Re-export of the command-line interpreter.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Flow, Interpreter};
