//! A statement-level parser for Wavefront's `.obj` file format.
//!
//! The pipeline runs in three batch stages: the [`lex::Lexer`] turns a
//! character stream into tokens, the [`parse::Parser`] turns tokens into
//! statements, and the [`process::Processor`] folds the statements into the
//! list of material libraries the file references. Mesh construction is a
//! consumer of the statement sequence and lives elsewhere.
#![crate_type = "lib"]
#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unreachable_pub)]

pub use crate::lex::{Lexer, PolygonIndices, Token, TokenKind};
pub use crate::parse::{ParseError, Parser, Statement, StatementKind};
pub use crate::process::Processor;

pub mod lex;
pub mod parse;
pub mod process;

use std::fs;
use std::path::Path;

use log::debug;
use thiserror::Error;

/// Failure to import an `.obj` file.
#[derive(Debug, Error)]
pub enum ImportError {
  /// The file could not be opened or read.
  #[error("failed to read wavefront file: {0}")]
  Io(#[from] std::io::Error),
  /// The file's contents violated the statement grammar.
  #[error(transparent)]
  Parse(#[from] ParseError),
}

/// Lexes and parses a whole `.obj` source into its statement sequence.
pub fn parse<S: AsRef<str>>(input: S) -> Result<Vec<Statement>, ParseError> {
  let tokens = Lexer::new(input.as_ref().chars()).lex_tokens();
  debug!("lexed {} tokens", tokens.len());

  let statements = Parser::new().parse_tokens(&tokens)?;
  debug!("parsed {} statements", statements.len());

  Ok(statements)
}

/// Imports an `.obj` file and returns the material library file names it
/// references, in the order they appear.
pub fn import_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ImportError> {
  let contents = fs::read_to_string(path)?;
  let statements = parse(&contents)?;

  let mut processor = Processor::new();
  processor.process_statements(&statements);

  Ok(processor.material_files().to_vec())
}
