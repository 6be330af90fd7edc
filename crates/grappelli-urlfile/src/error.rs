//! Error types for URLfile lexing and parsing.

use thiserror::Error;

use crate::token::TokenKind;

/// Errors raised while tokenizing URLfile source text.
#[derive(Debug, Error)]
pub enum LexError {
	/// A line dedented to a width that matches no enclosing indentation level.
	#[error("inconsistent indentation at line {line}: width {width} matches no open block")]
	BadIndentation { line: usize, width: usize },

	/// No lexer rule matched at the current position.
	#[error("unlexable input at line {line}, column {column}")]
	NoMatch { line: usize, column: usize },
}

/// Errors raised while building the parse tree from the token stream.
#[derive(Debug, Error)]
pub enum ParseError {
	/// Tokenization failed before parsing could start.
	#[error(transparent)]
	Lex(#[from] LexError),

	/// A token did not fit the expected production.
	#[error(
		"unexpected {kind} token '{text}' at line {line}, column {column}: expected {expected}"
	)]
	UnexpectedToken {
		expected: &'static str,
		kind: TokenKind,
		text: String,
		line: usize,
		column: usize,
	},

	/// The token stream ended before the production was complete.
	#[error("unexpected end of input: expected {expected}")]
	UnexpectedEnd { expected: &'static str },

	/// An extras literal was not valid JSON.
	#[error("invalid extras literal at line {line}, column {column}: {source}")]
	BadExtras {
		line: usize,
		column: usize,
		#[source]
		source: serde_json::Error,
	},

	/// An extras literal decoded to something other than a JSON object.
	#[error("extras literal at line {line}, column {column} must be a JSON object")]
	ExtrasNotObject { line: usize, column: usize },
}
