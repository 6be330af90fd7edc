//! # Grappelli URLfile
//!
//! Lexer and parser for the URLfile routing configuration language: an
//! indentation-sensitive, hierarchical format declaring how request paths
//! map to endpoints, nested routers, renderers and per-rule attributes.
//!
//! A URLfile looks like this:
//!
//! ```text
//! --exact
//! --renderer=json
//! /hello index
//! /api:
//!     /ping health
//!     /users/{id} user_detail
//! ```
//!
//! Lines starting with `--` declare node attributes (a bare router-class
//! name or a `key=value` pair). A rule line maps a pattern to an endpoint,
//! optionally followed by a renderer name and a quoted JSON extras literal.
//! A pattern followed by `:` introduces an indented nested definition.
//!
//! This crate turns source text into a [`RouteDef`] parse tree; compiling
//! the tree into a dispatchable router lives in `grappelli-routers`.
//!
//! # Examples
//!
//! ```
//! use grappelli_urlfile::{parse_str, TargetDef};
//!
//! let tree = parse_str("--exact\n/hello index\n").unwrap();
//! assert_eq!(tree.attributes, vec!["exact"]);
//! assert!(matches!(&tree.targets[0], TargetDef::Simple { endpoint, .. } if endpoint == "index"));
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod tree;

pub use error::{LexError, ParseError};
pub use lexer::lex;
pub use parser::parse;
pub use token::{Token, TokenKind, TokenStream};
pub use tree::{ExtraData, RouteDef, TargetDef};

/// Lexes and parses URLfile source text in one step.
///
/// # Errors
///
/// Returns a [`ParseError`] on any lexing or parsing failure; lex errors
/// are wrapped via [`ParseError::Lex`].
pub fn parse_str(source: &str) -> Result<RouteDef, ParseError> {
	let mut stream = lex(source)?;
	parse(&mut stream)
}
