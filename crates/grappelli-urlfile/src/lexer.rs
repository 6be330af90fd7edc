//! Tokenizer for the URLfile routing configuration language.
//!
//! The lexer scans the source left to right, trying a fixed sequence of
//! rules at each position: attribute, newline, whitespace, colon, literal,
//! end-of-input. Whichever rule matches first produces the next token.
//!
//! # Indentation
//!
//! Block structure is expressed by indentation, tracked the same way
//! Python's tokenizer does it: the lexer keeps a stack of indentation
//! widths and synthesizes [`Indent`]/[`Dedent`] tokens as the leading
//! whitespace of a line grows or shrinks. Tabs advance the column to the
//! next multiple of 8; every other character counts one column. Dedenting
//! to a width that was never pushed is a hard error — the file is
//! malformed and no token stream is produced.
//!
//! The whitespace rule is the only rule allowed to match zero characters.
//! A zero-width whitespace match at the start of a line is what carries
//! dedents back to column 0, and a "previous match was empty" flag keeps
//! the rule from matching the same empty span twice in a row, so the scan
//! loop always makes progress.
//!
//! [`Indent`]: crate::token::TokenKind::Indent
//! [`Dedent`]: crate::token::TokenKind::Dedent

use crate::error::LexError;
use crate::token::{Token, TokenKind, TokenStream};

/// Tab stops fall every 8 columns, matching the historical terminal width.
const TAB_WIDTH: usize = 8;

/// Tokenizes URLfile source text.
///
/// # Examples
///
/// ```
/// use grappelli_urlfile::{lex, TokenKind};
///
/// let stream = lex("--exact\n/hello index\n").unwrap();
/// let kinds: Vec<TokenKind> = stream.tokens().iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Attrib,
///         TokenKind::Newline,
///         TokenKind::Literal,
///         TokenKind::Literal,
///         TokenKind::Newline,
///         TokenKind::Eof,
///     ],
/// );
/// ```
///
/// # Errors
///
/// Returns [`LexError::BadIndentation`] when a line dedents to a width
/// matching no open block, and [`LexError::NoMatch`] when no rule applies
/// (for example an unterminated quoted literal).
pub fn lex(source: &str) -> Result<TokenStream, LexError> {
	let mut scanner = Scanner::new(source);
	scanner.run()?;
	Ok(TokenStream::new(scanner.tokens))
}

struct Scanner<'a> {
	src: &'a str,
	bytes: &'a [u8],
	pos: usize,
	line: usize,
	/// Byte offset of the first character of the current line.
	line_start: usize,
	/// Open indentation widths; the base level 0 is never popped.
	indents: Vec<usize>,
	/// Set when the previous match was a zero-width whitespace match.
	empty_space: bool,
	tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
	fn new(src: &'a str) -> Self {
		Self {
			src,
			bytes: src.as_bytes(),
			pos: 0,
			line: 1,
			line_start: 0,
			indents: vec![0],
			empty_space: false,
			tokens: Vec::new(),
		}
	}

	fn run(&mut self) -> Result<(), LexError> {
		// The end-of-input rule advances past the formal end, terminating
		// the loop one iteration after it fires.
		while self.pos <= self.src.len() {
			if self.attrib() {
				self.empty_space = false;
				continue;
			}
			if self.newline() {
				self.empty_space = false;
				continue;
			}
			if self.space()? {
				continue;
			}
			if self.colon() {
				self.empty_space = false;
				continue;
			}
			if self.literal() {
				self.empty_space = false;
				continue;
			}
			if self.eof()? {
				continue;
			}
			return Err(LexError::NoMatch {
				line: self.line,
				column: self.column(),
			});
		}
		Ok(())
	}

	fn column(&self) -> usize {
		self.pos - self.line_start + 1
	}

	/// Emits a token whose text is exactly its source span.
	fn emit(&mut self, kind: TokenKind, span: std::ops::Range<usize>) {
		let text = self.src[span.clone()].to_string();
		self.emit_text(kind, text, span);
	}

	fn emit_text(&mut self, kind: TokenKind, text: String, span: std::ops::Range<usize>) {
		let column = span.start - self.line_start + 1;
		self.tokens
			.push(Token::new(kind, text, span, self.line, column));
	}

	fn at_line_start(&self, offset: usize) -> bool {
		offset == 0 || self.bytes[offset - 1] == b'\n'
	}

	/// `--` followed by anything but whitespace; the token runs to the next
	/// whitespace character.
	fn attrib(&mut self) -> bool {
		if !self.src[self.pos..].starts_with("--") {
			return false;
		}
		match self.bytes.get(self.pos + 2) {
			Some(b' ') | Some(b'\t') | Some(b'\n') | None => return false,
			Some(_) => {}
		}
		let start = self.pos;
		let mut end = start + 2;
		while let Some(&b) = self.bytes.get(end) {
			if b == b' ' || b == b'\t' || b == b'\n' {
				break;
			}
			end += 1;
		}
		self.emit(TokenKind::Attrib, start..end);
		self.pos = end;
		true
	}

	/// One or more consecutive newlines collapse into a single token.
	fn newline(&mut self) -> bool {
		let start = self.pos;
		let mut end = start;
		while self.bytes.get(end) == Some(&b'\n') {
			end += 1;
		}
		if end == start {
			return false;
		}
		self.emit(TokenKind::Newline, start..end);
		self.line += end - start;
		self.line_start = end;
		self.pos = end;
		true
	}

	/// Horizontal whitespace, possibly zero characters wide. Indentation
	/// bookkeeping happens here, and only when the match starts at the
	/// beginning of a line.
	fn space(&mut self) -> Result<bool, LexError> {
		let start = self.pos;
		let mut end = start;
		while let Some(&b) = self.bytes.get(end) {
			if b != b' ' && b != b'\t' {
				break;
			}
			end += 1;
		}
		if end == start && self.empty_space {
			// Matched empty here last round; step aside so a lower-priority
			// rule gets a chance and the loop cannot spin.
			self.empty_space = false;
			return Ok(false);
		}
		if self.at_line_start(start) {
			let width = indent_width(&self.src[start..end]);
			self.apply_indentation(width, end)?;
		}
		self.empty_space = end == start;
		self.pos = end;
		Ok(true)
	}

	fn apply_indentation(&mut self, width: usize, at: usize) -> Result<(), LexError> {
		let current = *self.indents.last().expect("indent stack is never empty");
		if width > current {
			self.indents.push(width);
			self.emit_text(TokenKind::Indent, String::new(), at..at);
			return Ok(());
		}
		while *self.indents.last().expect("indent stack is never empty") > width {
			self.indents.pop();
			self.emit_text(TokenKind::Dedent, String::new(), at..at);
		}
		if *self.indents.last().expect("indent stack is never empty") != width {
			return Err(LexError::BadIndentation {
				line: self.line,
				width,
			});
		}
		Ok(())
	}

	/// `:` immediately followed by a newline; the newline stays unconsumed.
	fn colon(&mut self) -> bool {
		if self.bytes.get(self.pos) != Some(&b':') || self.bytes.get(self.pos + 1) != Some(&b'\n')
		{
			return false;
		}
		let start = self.pos;
		self.emit(TokenKind::Colon, start..start + 1);
		self.pos = start + 1;
		true
	}

	/// A quoted string (contents verbatim, quotes stripped) or a bare run
	/// of non-space, non-quote characters. A trailing `:` that would lex
	/// as a block opener is left out of a bare literal.
	fn literal(&mut self) -> bool {
		let Some(&first) = self.bytes.get(self.pos) else {
			return false;
		};
		if first == b'\'' || first == b'"' {
			return self.quoted_literal(first);
		}
		let start = self.pos;
		let mut end = start;
		while let Some(&b) = self.bytes.get(end) {
			if matches!(b, b' ' | b'\t' | b'\n' | b'\'' | b'"') {
				break;
			}
			end += 1;
		}
		if end == start {
			return false;
		}
		if end - start > 1 && self.bytes[end - 1] == b':' && self.bytes.get(end) == Some(&b'\n') {
			end -= 1;
		}
		self.emit(TokenKind::Literal, start..end);
		self.pos = end;
		true
	}

	fn quoted_literal(&mut self, quote: u8) -> bool {
		let start = self.pos;
		let Some(rel) = self.bytes[start + 1..].iter().position(|&b| b == quote) else {
			// Unterminated quote: no rule matches and the scan fails.
			return false;
		};
		let close = start + 1 + rel;
		let contents = self.src[start + 1..close].to_string();
		let newlines = contents.bytes().filter(|&b| b == b'\n').count();
		let last_newline = contents.rfind('\n');
		self.emit_text(TokenKind::Literal, contents, start..close + 1);
		if newlines > 0 {
			self.line += newlines;
			self.line_start = start + 1 + last_newline.expect("counted above") + 1;
		}
		self.pos = close + 1;
		true
	}

	/// End of input behaves like a final whitespace token: when it lands at
	/// the start of a line it closes every open block, and it advances the
	/// position past the formal end so the scan loop terminates.
	fn eof(&mut self) -> Result<bool, LexError> {
		if self.pos < self.src.len() {
			return Ok(false);
		}
		if self.at_line_start(self.pos) {
			self.apply_indentation(0, self.pos)?;
		}
		let at = self.pos;
		self.emit_text(TokenKind::Eof, String::new(), at..at);
		self.pos += 1;
		Ok(true)
	}
}

/// Effective display width of a run of leading whitespace.
fn indent_width(leading: &str) -> usize {
	let mut width = 0;
	for c in leading.chars() {
		if c == '\t' {
			width = (width / TAB_WIDTH + 1) * TAB_WIDTH;
		} else {
			width += 1;
		}
	}
	width
}
