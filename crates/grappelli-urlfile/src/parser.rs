//! Recursive-descent parser for the URLfile token stream.
//!
//! The grammar is small and unambiguous given the lexed tokens:
//!
//! ```text
//! routedef  := attribute* (targetdef NEWLINE?)* EOF?
//! attribute := ATTRIB NEWLINE
//! targetdef := LITERAL LITERAL [LITERAL [LITERAL]]          (simple rule)
//!            | LITERAL [LITERAL] COLON NEWLINE INDENT
//!              routedef DEDENT                              (nested rule)
//! ```
//!
//! In a simple rule the four literals are pattern, endpoint, renderer and
//! extras, consumed positionally. A renderer of `null` suppresses the
//! default renderer; any other value becomes a `render_in` entry in the
//! rule's extra data. Extras are a strict-JSON object literal; when both
//! renderer and extras appear, the extras object is merged over the
//! renderer entry, so extras win on collision.
//!
//! Any token that does not fit the expected production aborts the whole
//! parse with a [`ParseError`] naming the offending token. There is no
//! recovery and no partial tree.

use serde_json::Value;

use crate::error::ParseError;
use crate::token::{Token, TokenKind, TokenStream};
use crate::tree::{ExtraData, RouteDef, TargetDef};

/// Renderer literal that suppresses the default renderer.
const NULL_RENDERER: &str = "null";

/// Extra-data key carrying the renderer hint.
const RENDER_IN: &str = "render_in";

/// Parses a complete routing definition from a token stream.
pub fn parse(stream: &mut TokenStream) -> Result<RouteDef, ParseError> {
	routedef(stream)
}

fn routedef(stream: &mut TokenStream) -> Result<RouteDef, ParseError> {
	let mut attributes = Vec::new();
	while matches!(stream.peek(), Some(t) if t.kind == TokenKind::Attrib) {
		let attrib = stream.next().expect("peeked");
		expect(stream, TokenKind::Newline, "a newline after the attribute")?;
		attributes.push(attrib.text["--".len()..].to_string());
	}

	let mut targets = Vec::new();
	loop {
		let Some(token) = stream.peek() else {
			break;
		};
		match token.kind {
			TokenKind::Eof => {
				stream.next();
				break;
			}
			// Left for the enclosing nested rule to consume.
			TokenKind::Dedent => break,
			TokenKind::Newline => {
				stream.next();
			}
			TokenKind::Literal => targets.push(targetdef(stream)?),
			_ => return Err(unexpected(token, "a routing rule")),
		}
	}
	Ok(RouteDef {
		attributes,
		targets,
	})
}

fn targetdef(stream: &mut TokenStream) -> Result<TargetDef, ParseError> {
	let pattern = expect(stream, TokenKind::Literal, "a URL pattern")?;
	match stream.peek() {
		Some(t) if t.kind == TokenKind::Colon => {
			stream.next();
			let routedef = nested_block(stream)?;
			Ok(TargetDef::Nested {
				pattern: pattern.text,
				routedef,
				extra: None,
			})
		}
		Some(t) if t.kind == TokenKind::Literal => {
			let second = stream.next().expect("peeked");
			if matches!(stream.peek(), Some(t) if t.kind == TokenKind::Colon) {
				// `pattern extras :` opens a nested definition.
				let extra = decode_extras(&second)?;
				stream.next();
				let routedef = nested_block(stream)?;
				Ok(TargetDef::Nested {
					pattern: pattern.text,
					routedef,
					extra: Some(extra),
				})
			} else {
				simple_target(stream, pattern.text, second.text)
			}
		}
		Some(t) => Err(unexpected(t, "an endpoint name or ':'")),
		None => Err(ParseError::UnexpectedEnd {
			expected: "an endpoint name or ':'",
		}),
	}
}

fn simple_target(
	stream: &mut TokenStream,
	pattern: String,
	endpoint: String,
) -> Result<TargetDef, ParseError> {
	let mut extra: Option<ExtraData> = None;
	if matches!(stream.peek(), Some(t) if t.kind == TokenKind::Literal) {
		let renderer = stream.next().expect("peeked");
		let renderer_entry = if renderer.text == NULL_RENDERER {
			None
		} else {
			let mut map = ExtraData::new();
			map.insert(RENDER_IN.to_string(), Value::String(renderer.text));
			Some(map)
		};
		extra = if matches!(stream.peek(), Some(t) if t.kind == TokenKind::Literal) {
			let extras_token = stream.next().expect("peeked");
			let extras = decode_extras(&extras_token)?;
			match renderer_entry {
				Some(mut map) => {
					for (key, value) in extras {
						map.insert(key, value);
					}
					Some(map)
				}
				None => Some(extras),
			}
		} else {
			renderer_entry
		};
	}
	// The rule must end its line here; anything else is a fifth literal or
	// a stray structural token.
	match stream.peek() {
		None => {}
		Some(t) if matches!(t.kind, TokenKind::Newline | TokenKind::Eof) => {}
		Some(t) => return Err(unexpected(t, "the end of the rule line")),
	}
	Ok(TargetDef::Simple {
		pattern,
		endpoint,
		extra,
	})
}

fn nested_block(stream: &mut TokenStream) -> Result<RouteDef, ParseError> {
	expect(stream, TokenKind::Newline, "a newline after ':'")?;
	expect(stream, TokenKind::Indent, "an indented block")?;
	let routedef = routedef(stream)?;
	expect(stream, TokenKind::Dedent, "the end of the indented block")?;
	Ok(routedef)
}

fn decode_extras(token: &Token) -> Result<ExtraData, ParseError> {
	match serde_json::from_str::<Value>(&token.text) {
		Ok(Value::Object(map)) => Ok(map),
		Ok(_) => Err(ParseError::ExtrasNotObject {
			line: token.line,
			column: token.column,
		}),
		Err(source) => Err(ParseError::BadExtras {
			line: token.line,
			column: token.column,
			source,
		}),
	}
}

fn expect(
	stream: &mut TokenStream,
	kind: TokenKind,
	expected: &'static str,
) -> Result<Token, ParseError> {
	match stream.peek() {
		Some(t) if t.kind == kind => Ok(stream.next().expect("peeked")),
		Some(t) => Err(unexpected(t, expected)),
		None => Err(ParseError::UnexpectedEnd { expected }),
	}
}

fn unexpected(token: &Token, expected: &'static str) -> ParseError {
	ParseError::UnexpectedToken {
		expected,
		kind: token.kind,
		text: token.text.clone(),
		line: token.line,
		column: token.column,
	}
}
