//! Router classes and compiled pattern matchers.
//!
//! A router class defines the matching semantics of every pattern in the
//! node that selected it. The two built-in classes are:
//!
//! - [`ExactClass`] (`exact`): literal matching, with `{name}` placeholders
//!   capturing one path segment each. `/users/{id}` matches `/users/42`
//!   and yields the keyword argument `id = 42`.
//! - [`RegexClass`] (`regex`): the pattern is a raw regular expression.
//!   Named groups become keyword arguments, unnamed groups positional
//!   arguments.
//!
//! Patterns are compiled once at router-construction time into
//! [`PatternMatcher`] objects; dispatch only runs the compiled form.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;

/// Captures produced by a successful pattern match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternMatch {
	/// Positional captures, in pattern order.
	pub args: Vec<String>,
	/// Named captures.
	pub kwargs: HashMap<String, String>,
}

/// A compiled pattern, ready to match queries.
pub trait PatternMatcher: Send + Sync {
	/// Matches the entire query, or nothing.
	fn match_full(&self, query: &str) -> Option<PatternMatch>;

	/// Matches a leading portion of the query, returning the captures and
	/// the unconsumed remainder. Used when the pattern guards a nested
	/// router.
	fn match_prefix<'q>(&self, query: &'q str) -> Option<(PatternMatch, &'q str)>;

	/// The source pattern this matcher was compiled from.
	fn pattern(&self) -> &str;
}

/// Matching strategy selected per node by a bare class-name attribute.
pub trait RouterClass: Send + Sync {
	/// The name this class is registered and selected under.
	fn name(&self) -> &str;

	/// Compiles one pattern into its matcher.
	fn compile(&self, pattern: &str) -> Result<Arc<dyn PatternMatcher>, ConfigError>;
}

/// Literal matching with `{name}` segment placeholders.
pub struct ExactClass;

impl RouterClass for ExactClass {
	fn name(&self) -> &str {
		"exact"
	}

	fn compile(&self, pattern: &str) -> Result<Arc<dyn PatternMatcher>, ConfigError> {
		Ok(Arc::new(TemplateMatcher::new(pattern)?))
	}
}

/// Raw regular-expression matching.
pub struct RegexClass;

impl RouterClass for RegexClass {
	fn name(&self) -> &str {
		"regex"
	}

	fn compile(&self, pattern: &str) -> Result<Arc<dyn PatternMatcher>, ConfigError> {
		Ok(Arc::new(RegexMatcher::new(pattern)?))
	}
}

/// Compiled form of an `exact` pattern.
///
/// Placeholder-free patterns short-circuit to plain string comparison;
/// parameterized patterns compile to an anchored regex where each
/// `{name}` becomes a named group matching one path segment.
pub struct TemplateMatcher {
	pattern: String,
	/// None for placeholder-free patterns.
	regex: Option<CompiledTemplate>,
}

struct CompiledTemplate {
	full: regex::Regex,
	prefix: regex::Regex,
	param_names: Vec<String>,
}

impl TemplateMatcher {
	pub fn new(pattern: &str) -> Result<Self, ConfigError> {
		if !pattern.contains('{') {
			return Ok(Self {
				pattern: pattern.to_string(),
				regex: None,
			});
		}
		let (body, param_names) = template_to_regex(pattern);
		let full = build_regex(&format!("^{}$", body), pattern)?;
		let prefix = build_regex(&format!("^{}", body), pattern)?;
		Ok(Self {
			pattern: pattern.to_string(),
			regex: Some(CompiledTemplate {
				full,
				prefix,
				param_names,
			}),
		})
	}

	fn kwargs(template: &CompiledTemplate, caps: &regex::Captures<'_>) -> PatternMatch {
		let kwargs = template
			.param_names
			.iter()
			.filter_map(|name| {
				caps.name(name)
					.map(|m| (name.clone(), m.as_str().to_string()))
			})
			.collect();
		PatternMatch {
			args: Vec::new(),
			kwargs,
		}
	}
}

impl PatternMatcher for TemplateMatcher {
	fn match_full(&self, query: &str) -> Option<PatternMatch> {
		match &self.regex {
			None => (query == self.pattern).then(PatternMatch::default),
			Some(template) => template
				.full
				.captures(query)
				.map(|caps| Self::kwargs(template, &caps)),
		}
	}

	fn match_prefix<'q>(&self, query: &'q str) -> Option<(PatternMatch, &'q str)> {
		match &self.regex {
			None => query
				.strip_prefix(self.pattern.as_str())
				.map(|rest| (PatternMatch::default(), rest)),
			Some(template) => template.prefix.captures(query).map(|caps| {
				let end = caps.get(0).expect("group 0 always present").end();
				(Self::kwargs(template, &caps), &query[end..])
			}),
		}
	}

	fn pattern(&self) -> &str {
		&self.pattern
	}
}

/// Compiled form of a `regex` pattern.
#[derive(Debug)]
pub struct RegexMatcher {
	pattern: String,
	full: regex::Regex,
	prefix: regex::Regex,
}

impl RegexMatcher {
	pub fn new(pattern: &str) -> Result<Self, ConfigError> {
		let full = build_regex(&format!("^(?:{})$", pattern), pattern)?;
		let prefix = build_regex(&format!("^(?:{})", pattern), pattern)?;
		Ok(Self {
			pattern: pattern.to_string(),
			full,
			prefix,
		})
	}

	fn captures(regex: &regex::Regex, caps: &regex::Captures<'_>) -> PatternMatch {
		let mut result = PatternMatch::default();
		for (index, name) in regex.capture_names().enumerate() {
			if index == 0 {
				continue;
			}
			match name {
				Some(name) => {
					if let Some(m) = caps.name(name) {
						result.kwargs.insert(name.to_string(), m.as_str().to_string());
					}
				}
				None => {
					if let Some(m) = caps.get(index) {
						result.args.push(m.as_str().to_string());
					}
				}
			}
		}
		result
	}
}

impl PatternMatcher for RegexMatcher {
	fn match_full(&self, query: &str) -> Option<PatternMatch> {
		self.full
			.captures(query)
			.map(|caps| Self::captures(&self.full, &caps))
	}

	fn match_prefix<'q>(&self, query: &'q str) -> Option<(PatternMatch, &'q str)> {
		self.prefix.captures(query).map(|caps| {
			let end = caps.get(0).expect("group 0 always present").end();
			(Self::captures(&self.prefix, &caps), &query[end..])
		})
	}

	fn pattern(&self) -> &str {
		&self.pattern
	}
}

/// Translates a `{name}` template into a regex body plus its parameter
/// names. Literal text is escaped; each placeholder captures one path
/// segment.
fn template_to_regex(pattern: &str) -> (String, Vec<String>) {
	let mut body = String::new();
	let mut param_names = Vec::new();
	let mut chars = pattern.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'{' => {
				let mut name = String::new();
				while let Some(&next) = chars.peek() {
					if next == '}' {
						chars.next();
						break;
					}
					name.push(chars.next().expect("peeked"));
				}
				body.push_str(&format!("(?P<{}>[^/]+)", name));
				param_names.push(name);
			}
			'/' | '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '^' | '$' | '|' | '\\' => {
				body.push('\\');
				body.push(c);
			}
			_ => body.push(c),
		}
	}

	(body, param_names)
}

fn build_regex(source: &str, pattern: &str) -> Result<regex::Regex, ConfigError> {
	regex::Regex::new(source).map_err(|source| ConfigError::BadPattern {
		pattern: pattern.to_string(),
		source,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exact_literal_full_match() {
		let matcher = TemplateMatcher::new("/hello").unwrap();
		assert!(matcher.match_full("/hello").is_some());
		assert!(matcher.match_full("/hello/").is_none());
		assert!(matcher.match_full("/helloo").is_none());
	}

	#[test]
	fn test_exact_literal_prefix_match() {
		let matcher = TemplateMatcher::new("/api").unwrap();
		let (m, rest) = matcher.match_prefix("/api/ping").unwrap();
		assert!(m.kwargs.is_empty());
		assert_eq!(rest, "/ping");
		assert!(matcher.match_prefix("/other").is_none());
	}

	#[test]
	fn test_exact_placeholder_captures_segment() {
		let matcher = TemplateMatcher::new("/users/{id}").unwrap();
		let m = matcher.match_full("/users/42").unwrap();
		assert_eq!(m.kwargs.get("id"), Some(&"42".to_string()));
		assert!(matcher.match_full("/users/42/posts").is_none());
	}

	#[test]
	fn test_exact_placeholder_excludes_separator() {
		let matcher = TemplateMatcher::new("/users/{id}").unwrap();
		assert!(matcher.match_full("/users/4/2").is_none());
	}

	#[test]
	fn test_exact_multiple_placeholders() {
		let matcher = TemplateMatcher::new("/u/{uid}/p/{pid}").unwrap();
		let m = matcher.match_full("/u/1/p/2").unwrap();
		assert_eq!(m.kwargs.get("uid"), Some(&"1".to_string()));
		assert_eq!(m.kwargs.get("pid"), Some(&"2".to_string()));
	}

	#[test]
	fn test_exact_placeholder_prefix_leaves_remainder() {
		let matcher = TemplateMatcher::new("/users/{id}").unwrap();
		let (m, rest) = matcher.match_prefix("/users/42/posts").unwrap();
		assert_eq!(m.kwargs.get("id"), Some(&"42".to_string()));
		assert_eq!(rest, "/posts");
	}

	#[test]
	fn test_exact_escapes_regex_metacharacters() {
		let matcher = TemplateMatcher::new("/v1.0").unwrap();
		assert!(matcher.match_full("/v1.0").is_some());
		// A literal pattern compares byte-for-byte, so the dot is not a
		// wildcard even on the fast path.
		assert!(matcher.match_full("/v1x0").is_none());

		let templated = TemplateMatcher::new("/v1.0/{id}").unwrap();
		assert!(templated.match_full("/v1.0/7").is_some());
		assert!(templated.match_full("/v1x0/7").is_none());
	}

	#[test]
	fn test_regex_named_groups_become_kwargs() {
		let matcher = RegexMatcher::new(r"/item/(?P<id>\d+)").unwrap();
		let m = matcher.match_full("/item/99").unwrap();
		assert_eq!(m.kwargs.get("id"), Some(&"99".to_string()));
		assert!(m.args.is_empty());
		assert!(matcher.match_full("/item/x").is_none());
	}

	#[test]
	fn test_regex_unnamed_groups_become_args() {
		let matcher = RegexMatcher::new(r"/(\d+)/(\d+)").unwrap();
		let m = matcher.match_full("/3/7").unwrap();
		assert_eq!(m.args, vec!["3".to_string(), "7".to_string()]);
	}

	#[test]
	fn test_regex_prefix_remainder() {
		let matcher = RegexMatcher::new(r"/v(\d+)").unwrap();
		let (m, rest) = matcher.match_prefix("/v2/users").unwrap();
		assert_eq!(m.args, vec!["2".to_string()]);
		assert_eq!(rest, "/users");
	}

	#[test]
	fn test_invalid_regex_is_a_config_error() {
		let err = RegexMatcher::new("(unclosed").unwrap_err();
		assert!(matches!(err, ConfigError::BadPattern { .. }));
	}

	#[test]
	fn test_class_names() {
		assert_eq!(ExactClass.name(), "exact");
		assert_eq!(RegexClass.name(), "regex");
	}
}
