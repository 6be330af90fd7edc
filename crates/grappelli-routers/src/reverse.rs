//! Reverse URL resolution.
//!
//! A [`Reverser`] answers "what URL reaches this endpoint" from a compiled
//! router's reverse map. Endpoint names take the form `scope:name`; a name
//! without a colon lives in the default (empty) scope. Lookups and the
//! scope/name split are memoized per endpoint string — they are invariant
//! for the router's lifetime.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ReverseError;
use crate::router::Router;

/// What it takes to reverse one endpoint: the URL pattern template and the
/// exact set of parameter names it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
	pub pattern: String,
	pub params: HashSet<String>,
}

impl Signature {
	/// Builds a signature from a pattern template, collecting its `{name}`
	/// placeholders as the required parameter set.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_routers::Signature;
	///
	/// let sig = Signature::new("/users/{id}/posts/{post_id}");
	/// assert_eq!(sig.params.len(), 2);
	/// assert!(sig.params.contains("id"));
	/// ```
	pub fn new(pattern: impl Into<String>) -> Self {
		let pattern = pattern.into();
		let params = extract_param_names(&pattern).into_iter().collect();
		Self { pattern, params }
	}
}

/// Scope → endpoint name → signature, as produced by
/// [`Router::reverse_map`].
pub type ReverseMap = HashMap<String, HashMap<String, Signature>>;

/// Extracts `{name}` placeholder names from a pattern template, in order.
pub fn extract_param_names(pattern: &str) -> Vec<String> {
	let mut names = Vec::new();
	let mut chars = pattern.chars();

	while let Some(c) = chars.next() {
		if c == '{' {
			let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
			if !name.is_empty() {
				names.push(name);
			}
		}
	}

	names
}

/// Read-only reverse resolver for one named router.
pub struct Reverser {
	router: String,
	map: ReverseMap,
	/// endpoint string → (scope, name), memoized.
	splits: RwLock<HashMap<String, (String, String)>>,
	/// endpoint string → resolved signature, memoized.
	signatures: RwLock<HashMap<String, Arc<Signature>>>,
}

impl Reverser {
	pub fn new(router: impl Into<String>, map: ReverseMap) -> Self {
		Self {
			router: router.into(),
			map,
			splits: RwLock::new(HashMap::new()),
			signatures: RwLock::new(HashMap::new()),
		}
	}

	/// Builds a reverser from a compiled router's reverse map.
	pub fn for_router(router: &Router) -> Self {
		Self::new(router.name().unwrap_or_default(), router.reverse_map())
	}

	/// The name of the router this reverser answers for.
	pub fn router(&self) -> &str {
		&self.router
	}

	/// Splits `scope:name` on the last colon; no colon means the default
	/// scope.
	fn split(&self, endpoint: &str) -> (String, String) {
		if let Some(split) = self.splits.read().get(endpoint) {
			return split.clone();
		}
		let mut parts = endpoint.rsplitn(2, ':');
		let name = parts.next().expect("rsplitn yields at least one part");
		let scope = parts.next().unwrap_or_default();
		let split = (scope.to_string(), name.to_string());
		self.splits
			.write()
			.insert(endpoint.to_string(), split.clone());
		split
	}

	/// Looks up the pattern template and required parameters of an
	/// endpoint.
	///
	/// # Errors
	///
	/// Returns [`ReverseError::UnknownScope`] or
	/// [`ReverseError::UnknownEndpoint`] when the lookup misses.
	pub fn signature(&self, endpoint: &str) -> Result<Arc<Signature>, ReverseError> {
		if let Some(signature) = self.signatures.read().get(endpoint) {
			return Ok(Arc::clone(signature));
		}
		let (scope, name) = self.split(endpoint);
		let scoped = self
			.map
			.get(&scope)
			.ok_or_else(|| ReverseError::UnknownScope {
				scope: scope.clone(),
			})?;
		let signature = scoped
			.get(&name)
			.ok_or_else(|| ReverseError::UnknownEndpoint {
				scope: scope.clone(),
				name: name.clone(),
			})?;
		let signature = Arc::new(signature.clone());
		self.signatures
			.write()
			.insert(endpoint.to_string(), Arc::clone(&signature));
		Ok(signature)
	}

	/// Reconstructs the URL for an endpoint from its parameters.
	///
	/// The supplied parameter names must equal the required set exactly —
	/// one extra or one missing name fails the call.
	///
	/// # Errors
	///
	/// Returns [`ReverseError::ParameterMismatch`] on any difference
	/// between supplied and required parameter names, besides the lookup
	/// errors of [`signature`].
	///
	/// [`signature`]: Reverser::signature
	pub fn reverse(
		&self,
		endpoint: &str,
		params: &HashMap<String, String>,
	) -> Result<String, ReverseError> {
		let signature = self.signature(endpoint)?;
		let supplied: HashSet<&str> = params.keys().map(String::as_str).collect();
		let expected: HashSet<&str> = signature.params.iter().map(String::as_str).collect();
		if supplied != expected {
			let mut expected: Vec<String> = signature.params.iter().cloned().collect();
			let mut supplied: Vec<String> = params.keys().cloned().collect();
			expected.sort();
			supplied.sort();
			return Err(ReverseError::ParameterMismatch {
				endpoint: endpoint.to_string(),
				expected,
				supplied,
			});
		}
		Ok(substitute(&signature.pattern, params))
	}
}

impl std::fmt::Debug for Reverser {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Reverser")
			.field("router", &self.router)
			.field("scopes", &self.map.len())
			.finish()
	}
}

/// Single-pass `{name}` substitution. Parameter presence is validated
/// before this runs, so every placeholder resolves.
fn substitute(pattern: &str, params: &HashMap<String, String>) -> String {
	let mut result = String::with_capacity(pattern.len());
	let mut chars = pattern.chars();

	while let Some(c) = chars.next() {
		if c == '{' {
			let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
			match params.get(&name) {
				Some(value) => result.push_str(value),
				None => {
					result.push('{');
					result.push_str(&name);
					result.push('}');
				}
			}
		} else {
			result.push(c);
		}
	}

	result
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	fn reverser() -> Reverser {
		let mut map = ReverseMap::new();
		map.entry(String::new())
			.or_default()
			.insert("index".to_string(), Signature::new("/hello"));
		map.entry("api".to_string())
			.or_default()
			.insert("user_detail".to_string(), Signature::new("/users/{id}"));
		map.entry("api".to_string()).or_default().insert(
			"post_detail".to_string(),
			Signature::new("/users/{id}/posts/{post_id}"),
		);
		Reverser::new("main", map)
	}

	#[test]
	fn test_extract_param_names() {
		assert_eq!(extract_param_names("/users/{id}/posts/{post_id}/"), vec![
			"id", "post_id"
		]);
		assert!(extract_param_names("/users/").is_empty());
	}

	#[test]
	fn test_reverse_without_params() {
		let url = reverser().reverse("index", &HashMap::new()).unwrap();
		assert_eq!(url, "/hello");
	}

	#[test]
	fn test_reverse_with_scope_and_params() {
		let url = reverser()
			.reverse("api:user_detail", &params(&[("id", "42")]))
			.unwrap();
		assert_eq!(url, "/users/42");
	}

	#[test]
	fn test_reverse_multiple_params() {
		let url = reverser()
			.reverse(
				"api:post_detail",
				&params(&[("id", "7"), ("post_id", "9")]),
			)
			.unwrap();
		assert_eq!(url, "/users/7/posts/9");
	}

	#[test]
	fn test_missing_param_fails() {
		let err = reverser()
			.reverse("api:post_detail", &params(&[("id", "7")]))
			.unwrap_err();
		assert!(matches!(err, ReverseError::ParameterMismatch { .. }));
	}

	#[test]
	fn test_extra_param_fails() {
		let err = reverser()
			.reverse("api:user_detail", &params(&[("id", "7"), ("stray", "x")]))
			.unwrap_err();
		assert!(matches!(
			err,
			ReverseError::ParameterMismatch { supplied, .. } if supplied.contains(&"stray".to_string()),
		));
	}

	#[test]
	fn test_unknown_scope() {
		let err = reverser().reverse("nope:index", &HashMap::new()).unwrap_err();
		assert!(matches!(
			err,
			ReverseError::UnknownScope { scope } if scope == "nope",
		));
	}

	#[test]
	fn test_unknown_endpoint_in_scope() {
		let err = reverser().reverse("api:nope", &HashMap::new()).unwrap_err();
		assert!(matches!(
			err,
			ReverseError::UnknownEndpoint { scope, name } if scope == "api" && name == "nope",
		));
	}

	#[test]
	fn test_signature_lookup_is_memoized() {
		let reverser = reverser();
		let first = reverser.signature("api:user_detail").unwrap();
		let second = reverser.signature("api:user_detail").unwrap();
		assert!(Arc::ptr_eq(&first, &second));
	}
}
