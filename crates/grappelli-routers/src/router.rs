//! Compiled routers and dispatch.
//!
//! A [`Router`] owns an ordered list of [`Target`]s, each binding a
//! compiled pattern to either an endpoint or a nested router. Routers are
//! immutable once constructed, so a compiled tree can be shared across
//! request-handling threads without synchronization.
//!
//! Dispatch walks the targets in declaration order; the first rule whose
//! pattern matches wins. A nested router that matches its prefix but has
//! no matching inner rule does not end the search — later rules of the
//! outer router still get their chance.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use grappelli_routers::pattern::ExactClass;
//! use grappelli_routers::{Endpoint, Router};
//!
//! struct Health;
//!
//! impl Endpoint for Health {
//!     fn name(&self) -> &str {
//!         "health"
//!     }
//! }
//!
//! let router = Router::builder(Arc::new(ExactClass))
//!     .route("/ping", Arc::new(Health))
//!     .build()
//!     .unwrap();
//!
//! let m = router.dispatch("/ping").unwrap();
//! assert_eq!(m.endpoint.name(), "health");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use grappelli_urlfile::ExtraData;

use crate::endpoints::EndpointRef;
use crate::error::{ConfigError, DispatchError};
use crate::pattern::{PatternMatcher, RouterClass};
use crate::reverse::{ReverseMap, Signature};

/// The result of a successful dispatch: the endpoint to invoke plus the
/// positional and keyword arguments captured along the way.
#[derive(Clone)]
pub struct Match {
	pub endpoint: EndpointRef,
	pub args: Vec<String>,
	pub kwargs: HashMap<String, String>,
	/// Extra data of the matched rule (renderer hint, literal payload).
	pub extra: Option<ExtraData>,
}

impl std::fmt::Debug for Match {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Match")
			.field("endpoint", &self.endpoint.name())
			.field("args", &self.args)
			.field("kwargs", &self.kwargs)
			.field("extra", &self.extra)
			.finish()
	}
}

/// What a target forwards to.
pub enum TargetKind {
	Endpoint(EndpointRef),
	Nested(Arc<Router>),
}

/// One compiled rule: a pattern guarding an endpoint or a nested router.
pub struct Target {
	pattern: String,
	matcher: Arc<dyn PatternMatcher>,
	kind: TargetKind,
	extra: Option<ExtraData>,
}

impl Target {
	pub(crate) fn new(
		pattern: impl Into<String>,
		matcher: Arc<dyn PatternMatcher>,
		kind: TargetKind,
		extra: Option<ExtraData>,
	) -> Self {
		Self {
			pattern: pattern.into(),
			matcher,
			kind,
			extra,
		}
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn extra(&self) -> Option<&ExtraData> {
		self.extra.as_ref()
	}

	pub fn kind(&self) -> &TargetKind {
		&self.kind
	}
}

/// A compiled, immutable routing node.
pub struct Router {
	name: Option<String>,
	scope: String,
	host: Option<String>,
	class_name: String,
	targets: Vec<Target>,
}

impl Router {
	pub(crate) fn from_parts(
		name: Option<String>,
		scope: String,
		host: Option<String>,
		class_name: String,
		targets: Vec<Target>,
	) -> Self {
		Self {
			name,
			scope,
			host,
			class_name,
			targets,
		}
	}

	/// Starts a hand-built router, bypassing the URLfile pipeline. Useful
	/// for adapters that supply their own endpoint handles.
	pub fn builder(class: Arc<dyn RouterClass>) -> RouterBuilder {
		RouterBuilder::new(class)
	}

	/// The registry name; only top-level routers carry one.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// The reverse-lookup namespace of this node's endpoints.
	pub fn scope(&self) -> &str {
		&self.scope
	}

	/// Host constraint, when one was configured.
	pub fn host(&self) -> Option<&str> {
		self.host.as_deref()
	}

	/// Name of the router class that compiled this node's patterns.
	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	pub fn targets(&self) -> &[Target] {
		&self.targets
	}

	pub fn route_count(&self) -> usize {
		self.targets.len()
	}

	/// Resolves a query to an endpoint with its captured arguments.
	///
	/// # Errors
	///
	/// Returns [`DispatchError::NowhereToDispatch`] when no rule matches.
	pub fn dispatch(&self, query: &str) -> Result<Match, DispatchError> {
		for target in &self.targets {
			match &target.kind {
				TargetKind::Endpoint(endpoint) => {
					if let Some(m) = target.matcher.match_full(query) {
						return Ok(Match {
							endpoint: Arc::clone(endpoint),
							args: m.args,
							kwargs: m.kwargs,
							extra: target.extra.clone(),
						});
					}
				}
				TargetKind::Nested(router) => {
					if let Some((m, rest)) = target.matcher.match_prefix(query) {
						if let Ok(inner) = router.dispatch(rest) {
							let mut args = m.args;
							args.extend(inner.args);
							let mut kwargs = m.kwargs;
							kwargs.extend(inner.kwargs);
							return Ok(Match {
								endpoint: inner.endpoint,
								args,
								kwargs,
								extra: inner.extra,
							});
						}
					}
				}
			}
		}
		Err(DispatchError::NowhereToDispatch {
			query: query.to_string(),
		})
	}

	/// Like [`dispatch`], but a router carrying a host constraint only
	/// answers for its own host.
	///
	/// [`dispatch`]: Router::dispatch
	pub fn dispatch_for_host(&self, query: &str, host: &str) -> Result<Match, DispatchError> {
		match &self.host {
			Some(required) if required != host => Err(DispatchError::NowhereToDispatch {
				query: query.to_string(),
			}),
			_ => self.dispatch(query),
		}
	}

	/// Builds the scope → endpoint-name → signature table for reverse
	/// resolution. Nested patterns are concatenated onto their parents'.
	pub fn reverse_map(&self) -> ReverseMap {
		let mut map = ReverseMap::new();
		self.collect_reverse_entries("", &mut map);
		map
	}

	fn collect_reverse_entries(&self, prefix: &str, map: &mut ReverseMap) {
		for target in &self.targets {
			let full_pattern = format!("{}{}", prefix, target.pattern);
			match &target.kind {
				TargetKind::Endpoint(endpoint) => {
					map.entry(self.scope.clone())
						.or_default()
						.insert(endpoint.name().to_string(), Signature::new(full_pattern));
				}
				TargetKind::Nested(router) => {
					router.collect_reverse_entries(&full_pattern, map);
				}
			}
		}
	}
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("name", &self.name)
			.field("scope", &self.scope)
			.field("host", &self.host)
			.field("class", &self.class_name)
			.field("targets", &self.targets.len())
			.finish()
	}
}

/// Builder for hand-constructed routers.
///
/// Patterns are compiled by the selected router class when [`build`] runs,
/// so configuration reads as a plain method chain and all failures
/// surface in one place.
///
/// [`build`]: RouterBuilder::build
pub struct RouterBuilder {
	class: Arc<dyn RouterClass>,
	name: Option<String>,
	scope: String,
	host: Option<String>,
	entries: Vec<BuilderEntry>,
}

enum BuilderEntry {
	Route {
		pattern: String,
		endpoint: EndpointRef,
		extra: Option<ExtraData>,
	},
	Mount {
		pattern: String,
		router: Router,
	},
}

impl RouterBuilder {
	pub fn new(class: Arc<dyn RouterClass>) -> Self {
		Self {
			class,
			name: None,
			scope: String::new(),
			host: None,
			entries: Vec::new(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();
		self
	}

	pub fn with_host(mut self, host: impl Into<String>) -> Self {
		self.host = Some(host.into());
		self
	}

	/// Adds a terminal rule binding a pattern to an endpoint handle.
	pub fn route(mut self, pattern: impl Into<String>, endpoint: EndpointRef) -> Self {
		self.entries.push(BuilderEntry::Route {
			pattern: pattern.into(),
			endpoint,
			extra: None,
		});
		self
	}

	/// Adds a terminal rule carrying extra data.
	pub fn route_with_extra(
		mut self,
		pattern: impl Into<String>,
		endpoint: EndpointRef,
		extra: ExtraData,
	) -> Self {
		self.entries.push(BuilderEntry::Route {
			pattern: pattern.into(),
			endpoint,
			extra: Some(extra),
		});
		self
	}

	/// Mounts a nested router under a pattern prefix.
	pub fn mount(mut self, pattern: impl Into<String>, router: Router) -> Self {
		self.entries.push(BuilderEntry::Mount {
			pattern: pattern.into(),
			router,
		});
		self
	}

	/// Compiles every pattern and produces the immutable router.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::BadPattern`] if any pattern fails to compile.
	pub fn build(self) -> Result<Router, ConfigError> {
		let class_name = self.class.name().to_string();
		let mut targets = Vec::with_capacity(self.entries.len());
		for entry in self.entries {
			let target = match entry {
				BuilderEntry::Route {
					pattern,
					endpoint,
					extra,
				} => {
					let matcher = self.class.compile(&pattern)?;
					Target::new(pattern, matcher, TargetKind::Endpoint(endpoint), extra)
				}
				BuilderEntry::Mount { pattern, router } => {
					let matcher = self.class.compile(&pattern)?;
					Target::new(
						pattern,
						matcher,
						TargetKind::Nested(Arc::new(router)),
						None,
					)
				}
			};
			targets.push(target);
		}
		Ok(Router::from_parts(
			self.name,
			self.scope,
			self.host,
			class_name,
			targets,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pattern::{ExactClass, RegexClass};

	struct Named(&'static str);

	impl crate::endpoints::Endpoint for Named {
		fn name(&self) -> &str {
			self.0
		}
	}

	fn endpoint(name: &'static str) -> EndpointRef {
		Arc::new(Named(name))
	}

	#[test]
	fn test_dispatch_exact_rule() {
		let router = Router::builder(Arc::new(ExactClass))
			.route("/hello", endpoint("index"))
			.build()
			.unwrap();

		let m = router.dispatch("/hello").unwrap();
		assert_eq!(m.endpoint.name(), "index");
		assert!(m.args.is_empty());
		assert!(m.kwargs.is_empty());
	}

	#[test]
	fn test_dispatch_miss_is_recoverable() {
		let router = Router::builder(Arc::new(ExactClass))
			.route("/hello", endpoint("index"))
			.build()
			.unwrap();

		let err = router.dispatch("/nope").unwrap_err();
		assert!(matches!(
			err,
			DispatchError::NowhereToDispatch { query } if query == "/nope",
		));
	}

	#[test]
	fn test_dispatch_forwards_into_nested_router() {
		let inner = Router::builder(Arc::new(ExactClass))
			.route("/ping", endpoint("health"))
			.build()
			.unwrap();
		let router = Router::builder(Arc::new(ExactClass))
			.mount("/api", inner)
			.build()
			.unwrap();

		let m = router.dispatch("/api/ping").unwrap();
		assert_eq!(m.endpoint.name(), "health");
	}

	#[test]
	fn test_first_matching_rule_wins() {
		let router = Router::builder(Arc::new(ExactClass))
			.route("/x", endpoint("first"))
			.route("/x", endpoint("second"))
			.build()
			.unwrap();

		assert_eq!(router.dispatch("/x").unwrap().endpoint.name(), "first");
	}

	#[test]
	fn test_nested_miss_falls_through_to_later_rules() {
		let inner = Router::builder(Arc::new(ExactClass))
			.route("/only-this", endpoint("inner"))
			.build()
			.unwrap();
		let router = Router::builder(Arc::new(ExactClass))
			.mount("/api", inner)
			.route("/api/ping", endpoint("fallback"))
			.build()
			.unwrap();

		assert_eq!(
			router.dispatch("/api/ping").unwrap().endpoint.name(),
			"fallback",
		);
	}

	#[test]
	fn test_nested_captures_merge_outer_first() {
		let inner = Router::builder(Arc::new(ExactClass))
			.route("/posts/{post}", endpoint("post_detail"))
			.build()
			.unwrap();
		let router = Router::builder(Arc::new(ExactClass))
			.mount("/users/{user}", inner)
			.build()
			.unwrap();

		let m = router.dispatch("/users/7/posts/9").unwrap();
		assert_eq!(m.kwargs.get("user"), Some(&"7".to_string()));
		assert_eq!(m.kwargs.get("post"), Some(&"9".to_string()));
	}

	#[test]
	fn test_regex_class_positional_args() {
		let router = Router::builder(Arc::new(RegexClass))
			.route(r"/item/(\d+)", endpoint("item"))
			.build()
			.unwrap();

		let m = router.dispatch("/item/42").unwrap();
		assert_eq!(m.args, vec!["42".to_string()]);
	}

	#[test]
	fn test_dispatch_for_host() {
		let router = Router::builder(Arc::new(ExactClass))
			.with_host("admin.example.com")
			.route("/x", endpoint("admin"))
			.build()
			.unwrap();

		assert!(router.dispatch_for_host("/x", "admin.example.com").is_ok());
		assert!(router.dispatch_for_host("/x", "www.example.com").is_err());
		// Plain dispatch ignores host rules.
		assert!(router.dispatch("/x").is_ok());
	}

	#[test]
	fn test_match_carries_rule_extra() {
		let mut extra = ExtraData::new();
		extra.insert(
			"render_in".to_string(),
			serde_json::Value::String("json".into()),
		);
		let router = Router::builder(Arc::new(ExactClass))
			.route_with_extra("/x", endpoint("ep"), extra)
			.build()
			.unwrap();

		let m = router.dispatch("/x").unwrap();
		assert_eq!(
			m.extra.unwrap().get("render_in"),
			Some(&serde_json::Value::String("json".into())),
		);
	}

	#[test]
	fn test_reverse_map_concatenates_nested_patterns() {
		let inner = Router::builder(Arc::new(ExactClass))
			.route("/ping", endpoint("health"))
			.build()
			.unwrap();
		let router = Router::builder(Arc::new(ExactClass))
			.mount("/api", inner)
			.route("/hello", endpoint("index"))
			.build()
			.unwrap();

		let map = router.reverse_map();
		let scope = map.get("").unwrap();
		assert_eq!(scope.get("health").unwrap().pattern, "/api/ping");
		assert_eq!(scope.get("index").unwrap().pattern, "/hello");
	}

	#[test]
	fn test_reverse_map_respects_nested_scope() {
		let inner = Router::builder(Arc::new(ExactClass))
			.with_scope("api")
			.route("/ping", endpoint("health"))
			.build()
			.unwrap();
		let router = Router::builder(Arc::new(ExactClass))
			.mount("/api", inner)
			.build()
			.unwrap();

		let map = router.reverse_map();
		assert!(map.get("").is_none());
		assert!(map.get("api").unwrap().contains_key("health"));
	}
}
