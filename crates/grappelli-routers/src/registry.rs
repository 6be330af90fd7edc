//! Router-class and compiled-router registries.
//!
//! Both registries are plain owned objects with explicit construction and
//! lifetime: whoever wires up the process creates them once and passes
//! references to the components that need them. Nothing here is
//! module-level global state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ConfigError, ReverseError};
use crate::pattern::{ExactClass, RegexClass, RouterClass};
use crate::reverse::Reverser;
use crate::router::Router;

fn exact_class() -> Arc<dyn RouterClass> {
	Arc::new(ExactClass)
}

fn regex_class() -> Arc<dyn RouterClass> {
	Arc::new(RegexClass)
}

/// Fallback providers consulted when a class name has not been registered.
/// An enumerable table, so the full set of resolvable names is always
/// knowable by reading it.
const CLASS_PROBES: &[(&str, fn() -> Arc<dyn RouterClass>)] =
	&[("exact", exact_class), ("regex", regex_class)];

/// Name → router-class lookup used during compilation.
#[derive(Default)]
pub struct RouterClassRegistry {
	classes: HashMap<String, Arc<dyn RouterClass>>,
}

impl RouterClassRegistry {
	/// An empty registry; class names resolve only through the probe
	/// table.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry preloaded with the built-in `exact` and `regex` classes.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_routers::RouterClassRegistry;
	///
	/// let registry = RouterClassRegistry::with_builtins();
	/// assert_eq!(registry.resolve("exact").unwrap().name(), "exact");
	/// ```
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register(exact_class());
		registry.register(regex_class());
		registry
	}

	/// Registers a class under its own name, replacing any previous entry.
	pub fn register(&mut self, class: Arc<dyn RouterClass>) {
		self.classes.insert(class.name().to_string(), class);
	}

	pub fn get(&self, name: &str) -> Option<Arc<dyn RouterClass>> {
		self.classes.get(name).cloned()
	}

	/// Resolves a class name: registered entries first, then the probe
	/// table.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::UnknownRouterClass`] when the name matches
	/// neither.
	pub fn resolve(&self, name: &str) -> Result<Arc<dyn RouterClass>, ConfigError> {
		if let Some(class) = self.get(name) {
			return Ok(class);
		}
		for (probe, factory) in CLASS_PROBES {
			if *probe == name {
				tracing::debug!(class = name, "router class resolved via probe table");
				return Ok(factory());
			}
		}
		Err(ConfigError::UnknownRouterClass {
			name: name.to_string(),
		})
	}
}

/// Holds named compiled routers and their lazily built reversers.
///
/// Routers compile once at startup and are read-only afterwards, so both
/// tables are read-mostly. Reversers are memoized per router name on
/// first use and never invalidated: replacing a registered router does
/// not refresh an already built reverser, so a reconfiguration requires a
/// fresh registry.
#[derive(Default)]
pub struct RouterRegistry {
	routers: RwLock<HashMap<String, Arc<Router>>>,
	reversers: RwLock<HashMap<String, Arc<Reverser>>>,
}

impl RouterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a compiled top-level router under its name.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::UnnamedRouter`] for routers without a name —
	/// only named routers are reachable for reverse lookup.
	pub fn register(&self, router: Router) -> Result<Arc<Router>, ConfigError> {
		let name = router.name().ok_or(ConfigError::UnnamedRouter)?.to_string();
		let router = Arc::new(router);
		self.routers.write().insert(name, Arc::clone(&router));
		Ok(router)
	}

	pub fn get(&self, name: &str) -> Option<Arc<Router>> {
		self.routers.read().get(name).cloned()
	}

	/// Registered router names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.routers.read().keys().cloned().collect();
		names.sort();
		names
	}

	/// The reverser for a named router, built on first use and cached.
	///
	/// # Errors
	///
	/// Returns [`ReverseError::UnknownRouter`] when no router is
	/// registered under the name.
	pub fn reverser(&self, name: &str) -> Result<Arc<Reverser>, ReverseError> {
		if let Some(reverser) = self.reversers.read().get(name) {
			return Ok(Arc::clone(reverser));
		}
		let router = self.get(name).ok_or_else(|| ReverseError::UnknownRouter {
			name: name.to_string(),
		})?;
		let reverser = Arc::new(Reverser::for_router(&router));
		let mut cache = self.reversers.write();
		let entry = cache
			.entry(name.to_string())
			.or_insert_with(|| Arc::clone(&reverser));
		Ok(Arc::clone(entry))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::endpoints::{Endpoint, EndpointRef};

	struct Named(&'static str);

	impl Endpoint for Named {
		fn name(&self) -> &str {
			self.0
		}
	}

	fn endpoint(name: &'static str) -> EndpointRef {
		Arc::new(Named(name))
	}

	fn named_router(name: &str) -> Router {
		Router::builder(exact_class())
			.with_name(name)
			.route("/hello", endpoint("index"))
			.build()
			.unwrap()
	}

	#[test]
	fn test_builtin_classes_resolve() {
		let registry = RouterClassRegistry::with_builtins();
		assert_eq!(registry.resolve("exact").unwrap().name(), "exact");
		assert_eq!(registry.resolve("regex").unwrap().name(), "regex");
	}

	#[test]
	fn test_probe_table_covers_unregistered_builtins() {
		let registry = RouterClassRegistry::new();
		assert!(registry.get("regex").is_none());
		assert_eq!(registry.resolve("regex").unwrap().name(), "regex");
	}

	#[test]
	fn test_unknown_class_is_a_config_error() {
		let registry = RouterClassRegistry::with_builtins();
		assert!(matches!(
			registry.resolve("telepathic"),
			Err(ConfigError::UnknownRouterClass { name }) if name == "telepathic",
		));
	}

	#[test]
	fn test_register_and_get_router() {
		let registry = RouterRegistry::new();
		registry.register(named_router("main")).unwrap();

		assert!(registry.get("main").is_some());
		assert!(registry.get("other").is_none());
		assert_eq!(registry.names(), vec!["main"]);
	}

	#[test]
	fn test_unnamed_router_is_rejected() {
		let registry = RouterRegistry::new();
		let unnamed = Router::builder(exact_class())
			.route("/hello", endpoint("index"))
			.build()
			.unwrap();

		assert!(matches!(
			registry.register(unnamed),
			Err(ConfigError::UnnamedRouter),
		));
	}

	#[test]
	fn test_reverser_is_cached_per_name() {
		let registry = RouterRegistry::new();
		registry.register(named_router("main")).unwrap();

		let first = registry.reverser("main").unwrap();
		let second = registry.reverser("main").unwrap();
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn test_reverser_for_unknown_router() {
		let registry = RouterRegistry::new();
		assert!(matches!(
			registry.reverser("ghost"),
			Err(ReverseError::UnknownRouter { name }) if name == "ghost",
		));
	}
}
