//! Endpoint abstraction and registry.
//!
//! The routing core never invokes a handler; it only resolves endpoint
//! names to handler references at compile time and hands them back at
//! dispatch time. What a handler actually is — an async HTTP view, a
//! template callable — is the adapter layer's business.

use std::collections::HashMap;
use std::sync::Arc;

/// A named, registered handler reachable via routing, opaque to the core.
pub trait Endpoint: Send + Sync {
	/// The name the endpoint was registered under; keys the reverse map.
	fn name(&self) -> &str;
}

/// Blanket implementation so `Arc<dyn Endpoint>` is itself an endpoint.
impl<T: Endpoint + ?Sized> Endpoint for Arc<T> {
	fn name(&self) -> &str {
		(**self).name()
	}
}

/// Shared handle to a registered endpoint.
pub type EndpointRef = Arc<dyn Endpoint>;

/// Lookup table from (router type, endpoint name) to handler.
///
/// Populated by explicit [`register`] calls during an initialization
/// phase — there is no import-time self-registration — and read by the
/// router compiler while resolving rule targets.
///
/// [`register`]: EndpointRegistry::register
#[derive(Default)]
pub struct EndpointRegistry {
	endpoints: HashMap<(String, String), EndpointRef>,
}

impl EndpointRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an endpoint for a router type under its own name.
	pub fn register(&mut self, router_type: impl Into<String>, endpoint: EndpointRef) {
		let key = (router_type.into(), endpoint.name().to_string());
		self.endpoints.insert(key, endpoint);
	}

	/// Looks up an endpoint by router type and name.
	pub fn get(&self, router_type: &str, name: &str) -> Option<EndpointRef> {
		self.endpoints
			.get(&(router_type.to_string(), name.to_string()))
			.cloned()
	}

	pub fn len(&self) -> usize {
		self.endpoints.len()
	}

	pub fn is_empty(&self) -> bool {
		self.endpoints.is_empty()
	}
}
