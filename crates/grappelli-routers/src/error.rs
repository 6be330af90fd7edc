//! Error types for router compilation, dispatch and reverse resolution.
//!
//! Compile-time failures ([`ConfigError`]) abort the whole load; there is
//! no partial-router fallback. Dispatch and reverse failures are
//! per-request values the caller translates into protocol-level responses.

use std::path::PathBuf;

use thiserror::Error;

use grappelli_urlfile::ParseError;

/// Fatal configuration errors raised while compiling a routing definition.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The named router class is neither registered nor probeable.
	#[error("unknown router class '{name}'")]
	UnknownRouterClass { name: String },

	/// An endpoint name did not resolve through the endpoint registry.
	#[error("unknown endpoint '{name}' for router type '{router_type}'")]
	UnknownEndpoint { router_type: String, name: String },

	/// An `include` attribute was combined with other attributes or rules.
	#[error("malformed include of '{path}': include must be the only attribute on a node with no rules")]
	MalformedInclude { path: String },

	/// An include chain revisited a file it is already inside.
	#[error("include cycle: {}", chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
	IncludeCycle { chain: Vec<PathBuf> },

	/// A pattern could not be compiled by its router class.
	#[error("invalid pattern '{pattern}': {source}")]
	BadPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	/// Only named routers can be registered for reverse lookup.
	#[error("cannot register a router without a name")]
	UnnamedRouter,

	/// Reading a routing configuration file failed.
	#[error("cannot read routing configuration '{}': {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// The configuration file did not lex or parse.
	#[error(transparent)]
	Parse(#[from] ParseError),
}

/// Raised when no rule in a compiled router matches a query. Recoverable:
/// the serving layer translates it into a "not found" response.
#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("nowhere to dispatch '{query}'")]
	NowhereToDispatch { query: String },
}

/// Raised by reverse URL resolution. Recoverable: templating code should
/// catch it and render a diagnostic.
#[derive(Debug, Error)]
pub enum ReverseError {
	/// No router is registered under the requested name.
	#[error("no router registered under '{name}'")]
	UnknownRouter { name: String },

	/// The endpoint's scope is absent from the router's reverse map.
	#[error("no scope '{scope}' in reverse map")]
	UnknownScope { scope: String },

	/// The scope exists but holds no endpoint of that name.
	#[error("no endpoint '{name}' in scope '{scope}'")]
	UnknownEndpoint { scope: String, name: String },

	/// The supplied parameter names do not exactly equal the required set.
	#[error("parameter mismatch for '{endpoint}': pattern takes {expected:?}, got {supplied:?}")]
	ParameterMismatch {
		endpoint: String,
		expected: Vec<String>,
		supplied: Vec<String>,
	},
}
