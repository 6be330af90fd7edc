//! # Grappelli Routers
//!
//! Compilation, dispatch and reverse resolution for URLfile routing
//! configurations:
//!
//! - **Compiler**: walks a parse tree from `grappelli-urlfile`, resolves
//!   attribute inheritance and `include=` splices, and produces an
//!   immutable [`Router`] tree.
//! - **Dispatch**: [`Router::dispatch`] resolves a query to an endpoint
//!   handle plus its captured positional and keyword arguments.
//! - **Reverse**: [`Reverser`] turns `scope:endpoint` names and parameter
//!   maps back into URLs, validating the parameter set exactly.
//! - **Registries**: explicit, owned lookup tables for router classes,
//!   endpoints and named routers — constructed at startup and passed by
//!   reference, never ambient globals.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use grappelli_routers::{
//!     Endpoint, EndpointRegistry, RouterClassRegistry, RouterCompiler,
//! };
//! use grappelli_urlfile::parse_str;
//!
//! struct Index;
//!
//! impl Endpoint for Index {
//!     fn name(&self) -> &str {
//!         "index"
//!     }
//! }
//!
//! let classes = RouterClassRegistry::with_builtins();
//! let mut endpoints = EndpointRegistry::new();
//! endpoints.register("http", Arc::new(Index));
//!
//! let tree = parse_str("--exact\n/hello index\n").unwrap();
//! let compiler = RouterCompiler::new("http", &classes, &endpoints);
//! let router = compiler.compile("main", &tree).unwrap();
//!
//! assert_eq!(router.dispatch("/hello").unwrap().endpoint.name(), "index");
//! ```

pub mod compiler;
pub mod endpoints;
pub mod error;
pub mod pattern;
pub mod registry;
pub mod reverse;
pub mod router;

pub use compiler::{RouterCompiler, DEFAULT_ROUTER_CLASS, URLFILE_SUFFIX};
pub use endpoints::{Endpoint, EndpointRef, EndpointRegistry};
pub use error::{ConfigError, DispatchError, ReverseError};
pub use pattern::{PatternMatch, PatternMatcher, RouterClass};
pub use registry::{RouterClassRegistry, RouterRegistry};
pub use reverse::{extract_param_names, ReverseMap, Reverser, Signature};
pub use router::{Match, Router, RouterBuilder, Target, TargetKind};
