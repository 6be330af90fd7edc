//! # Grappelli
//!
//! Indentation-based URL routing configuration for Rust web services,
//! in the spirit of Django's URLconf: routing lives in declarative
//! URLfiles instead of code, and compiled routers answer both forward
//! dispatch and reverse URL lookup.
//!
//! A URLfile:
//!
//! ```text
//! --exact
//! --renderer=json
//! /hello index
//! /api:
//!     --scope=api
//!     /ping health
//!     /users/{id} user_detail
//! ```
//!
//! The pipeline: [`urlfile`] lexes and parses the text into a tree, and
//! [`routers`] compiles the tree — resolving attribute inheritance,
//! `include=` splices, router classes and endpoint names — into an
//! immutable router shared by the serving layer.
//!
//! ```
//! use std::sync::Arc;
//! use grappelli::routers::{
//!     Endpoint, EndpointRegistry, RouterClassRegistry, RouterCompiler,
//! };
//! use grappelli::urlfile::parse_str;
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

pub use grappelli_routers as routers;
pub use grappelli_urlfile as urlfile;

pub use grappelli_routers::{
	ConfigError, DispatchError, Endpoint, EndpointRef, EndpointRegistry, Match, ReverseError,
	Reverser, Router, RouterBuilder, RouterClass, RouterClassRegistry, RouterCompiler,
	RouterRegistry,
};
pub use grappelli_urlfile::{LexError, ParseError, RouteDef, TargetDef};
