//! Compilation of URLfile parse trees into routers.
//!
//! The compiler walks a [`RouteDef`] tree recursively, resolving at each
//! node:
//!
//! - the effective router class, renderer, scope and host — the nearest
//!   explicitly set value walking from the node up to the root, with
//!   framework defaults above the root;
//! - `include=` attributes, which splice another URLfile in at the
//!   current position with the current inherited context as that file's
//!   root context;
//! - endpoint names, looked up through the endpoint registry keyed by the
//!   compiler's router type.
//!
//! Node attributes:
//!
//! | Attribute        | Meaning                                             |
//! |------------------|-----------------------------------------------------|
//! | bare name        | router class of this node (and its children)        |
//! | `renderer=`      | renderer inherited by targets below this node       |
//! | `include=`       | splice another file here; must be the only attribute|
//! | `scope=`         | reverse-lookup namespace of this node's endpoints   |
//! | `default-type=`  | router class children fall back to                  |
//! | `host=`          | host constraint for the compiled router             |
//!
//! Unknown attribute keys are ignored so configurations stay loadable
//! across versions that add new keys.
//!
//! A rule's extra data is frozen during compilation: `render_in=inherit`
//! is rewritten to the node's resolved renderer once, here, and never
//! re-resolved at dispatch time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use grappelli_urlfile::{parse_str, ExtraData, RouteDef, TargetDef};

use crate::endpoints::EndpointRegistry;
use crate::error::ConfigError;
use crate::registry::RouterClassRegistry;
use crate::router::{Router, Target, TargetKind};

/// Router class assumed when neither the node nor any ancestor names one.
pub const DEFAULT_ROUTER_CLASS: &str = "exact";

/// File extension of routing configuration files; appended to include
/// targets that lack it before falling back to the raw name.
pub const URLFILE_SUFFIX: &str = ".URLfile";

/// Extra-data value requesting the inherited renderer.
const INHERIT: &str = "inherit";

/// Compiles parse trees into dispatchable routers for one router type.
///
/// The router type scopes endpoint lookups: the same endpoint name can
/// resolve to different handlers for different router types.
pub struct RouterCompiler<'a> {
	router_type: String,
	classes: &'a RouterClassRegistry,
	endpoints: &'a EndpointRegistry,
}

/// Inherited state threaded through the recursive compilation.
#[derive(Clone)]
struct CompileContext {
	/// Name the compiled router will carry; only read at depth 0.
	name: Option<String>,
	/// File the current tree came from, for relative include resolution.
	file: Option<PathBuf>,
	class: Option<String>,
	renderer: Option<String>,
	scope: String,
	host: Option<String>,
	depth: usize,
	/// Canonicalized files currently being compiled, outermost first.
	include_chain: Vec<PathBuf>,
}

impl CompileContext {
	fn root(name: Option<String>, file: Option<PathBuf>, include_chain: Vec<PathBuf>) -> Self {
		Self {
			name,
			file,
			class: None,
			renderer: None,
			scope: String::new(),
			host: None,
			depth: 0,
			include_chain,
		}
	}
}

/// Attributes of one node, separated from the raw strings.
#[derive(Default)]
struct NodeAttrs {
	class: Option<String>,
	renderer: Option<String>,
	include: Option<String>,
	scope: Option<String>,
	default_type: Option<String>,
	host: Option<String>,
}

impl NodeAttrs {
	fn parse(attributes: &[String]) -> Self {
		let mut attrs = Self::default();
		for attribute in attributes {
			match attribute.split_once('=') {
				None => attrs.class = Some(attribute.clone()),
				Some((key, value)) => match key {
					"renderer" => attrs.renderer = Some(value.to_string()),
					"include" => attrs.include = Some(value.to_string()),
					"scope" => attrs.scope = Some(value.to_string()),
					"default-type" => attrs.default_type = Some(value.to_string()),
					"host" => attrs.host = Some(value.to_string()),
					other => {
						tracing::debug!(key = other, "ignoring unknown routing attribute");
					}
				},
			}
		}
		attrs
	}
}

impl<'a> RouterCompiler<'a> {
	pub fn new(
		router_type: impl Into<String>,
		classes: &'a RouterClassRegistry,
		endpoints: &'a EndpointRegistry,
	) -> Self {
		Self {
			router_type: router_type.into(),
			classes,
			endpoints,
		}
	}

	/// Compiles an already parsed tree into a named top-level router.
	///
	/// # Errors
	///
	/// Any [`ConfigError`] aborts the whole compilation; there is no
	/// partial router.
	pub fn compile(&self, name: &str, tree: &RouteDef) -> Result<Router, ConfigError> {
		let ctx = CompileContext::root(Some(name.to_string()), None, Vec::new());
		self.compile_node(tree, &ctx)
	}

	/// Reads, parses and compiles a routing configuration file.
	pub fn compile_file(&self, name: &str, path: impl AsRef<Path>) -> Result<Router, ConfigError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let canonical = path.canonicalize().map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let tree = parse_str(&source)?;
		let ctx = CompileContext::root(
			Some(name.to_string()),
			Some(path.to_path_buf()),
			vec![canonical],
		);
		self.compile_node(&tree, &ctx)
	}

	fn compile_node(&self, tree: &RouteDef, ctx: &CompileContext) -> Result<Router, ConfigError> {
		let attrs = NodeAttrs::parse(&tree.attributes);

		if let Some(include) = &attrs.include {
			if tree.attributes.len() != 1 || !tree.targets.is_empty() {
				return Err(ConfigError::MalformedInclude {
					path: include.clone(),
				});
			}
			return self.compile_include(include, ctx);
		}

		let class_name = attrs
			.class
			.clone()
			.or_else(|| ctx.class.clone())
			.unwrap_or_else(|| DEFAULT_ROUTER_CLASS.to_string());
		let class = self.classes.resolve(&class_name)?;
		let renderer = attrs.renderer.clone().or_else(|| ctx.renderer.clone());
		let scope = attrs.scope.clone().unwrap_or_else(|| ctx.scope.clone());
		let host = attrs.host.clone().or_else(|| ctx.host.clone());
		// Children without a class of their own fall back to default-type
		// when given, else to this node's class.
		let child_class = attrs.default_type.clone().unwrap_or_else(|| class_name.clone());

		let mut targets = Vec::with_capacity(tree.targets.len());
		for target in &tree.targets {
			match target {
				TargetDef::Simple {
					pattern,
					endpoint,
					extra,
				} => {
					let endpoint = self.endpoints.get(&self.router_type, endpoint).ok_or_else(
						|| ConfigError::UnknownEndpoint {
							router_type: self.router_type.clone(),
							name: endpoint.clone(),
						},
					)?;
					let matcher = class.compile(pattern)?;
					let extra = resolve_inherited_renderer(extra.clone(), renderer.as_deref());
					targets.push(Target::new(
						pattern.clone(),
						matcher,
						TargetKind::Endpoint(endpoint),
						extra,
					));
				}
				TargetDef::Nested {
					pattern,
					routedef,
					extra,
				} => {
					let child_ctx = CompileContext {
						name: None,
						file: ctx.file.clone(),
						class: Some(child_class.clone()),
						renderer: renderer.clone(),
						scope: scope.clone(),
						host: host.clone(),
						depth: ctx.depth + 1,
						include_chain: ctx.include_chain.clone(),
					};
					let child = self.compile_node(routedef, &child_ctx)?;
					let matcher = class.compile(pattern)?;
					let extra = resolve_inherited_renderer(extra.clone(), renderer.as_deref());
					targets.push(Target::new(
						pattern.clone(),
						matcher,
						TargetKind::Nested(Arc::new(child)),
						extra,
					));
				}
			}
		}

		let name = if ctx.depth == 0 { ctx.name.clone() } else { None };
		Ok(Router::from_parts(name, scope, host, class_name, targets))
	}

	/// Replaces an `include=` node by compiling the referenced file with
	/// the current inherited context as its root context.
	fn compile_include(&self, target: &str, ctx: &CompileContext) -> Result<Router, ConfigError> {
		let base = ctx
			.file
			.as_deref()
			.and_then(Path::parent)
			.map(Path::to_path_buf)
			.unwrap_or_default();

		let mut candidates = Vec::with_capacity(2);
		if !target.ends_with(URLFILE_SUFFIX) {
			candidates.push(base.join(format!("{}{}", target, URLFILE_SUFFIX)));
		}
		candidates.push(base.join(target));

		let mut resolved = None;
		let last = candidates.len() - 1;
		for (index, candidate) in candidates.into_iter().enumerate() {
			match std::fs::read_to_string(&candidate) {
				Ok(source) => {
					resolved = Some((candidate, source));
					break;
				}
				// Only a missing file continues the fallback; everything
				// else is a real failure and propagates.
				Err(e) if e.kind() == std::io::ErrorKind::NotFound && index < last => continue,
				Err(source) => {
					return Err(ConfigError::Io {
						path: candidate,
						source,
					});
				}
			}
		}
		let (path, source) = resolved.expect("loop either resolves or returns");

		let canonical = path.canonicalize().map_err(|source| ConfigError::Io {
			path: path.clone(),
			source,
		})?;
		if ctx.include_chain.contains(&canonical) {
			let mut chain = ctx.include_chain.clone();
			chain.push(canonical);
			return Err(ConfigError::IncludeCycle { chain });
		}

		tracing::debug!(file = %path.display(), "including routing configuration");
		let tree = parse_str(&source)?;
		let mut child_ctx = ctx.clone();
		child_ctx.file = Some(path);
		child_ctx.include_chain.push(canonical);
		self.compile_node(&tree, &child_ctx)
	}
}

/// Rewrites `render_in: "inherit"` to the renderer resolved for the
/// enclosing node. Captured once at compile time.
fn resolve_inherited_renderer(
	extra: Option<ExtraData>,
	renderer: Option<&str>,
) -> Option<ExtraData> {
	let mut extra = extra?;
	let wants_inherit = matches!(
		extra.get("render_in"),
		Some(Value::String(value)) if value == INHERIT,
	);
	if wants_inherit {
		let resolved = match renderer {
			Some(renderer) => Value::String(renderer.to_string()),
			None => Value::Null,
		};
		extra.insert("render_in".to_string(), resolved);
	}
	Some(extra)
}
