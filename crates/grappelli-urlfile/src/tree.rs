//! Parse-tree node types.
//!
//! The tree is transient: it is built by the parser, consumed by the
//! router compiler, and discarded. Nothing at runtime holds on to it.

/// Extra data attached to a target: a decoded JSON object carrying a
/// renderer hint and/or arbitrary literal data.
pub type ExtraData = serde_json::Map<String, serde_json::Value>;

/// A routing definition node: the node's raw attribute strings (with the
/// `--` marker already stripped) followed by its target entries, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteDef {
	pub attributes: Vec<String>,
	pub targets: Vec<TargetDef>,
}

/// A single rule within a [`RouteDef`].
#[derive(Debug, Clone, PartialEq)]
pub enum TargetDef {
	/// `pattern endpoint [renderer] [extras]` on one line.
	Simple {
		pattern: String,
		endpoint: String,
		extra: Option<ExtraData>,
	},
	/// `pattern [extras] :` introducing an indented nested definition.
	Nested {
		pattern: String,
		routedef: RouteDef,
		extra: Option<ExtraData>,
	},
}

impl TargetDef {
	pub fn pattern(&self) -> &str {
		match self {
			TargetDef::Simple { pattern, .. } => pattern,
			TargetDef::Nested { pattern, .. } => pattern,
		}
	}

	pub fn extra(&self) -> Option<&ExtraData> {
		match self {
			TargetDef::Simple { extra, .. } => extra.as_ref(),
			TargetDef::Nested { extra, .. } => extra.as_ref(),
		}
	}
}
