//! Wire types for the extension host protocol.
//!
//! These structures define what actually crosses the serialization
//! boundary between the privileged main side and the extension execution
//! context. They are deliberately plain: parsed/owned forms (structured
//! URIs, callback registries) live on the receiving side.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for requests and responses, per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Identifier for a callable registered inside the extension context.
///
/// Only the handle crosses the boundary; the privileged side invokes the
/// callable by sending the handle back, never by reference transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub u64);

/// Simple counter-based request ID generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestIdGen(u64);

impl RequestIdGen {
	/// Creates a new counter starting at 0.
	#[must_use]
	pub const fn new() -> Self {
		Self(0)
	}

	/// Generates the next unique ID and increments the counter.
	#[allow(clippy::should_implement_trait, reason = "convention")]
	pub fn next(&mut self) -> RequestId {
		let id = self.0;
		self.0 += 1;
		RequestId(id)
	}
}

/// Layered settings cascade as transmitted by the privileged side.
///
/// The cascade is an opaque, JSON-serializable object merged from multiple
/// sources (defaults, org, user). The only structural assumption made here
/// is the presence of the `final` field holding the fully merged view;
/// every other field rides along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsCascade {
	/// Fully merged view of all settings layers.
	#[serde(rename = "final")]
	pub merged: Value,
	/// Remaining cascade fields (per-layer subjects and contents); opaque
	/// to the extension host.
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

/// Workspace root descriptor as transmitted by the privileged side.
///
/// The `uri` field is a plain string on the wire; the extension host
/// parses it into a structured URI on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRoot {
	/// Root URI, e.g. a repository at a revision.
	pub uri: String,
	/// Opaque per-root metadata.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// One segment of a settings edit path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
	/// Object key.
	Key(String),
	/// Array index.
	Index(usize),
}

/// A partial settings edit, issued by extension code and applied by the
/// privileged side. Partial edits only travel in this direction; inbound
/// settings always arrive as a whole cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsEdit {
	/// Path to the value being edited.
	pub path: Vec<PathSegment>,
	/// New value at that path.
	pub value: Value,
}

/// Outcome payload of a request, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireResult {
	/// The request succeeded with this value.
	Ok(Value),
	/// The request failed; the message is the remote error rendering.
	Err(String),
}

/// Frames sent by the privileged main side into the extension context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MainToExt {
	/// Replace the settings cascade. Fire-and-forget.
	SyncSettings {
		/// The new cascade.
		cascade: SettingsCascade,
	},
	/// Replace the workspace roots wholesale. Fire-and-forget.
	SyncRoots {
		/// The new root set, in order.
		roots: Vec<WireRoot>,
	},
	/// Replace the active version context. Fire-and-forget.
	SyncVersionContext {
		/// The new context, or `None` for "no version context".
		ctx: Option<String>,
	},
	/// Request: thread `query` through the transformer pipeline.
	TransformQuery {
		/// Correlates the eventual response.
		id: RequestId,
		/// Raw search query.
		query: String,
	},
	/// Request: invoke a previously registered command callback.
	InvokeCommand {
		/// Correlates the eventual response.
		id: RequestId,
		/// Handle of the callback to invoke.
		handle: HandleId,
		/// Invocation arguments.
		args: Vec<Value>,
	},
	/// Response to an extension-originated request.
	Response {
		/// ID of the request this answers.
		id: RequestId,
		/// Request outcome.
		result: WireResult,
	},
}

/// Frames sent by the extension context to the privileged main side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtToMain {
	/// Request: apply a partial settings edit.
	ApplySettingsEdit {
		/// Correlates the eventual response.
		id: RequestId,
		/// The edit to apply.
		edit: SettingsEdit,
	},
	/// Request: execute a command owned by the privileged side.
	ExecuteCommand {
		/// Correlates the eventual response.
		id: RequestId,
		/// Command identifier.
		command: String,
		/// Command arguments.
		args: Vec<Value>,
	},
	/// Request: register a command whose callable lives in the extension
	/// context, represented by `handle`.
	RegisterCommand {
		/// Correlates the eventual response.
		id: RequestId,
		/// Command identifier.
		command: String,
		/// Handle the privileged side will send back on invocation.
		handle: HandleId,
	},
	/// Request: release a previously registered command handle.
	UnregisterCommand {
		/// Correlates the eventual response.
		id: RequestId,
		/// Handle to release.
		handle: HandleId,
	},
	/// Notification: whether any query transformers are currently
	/// registered. Lets the privileged side skip the transform round trip
	/// entirely when there are none.
	HasQueryTransformers {
		/// Current "any transformers registered" state.
		value: bool,
	},
	/// Response to a privileged-side request.
	Response {
		/// ID of the request this answers.
		id: RequestId,
		/// Request outcome.
		result: WireResult,
	},
}
