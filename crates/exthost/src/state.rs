//! The replicated per-session state record.

use std::sync::Arc;

use quarry_proto::{SettingsCascade, WireRoot};
use serde_json::{Map, Value};
use url::Url;

use crate::error::HostError;
use crate::search::QueryTransformer;

/// Workspace root with its URI parsed into structured form.
///
/// Produced from a [`WireRoot`] on receipt; the sequence handed out by the
/// workspace namespace is a shared immutable slice, replaced wholesale on
/// every sync and never mutated in place.
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
	/// Structured root URI.
	pub uri: Url,
	/// Opaque per-root metadata, carried through unchanged.
	pub extra: Map<String, Value>,
}

impl WorkspaceRoot {
	/// Parses a wire descriptor into the internal form.
	///
	/// A malformed URI is the privileged caller's bug; the parse error is
	/// propagated untouched.
	pub(crate) fn from_wire(wire: WireRoot) -> Result<Self, HostError> {
		let uri = Url::parse(&wire.uri).map_err(|error| HostError::RootUri { uri: wire.uri, error })?;
		Ok(Self { uri, extra: wire.extra })
	}
}

/// Identity of one transformer registration.
///
/// Registering the same transformer object twice yields two distinct
/// identities; unregistration removes exactly the one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransformerId(pub(crate) u64);

/// One entry in the ordered transformer registration list.
#[derive(Clone)]
pub(crate) struct RegisteredTransformer {
	pub(crate) id: TransformerId,
	pub(crate) transformer: Arc<dyn QueryTransformer>,
}

/// Everything the extension execution context replicates for one session.
///
/// Owned exclusively by the host; created once at session initialization,
/// mutated only through the inbound bridge operations and the two facade
/// registration calls, discarded with the session.
pub(crate) struct ExtensionState {
	/// Settings cascade snapshot; absent until the first sync.
	pub(crate) settings: Option<Arc<SettingsCascade>>,
	/// Current workspace roots, replaced wholesale on each sync.
	pub(crate) roots: Arc<[WorkspaceRoot]>,
	/// Active version context, if any.
	pub(crate) version_context: Option<String>,
	/// Registered query transformers, in registration (= execution) order.
	pub(crate) transformers: Vec<RegisteredTransformer>,
}

impl ExtensionState {
	pub(crate) fn new() -> Self {
		Self {
			settings: None,
			roots: Vec::new().into(),
			version_context: None,
			transformers: Vec::new(),
		}
	}
}
