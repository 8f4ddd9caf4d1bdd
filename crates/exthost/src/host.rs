//! The extension host: inbound bridge operations and namespace wiring.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use quarry_proto::{HandleId, SettingsCascade, WireRoot};
use quarry_reactive::{ReplayChannel, StreamChannel};
use serde_json::Value;

use crate::commands::{CommandCallback, CommandsNamespace};
use crate::config::ConfigurationNamespace;
use crate::error::{HostError, Result};
use crate::proxy::MainProxy;
use crate::search::SearchNamespace;
use crate::state::{ExtensionState, RegisteredTransformer, TransformerId, WorkspaceRoot};
use crate::workspace::WorkspaceNamespace;

/// Shared record behind the host and its namespace handles.
pub(crate) struct HostInner {
	pub(crate) state: Mutex<ExtensionState>,
	pub(crate) config_changes: ReplayChannel<()>,
	pub(crate) root_changes: StreamChannel<()>,
	pub(crate) version_context_changes: StreamChannel<Option<String>>,
	pub(crate) commands: Mutex<HashMap<HandleId, Arc<dyn CommandCallback>>>,
	pub(crate) handle_ids: AtomicU64,
	pub(crate) transformer_ids: AtomicU64,
	pub(crate) proxy: Arc<dyn MainProxy>,
}

impl HostInner {
	pub(crate) fn next_handle(&self) -> HandleId {
		HandleId(self.handle_ids.fetch_add(1, Ordering::Relaxed))
	}

	pub(crate) fn next_transformer_id(&self) -> TransformerId {
		TransformerId(self.transformer_ids.fetch_add(1, Ordering::Relaxed))
	}

	/// Sends the current "any transformers registered" boolean to the
	/// privileged side. Always notifies; deduplication of repeated values
	/// is the receiver's concern.
	pub(crate) fn notify_query_transformers(&self) {
		let has_transformers = !self.state.lock().transformers.is_empty();
		self.proxy.notify_query_transformers(has_transformers);
	}
}

/// One extension execution context session.
///
/// Holds the replicated [`ExtensionState`] and the change bus, receives
/// the privileged side's sync operations, and hands out the namespace
/// facades extension code programs against. Cheap to clone; clones share
/// the session.
#[derive(Clone)]
pub struct ExtensionHost {
	inner: Arc<HostInner>,
}

impl ExtensionHost {
	/// Creates a session bridged to the privileged side through `proxy`.
	pub fn new(proxy: Arc<dyn MainProxy>) -> Self {
		Self {
			inner: Arc::new(HostInner {
				state: Mutex::new(ExtensionState::new()),
				config_changes: ReplayChannel::new(),
				root_changes: StreamChannel::new(),
				version_context_changes: StreamChannel::new(),
				commands: Mutex::new(HashMap::new()),
				handle_ids: AtomicU64::new(0),
				transformer_ids: AtomicU64::new(0),
				proxy,
			}),
		}
	}

	// Inbound bridge ------------------------------------------------------

	/// Replaces the settings cascade and notifies configuration
	/// subscribers. The stored snapshot is immutable from this point.
	pub fn sync_settings_data(&self, cascade: SettingsCascade) {
		self.inner.state.lock().settings = Some(Arc::new(cascade));
		self.inner.config_changes.emit(());
	}

	/// Replaces the workspace roots wholesale and notifies roots
	/// subscribers. Each incoming URI is parsed into structured form; a
	/// parse failure aborts the whole sync and is the caller's bug.
	pub fn sync_roots(&self, roots: Vec<WireRoot>) -> Result<()> {
		let parsed = roots
			.into_iter()
			.map(WorkspaceRoot::from_wire)
			.collect::<Result<Vec<_>>>()?;
		self.inner.state.lock().roots = parsed.into();
		self.inner.root_changes.emit(());
		Ok(())
	}

	/// Replaces the active version context and emits the new value.
	/// `None` means "no version context".
	pub fn sync_version_context(&self, ctx: Option<String>) {
		self.inner.state.lock().version_context = ctx.clone();
		self.inner.version_context_changes.emit(ctx);
	}

	/// Threads `query` through the registered transformers in registration
	/// order, awaiting each stage.
	///
	/// The candidate list and its order are fixed when the returned future
	/// first runs; live membership is re-checked before each stage, and a
	/// transformer unregistered since then is skipped (its input passes
	/// through unchanged). Transformers registered after that point are
	/// never included in this run. Under concurrent (un)registration the
	/// result therefore depends on interleaving timing; that race is
	/// accepted and documented, not an error.
	pub async fn transform_search_query(&self, query: String) -> String {
		let candidates: Vec<RegisteredTransformer> = self.inner.state.lock().transformers.clone();
		let mut current = query;
		for entry in candidates {
			let still_registered = self
				.inner
				.state
				.lock()
				.transformers
				.iter()
				.any(|live| live.id == entry.id);
			if !still_registered {
				tracing::trace!("skipping transformer unregistered mid-pipeline");
				continue;
			}
			current = entry.transformer.transform_query(current).await;
		}
		current
	}

	/// Invokes a command callback registered in this context.
	///
	/// The privileged side refers to the callable only by handle; an
	/// unknown handle means the caller is out of sync with the registry.
	pub async fn invoke_command(&self, handle: HandleId, args: Vec<Value>) -> Result<Value> {
		let callback = self
			.inner
			.commands
			.lock()
			.get(&handle)
			.cloned()
			.ok_or(HostError::UnknownHandle(handle))?;
		callback.call(args).await.map_err(HostError::Command)
	}

	// Namespaces -----------------------------------------------------------

	/// The `configuration` namespace.
	pub fn configuration(&self) -> ConfigurationNamespace {
		ConfigurationNamespace::new(Arc::clone(&self.inner))
	}

	/// The `workspace` namespace.
	pub fn workspace(&self) -> WorkspaceNamespace {
		WorkspaceNamespace::new(Arc::clone(&self.inner))
	}

	/// The `commands` namespace.
	pub fn commands(&self) -> CommandsNamespace {
		CommandsNamespace::new(Arc::clone(&self.inner))
	}

	/// The `search` namespace.
	pub fn search(&self) -> SearchNamespace {
		SearchNamespace::new(Arc::clone(&self.inner))
	}
}
