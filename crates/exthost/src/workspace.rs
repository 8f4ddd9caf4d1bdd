//! The `workspace` namespace.
//!
//! Open-document tracking is deliberately absent: text-document lifecycle
//! belongs to the editor integration, not to this bridge.

use std::sync::Arc;

use quarry_reactive::Subscriber;

use crate::host::HostInner;
use crate::state::WorkspaceRoot;

/// Workspace roots and version context access for extension code.
pub struct WorkspaceNamespace {
	inner: Arc<HostInner>,
}

impl WorkspaceNamespace {
	pub(crate) fn new(inner: Arc<HostInner>) -> Self {
		Self { inner }
	}

	/// Subscription to roots-changed notifications.
	///
	/// No replay: a subscriber arriving after the first root sync does not
	/// retroactively see it, but receives all subsequent changes.
	pub fn on_did_change_roots(&self) -> Subscriber<()> {
		self.inner.root_changes.subscribe()
	}

	/// The same stream as [`on_did_change_roots`](Self::on_did_change_roots);
	/// both names are kept for interface compatibility.
	pub fn root_changes(&self) -> Subscriber<()> {
		self.inner.root_changes.subscribe()
	}

	/// Subscription to version-context changes, carrying the new value.
	/// No replay.
	pub fn version_context_changes(&self) -> Subscriber<Option<String>> {
		self.inner.version_context_changes.subscribe()
	}

	/// Current roots as a shared immutable slice.
	pub fn roots(&self) -> Arc<[WorkspaceRoot]> {
		Arc::clone(&self.inner.state.lock().roots)
	}

	/// The active version context, if any.
	pub fn version_context(&self) -> Option<String> {
		self.inner.state.lock().version_context.clone()
	}
}

#[cfg(test)]
mod tests {
	use quarry_proto::WireRoot;
	use serde_json::{Map, json};

	use super::*;
	use crate::error::HostError;
	use crate::testing::host_with_proxy;

	fn wire_root(uri: &str) -> WireRoot {
		WireRoot {
			uri: uri.into(),
			extra: Map::new(),
		}
	}

	#[tokio::test]
	async fn roots_observable_fires_once_per_sync_in_order() {
		let (host, _proxy) = host_with_proxy();
		let workspace = host.workspace();
		let mut changes = workspace.on_did_change_roots();

		host.sync_roots(vec![wire_root("git://github.com/a/a?v1")]).unwrap();
		host.sync_roots(vec![wire_root("git://github.com/b/b?v2")]).unwrap();

		assert_eq!(changes.try_recv(), Some(()));
		assert_eq!(changes.try_recv(), Some(()));
		assert_eq!(changes.try_recv(), None);
	}

	#[tokio::test]
	async fn late_subscriber_does_not_see_past_root_syncs() {
		let (host, _proxy) = host_with_proxy();
		host.sync_roots(vec![wire_root("git://github.com/a/a?v1")]).unwrap();

		let mut changes = host.workspace().root_changes();
		assert_eq!(changes.try_recv(), None);

		host.sync_roots(vec![]).unwrap();
		assert_eq!(changes.recv().await, Some(()));
	}

	#[tokio::test]
	async fn roots_are_parsed_and_replaced_wholesale() {
		let (host, _proxy) = host_with_proxy();
		let workspace = host.workspace();

		host.sync_roots(vec![
			wire_root("git://github.com/a/a?v1"),
			wire_root("git://github.com/b/b?v2"),
		])
		.unwrap();
		host.sync_roots(vec![wire_root("git://github.com/c/c?v3")]).unwrap();

		let roots = workspace.roots();
		assert_eq!(roots.len(), 1);
		assert_eq!(roots[0].uri.as_str(), "git://github.com/c/c?v3");
	}

	#[tokio::test]
	async fn root_metadata_rides_along_unchanged() {
		let (host, _proxy) = host_with_proxy();
		let mut extra = Map::new();
		extra.insert("inputRevision".into(), json!("main"));
		host.sync_roots(vec![WireRoot {
			uri: "git://github.com/a/a?v1".into(),
			extra,
		}])
		.unwrap();

		let roots = host.workspace().roots();
		assert_eq!(roots[0].extra.get("inputRevision"), Some(&json!("main")));
	}

	#[tokio::test]
	async fn malformed_root_uri_rejects_the_whole_sync() {
		let (host, _proxy) = host_with_proxy();
		let workspace = host.workspace();
		let mut changes = workspace.on_did_change_roots();
		host.sync_roots(vec![wire_root("git://github.com/a/a?v1")]).unwrap();
		assert_eq!(changes.try_recv(), Some(()));

		let result = host.sync_roots(vec![wire_root("not a uri")]);
		assert!(matches!(result, Err(HostError::RootUri { .. })));

		// State untouched, no emission.
		assert_eq!(workspace.roots()[0].uri.as_str(), "git://github.com/a/a?v1");
		assert_eq!(changes.try_recv(), None);
	}

	#[tokio::test]
	async fn both_root_aliases_observe_the_same_stream() {
		let (host, _proxy) = host_with_proxy();
		let workspace = host.workspace();
		let mut via_event = workspace.on_did_change_roots();
		let mut via_alias = workspace.root_changes();

		host.sync_roots(vec![]).unwrap();
		assert_eq!(via_event.try_recv(), Some(()));
		assert_eq!(via_alias.try_recv(), Some(()));
	}

	#[tokio::test]
	async fn version_context_emissions_carry_the_new_value() {
		let (host, _proxy) = host_with_proxy();
		let workspace = host.workspace();
		let mut changes = workspace.version_context_changes();

		host.sync_version_context(Some("3.17".into()));
		host.sync_version_context(None);

		assert_eq!(changes.try_recv(), Some(Some("3.17".into())));
		assert_eq!(changes.try_recv(), Some(None));
		assert_eq!(workspace.version_context(), None);
	}
}
