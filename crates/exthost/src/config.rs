//! The `configuration` namespace.

use std::fmt;
use std::sync::Arc;

use quarry_proto::{PathSegment, SettingsEdit};
use quarry_reactive::Subscriber;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::ProxyError;
use crate::host::HostInner;
use crate::proxy::MainProxy;

/// Configuration access for extension code.
pub struct ConfigurationNamespace {
	inner: Arc<HostInner>,
}

impl ConfigurationNamespace {
	pub(crate) fn new(inner: Arc<HostInner>) -> Self {
		Self { inner }
	}

	/// Subscription to configuration-changed notifications.
	///
	/// The latest notification is replayed, so a subscriber arriving after
	/// the first settings sync still receives one immediate event.
	pub fn changes(&self) -> Subscriber<()> {
		self.inner.config_changes.subscribe()
	}

	/// Returns a snapshot of the current configuration.
	///
	/// # Panics
	///
	/// Panics if no settings sync has occurred yet. There is no valid
	/// empty configuration; reading before the first sync is a usage bug
	/// in extension code, not a recoverable runtime condition.
	pub fn get(&self) -> Configuration {
		let state = self.inner.state.lock();
		let settings = state
			.settings
			.as_ref()
			.expect("unexpected internal error: settings data is not yet available");
		Configuration {
			snapshot: settings.merged.clone(),
			proxy: Arc::clone(&self.inner.proxy),
		}
	}
}

/// Immutable snapshot of the merged settings view.
///
/// Reading is local and synchronous. [`update`](Self::update) does not
/// mutate the snapshot or the host state; it issues an edit request to the
/// privileged side, and the visible effect arrives later as a fresh sync.
#[derive(Clone)]
pub struct Configuration {
	snapshot: Value,
	proxy: Arc<dyn MainProxy>,
}

impl Configuration {
	/// The fully merged settings object this snapshot was taken from.
	pub fn value(&self) -> &Value {
		&self.snapshot
	}

	/// Looks up one top-level key in the snapshot.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.snapshot.get(key)
	}

	/// Requests a settings edit from the privileged side.
	pub async fn update(&self, key: &str, value: Value) -> Result<(), ProxyError> {
		self.proxy
			.apply_settings_edit(SettingsEdit {
				path: vec![PathSegment::Key(key.to_owned())],
				value,
			})
			.await
	}
}

impl Serialize for Configuration {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.snapshot.serialize(serializer)
	}
}

impl fmt::Debug for Configuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Configuration").field("snapshot", &self.snapshot).finish()
	}
}
