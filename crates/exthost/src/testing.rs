//! Test doubles shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry_proto::{HandleId, SettingsCascade, SettingsEdit};
use serde_json::{Map, Value};

use crate::error::ProxyError;
use crate::host::ExtensionHost;
use crate::proxy::MainProxy;

/// In-memory `MainProxy` that records every outbound call.
#[derive(Default)]
pub(crate) struct RecordingProxy {
	pub(crate) edits: Mutex<Vec<SettingsEdit>>,
	pub(crate) executed: Mutex<Vec<(String, Vec<Value>)>>,
	pub(crate) registered: Mutex<Vec<(String, HandleId)>>,
	pub(crate) unregistered: Mutex<Vec<HandleId>>,
	pub(crate) notifications: Mutex<Vec<bool>>,
	pub(crate) execute_response: Mutex<Option<Value>>,
	pub(crate) fail_register: AtomicBool,
}

#[async_trait]
impl MainProxy for RecordingProxy {
	async fn apply_settings_edit(&self, edit: SettingsEdit) -> Result<(), ProxyError> {
		self.edits.lock().push(edit);
		Ok(())
	}

	async fn execute_command(&self, command: &str, args: Vec<Value>) -> Result<Value, ProxyError> {
		self.executed.lock().push((command.to_owned(), args));
		Ok(self.execute_response.lock().take().unwrap_or(Value::Null))
	}

	async fn register_command(&self, command: &str, handle: HandleId) -> Result<(), ProxyError> {
		if self.fail_register.load(Ordering::SeqCst) {
			return Err(ProxyError::Remote("registration refused".into()));
		}
		self.registered.lock().push((command.to_owned(), handle));
		Ok(())
	}

	async fn unregister_command(&self, handle: HandleId) -> Result<(), ProxyError> {
		self.unregistered.lock().push(handle);
		Ok(())
	}

	fn notify_query_transformers(&self, has_transformers: bool) {
		self.notifications.lock().push(has_transformers);
	}
}

/// Fresh host wired to a recording proxy.
pub(crate) fn host_with_proxy() -> (ExtensionHost, Arc<RecordingProxy>) {
	let proxy = Arc::new(RecordingProxy::default());
	let host = ExtensionHost::new(Arc::clone(&proxy) as Arc<dyn MainProxy>);
	(host, proxy)
}

/// Cascade whose merged view is `merged` and whose other layers are empty.
pub(crate) fn cascade(merged: Value) -> SettingsCascade {
	SettingsCascade {
		merged,
		rest: Map::new(),
	}
}
