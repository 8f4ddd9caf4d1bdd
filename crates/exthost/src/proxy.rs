//! The outbound RPC surface toward the privileged main side.

use async_trait::async_trait;
use quarry_proto::{HandleId, SettingsEdit};
use serde_json::Value;

use crate::error::ProxyError;

/// Operations the extension context forwards to the privileged side.
///
/// One production implementation exists (the wire-backed proxy inside the
/// connection pump); tests substitute recording fakes. All request/response
/// methods surface remote failures as [`ProxyError`] to the caller; the
/// bridge never retries and never swallows an outbound failure.
#[async_trait]
pub trait MainProxy: Send + Sync {
	/// Asks the privileged side to apply a partial settings edit.
	///
	/// The local settings snapshot is not touched; the visible effect
	/// arrives later as a full cascade sync.
	async fn apply_settings_edit(&self, edit: SettingsEdit) -> Result<(), ProxyError>;

	/// Executes a command owned by the privileged side, returning its
	/// result unchanged.
	async fn execute_command(&self, command: &str, args: Vec<Value>) -> Result<Value, ProxyError>;

	/// Registers a command whose callable stays in the extension context;
	/// only `handle` crosses the boundary.
	async fn register_command(&self, command: &str, handle: HandleId) -> Result<(), ProxyError>;

	/// Releases a previously registered command handle.
	async fn unregister_command(&self, handle: HandleId) -> Result<(), ProxyError>;

	/// Tells the privileged side whether any query transformers exist, so
	/// it can skip the transform round trip when there are none.
	///
	/// Fire-and-forget: no result, no ordering guarantee relative to other
	/// outbound calls beyond the transport's own per-channel ordering.
	fn notify_query_transformers(&self, has_transformers: bool);
}
