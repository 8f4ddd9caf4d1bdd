//! The `search` namespace and the query transformer registry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::host::HostInner;
use crate::registration::Registration;
use crate::state::RegisteredTransformer;

/// A registered stage that rewrites a search query before execution.
///
/// Stages run sequentially in registration order; each receives the
/// previous stage's output and may await I/O.
#[async_trait]
pub trait QueryTransformer: Send + Sync {
	/// Rewrites `query`, producing the input to the next stage.
	async fn transform_query(&self, query: String) -> String;
}

/// Query transformer registration for extension code.
pub struct SearchNamespace {
	inner: Arc<HostInner>,
}

impl SearchNamespace {
	pub(crate) fn new(inner: Arc<HostInner>) -> Self {
		Self { inner }
	}

	/// Appends `transformer` to the pipeline.
	///
	/// The privileged side is immediately told whether any transformers
	/// exist, so it can skip the transform round trip when there are none.
	/// The boolean is re-sent on every registration change, repeated
	/// values included; receivers that care deduplicate.
	///
	/// The returned handle removes exactly this registration and re-sends
	/// the boolean; it is idempotent. Registering the same transformer
	/// object twice creates two pipeline stages with independent handles.
	pub fn register_query_transformer(&self, transformer: Arc<dyn QueryTransformer>) -> Registration {
		let id = self.inner.next_transformer_id();
		self.inner
			.state
			.lock()
			.transformers
			.push(RegisteredTransformer { id, transformer });
		self.inner.notify_query_transformers();

		let inner = Arc::clone(&self.inner);
		Registration::new(Box::pin(async move {
			inner.state.lock().transformers.retain(|entry| entry.id != id);
			inner.notify_query_transformers();
		}))
	}
}
