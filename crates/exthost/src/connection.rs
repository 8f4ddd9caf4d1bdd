//! Wire pump binding an [`ExtensionHost`] to a transport.
//!
//! The reader task dispatches inbound frames to the bridge operations and
//! resolves responses against a pending-request map; the writer task
//! serializes every outbound frame from one queue, which is what makes
//! notifications fire-and-forget and synchronous for their callers.
//! Request/response ordering across distinct operations is whatever the
//! transport provides; the pump adds no global sequencing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry_proto::{
	ExtToMain, HandleId, MainToExt, ProtoError, RequestId, RequestIdGen, SettingsEdit, WireResult,
	read_frame, write_frame,
};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ProxyError;
use crate::host::ExtensionHost;
use crate::proxy::MainProxy;

type PendingMap = Arc<Mutex<HashMap<RequestId, oneshot::Sender<WireResult>>>>;

/// One extension execution context wired to its transport.
///
/// Created with [`connect`](Self::connect) on a running tokio runtime.
/// Dropping the session leaves the pump tasks running; use
/// [`shutdown`](Self::shutdown) for orderly teardown.
pub struct ExtensionSession {
	host: ExtensionHost,
	cancel: CancellationToken,
	reader_task: JoinHandle<()>,
	writer_task: JoinHandle<()>,
}

impl ExtensionSession {
	/// Spawns the pump over the given transport halves and returns the
	/// session.
	pub fn connect<R, W>(reader: R, writer: W) -> Self
	where
		R: AsyncBufRead + Unpin + Send + 'static,
		W: AsyncWrite + Unpin + Send + 'static,
	{
		let cancel = CancellationToken::new();
		let (outbound, outbound_rx) = mpsc::unbounded_channel();
		let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

		let proxy = Arc::new(RemoteMain {
			outbound: outbound.clone(),
			pending: Arc::clone(&pending),
			ids: Mutex::new(RequestIdGen::new()),
			cancel: cancel.clone(),
		});
		let host = ExtensionHost::new(proxy);

		let writer_task = tokio::spawn(write_loop(writer, outbound_rx, cancel.clone()));
		let reader_task = tokio::spawn(read_loop(
			reader,
			host.clone(),
			outbound,
			pending,
			cancel.clone(),
		));

		Self {
			host,
			cancel,
			reader_task,
			writer_task,
		}
	}

	/// The session's extension host.
	pub fn host(&self) -> &ExtensionHost {
		&self.host
	}

	/// Resolves once the connection has closed (EOF, transport failure, or
	/// [`shutdown`](Self::shutdown)).
	pub async fn closed(&self) {
		self.cancel.cancelled().await;
	}

	/// Cancels the pump and joins both tasks. In-flight outbound requests
	/// resolve with [`ProxyError::ConnectionClosed`].
	pub async fn shutdown(self) {
		self.cancel.cancel();
		let _ = self.reader_task.await;
		let _ = self.writer_task.await;
	}
}

async fn read_loop<R>(
	mut reader: R,
	host: ExtensionHost,
	outbound: mpsc::UnboundedSender<ExtToMain>,
	pending: PendingMap,
	cancel: CancellationToken,
) where
	R: AsyncBufRead + Unpin + Send + 'static,
{
	loop {
		let frame = tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			frame = read_frame::<MainToExt, _>(&mut reader) => frame,
		};
		match frame {
			Ok(Some(frame)) => dispatch(&host, frame, &outbound, &pending),
			Ok(None) => {
				tracing::debug!("privileged side closed the connection");
				break;
			}
			Err(ProtoError::Decode { error }) => {
				// The line was consumed; the stream stays usable.
				tracing::warn!(%error, "dropping malformed inbound frame");
			}
			Err(error) => {
				tracing::warn!(%error, "transport read failed; closing connection");
				break;
			}
		}
	}

	// Resolve every in-flight outbound request as closed.
	pending.lock().clear();
	cancel.cancel();
}

/// Applies one inbound frame.
///
/// Sync operations are applied inline (they are synchronous by contract);
/// requests are served on their own tasks so a slow transformer or command
/// callback does not stall the pump.
fn dispatch(
	host: &ExtensionHost,
	frame: MainToExt,
	outbound: &mpsc::UnboundedSender<ExtToMain>,
	pending: &PendingMap,
) {
	match frame {
		MainToExt::SyncSettings { cascade } => host.sync_settings_data(cascade),
		MainToExt::SyncRoots { roots } => {
			if let Err(error) = host.sync_roots(roots) {
				// Inbound operations never fail by contract; this is the
				// privileged caller's bug, not grounds to kill the session.
				tracing::error!(%error, "rejected roots sync");
			}
		}
		MainToExt::SyncVersionContext { ctx } => host.sync_version_context(ctx),
		MainToExt::TransformQuery { id, query } => {
			let host = host.clone();
			let outbound = outbound.clone();
			tokio::spawn(async move {
				let transformed = host.transform_search_query(query).await;
				let _ = outbound.send(ExtToMain::Response {
					id,
					result: WireResult::Ok(Value::String(transformed)),
				});
			});
		}
		MainToExt::InvokeCommand { id, handle, args } => {
			let host = host.clone();
			let outbound = outbound.clone();
			tokio::spawn(async move {
				let result = match host.invoke_command(handle, args).await {
					Ok(value) => WireResult::Ok(value),
					Err(error) => WireResult::Err(error.to_string()),
				};
				let _ = outbound.send(ExtToMain::Response { id, result });
			});
		}
		MainToExt::Response { id, result } => match pending.lock().remove(&id) {
			Some(tx) => {
				let _ = tx.send(result);
			}
			None => tracing::warn!(?id, "dropping orphaned response"),
		},
	}
}

async fn write_loop<W>(
	mut writer: W,
	mut outbound_rx: mpsc::UnboundedReceiver<ExtToMain>,
	cancel: CancellationToken,
) where
	W: AsyncWrite + Unpin + Send + 'static,
{
	loop {
		let frame = tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			maybe_frame = outbound_rx.recv() => match maybe_frame {
				Some(frame) => frame,
				None => break,
			},
		};
		if let Err(error) = write_frame(&mut writer, &frame).await {
			tracing::warn!(%error, "transport write failed; closing connection");
			cancel.cancel();
			break;
		}
	}
}

/// Wire-backed [`MainProxy`]: requests go out as frames and resolve when
/// the matching response arrives.
struct RemoteMain {
	outbound: mpsc::UnboundedSender<ExtToMain>,
	pending: PendingMap,
	ids: Mutex<RequestIdGen>,
	cancel: CancellationToken,
}

impl RemoteMain {
	async fn request<F>(&self, build: F) -> Result<Value, ProxyError>
	where
		F: FnOnce(RequestId) -> ExtToMain,
	{
		let id = self.ids.lock().next();
		let (tx, rx) = oneshot::channel();
		self.pending.lock().insert(id, tx);

		if self.outbound.send(build(id)).is_err() {
			self.pending.lock().remove(&id);
			return Err(ProxyError::ConnectionClosed);
		}

		let result = tokio::select! {
			biased;
			_ = self.cancel.cancelled() => {
				self.pending.lock().remove(&id);
				return Err(ProxyError::ConnectionClosed);
			}
			result = rx => result,
		};
		match result {
			Ok(WireResult::Ok(value)) => Ok(value),
			Ok(WireResult::Err(message)) => Err(ProxyError::Remote(message)),
			Err(_) => Err(ProxyError::ConnectionClosed),
		}
	}
}

#[async_trait]
impl MainProxy for RemoteMain {
	async fn apply_settings_edit(&self, edit: SettingsEdit) -> Result<(), ProxyError> {
		self.request(|id| ExtToMain::ApplySettingsEdit { id, edit }).await.map(|_| ())
	}

	async fn execute_command(&self, command: &str, args: Vec<Value>) -> Result<Value, ProxyError> {
		let command = command.to_owned();
		self.request(move |id| ExtToMain::ExecuteCommand { id, command, args }).await
	}

	async fn register_command(&self, command: &str, handle: HandleId) -> Result<(), ProxyError> {
		let command = command.to_owned();
		self.request(move |id| ExtToMain::RegisterCommand { id, command, handle })
			.await
			.map(|_| ())
	}

	async fn unregister_command(&self, handle: HandleId) -> Result<(), ProxyError> {
		self.request(move |id| ExtToMain::UnregisterCommand { id, handle })
			.await
			.map(|_| ())
	}

	fn notify_query_transformers(&self, has_transformers: bool) {
		// Best-effort: a closed connection drops the notification.
		let _ = self.outbound.send(ExtToMain::HasQueryTransformers {
			value: has_transformers,
		});
	}
}
