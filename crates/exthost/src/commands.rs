//! The `commands` namespace.
//!
//! Commands registered by extension code stay callable only inside the
//! execution context. The privileged side receives the command name and a
//! [`HandleId`]; invocations come back as handle lookups, never as
//! transported function references.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProxyError;
use crate::host::HostInner;
use crate::registration::Registration;

/// A command callable registered by extension code.
///
/// The error string crosses the boundary verbatim as the remote failure
/// rendering.
#[async_trait]
pub trait CommandCallback: Send + Sync {
	/// Runs the command.
	async fn call(&self, args: Vec<Value>) -> Result<Value, String>;
}

/// Adapter implementing [`CommandCallback`] for synchronous closures.
pub struct FnCommand<F> {
	callback: F,
}

impl<F> FnCommand<F>
where
	F: Fn(Vec<Value>) -> Result<Value, String> + Send + Sync,
{
	/// Wraps `callback`.
	pub fn new(callback: F) -> Self {
		Self { callback }
	}
}

#[async_trait]
impl<F> CommandCallback for FnCommand<F>
where
	F: Fn(Vec<Value>) -> Result<Value, String> + Send + Sync,
{
	async fn call(&self, args: Vec<Value>) -> Result<Value, String> {
		(self.callback)(args)
	}
}

/// Command execution and registration for extension code.
pub struct CommandsNamespace {
	inner: Arc<HostInner>,
}

impl CommandsNamespace {
	pub(crate) fn new(inner: Arc<HostInner>) -> Self {
		Self { inner }
	}

	/// Executes a command owned by the privileged side and returns its
	/// asynchronous result unchanged.
	pub async fn execute_command(&self, command: &str, args: Vec<Value>) -> Result<Value, ProxyError> {
		self.inner.proxy.execute_command(command, args).await
	}

	/// Registers `callback` under `command`.
	///
	/// The callable is stored locally under a fresh handle; only the
	/// handle is forwarded for registration. On a remote registration
	/// failure the local entry is rolled back and the error returned.
	/// The returned handle releases both sides; it is idempotent.
	pub async fn register_command(
		&self,
		command: &str,
		callback: Arc<dyn CommandCallback>,
	) -> Result<Registration, ProxyError> {
		let handle = self.inner.next_handle();
		self.inner.commands.lock().insert(handle, callback);
		if let Err(error) = self.inner.proxy.register_command(command, handle).await {
			self.inner.commands.lock().remove(&handle);
			return Err(error);
		}

		let inner = Arc::clone(&self.inner);
		Ok(Registration::new(Box::pin(async move {
			inner.commands.lock().remove(&handle);
			if let Err(error) = inner.proxy.unregister_command(handle).await {
				tracing::warn!(?handle, %error, "failed to release remote command registration");
			}
		})))
	}
}

#[cfg(test)]
mod tests {
	use quarry_proto::HandleId;
	use serde_json::json;

	use super::*;
	use crate::error::HostError;
	use crate::testing::host_with_proxy;

	#[tokio::test]
	async fn execute_command_passes_through_the_proxy_result() {
		let (host, proxy) = host_with_proxy();
		*proxy.execute_response.lock() = Some(json!({ "opened": true }));

		let result = host
			.commands()
			.execute_command("quarry.open", vec![json!("a.rs")])
			.await
			.unwrap();
		assert_eq!(result, json!({ "opened": true }));
		assert_eq!(
			proxy.executed.lock().as_slice(),
			&[("quarry.open".to_owned(), vec![json!("a.rs")])]
		);
	}

	#[tokio::test]
	async fn register_forwards_only_the_handle() {
		let (host, proxy) = host_with_proxy();
		let callback = Arc::new(FnCommand::new(|_args| Ok(Value::Null)));

		let _registration = host
			.commands()
			.register_command("quarry.export", callback)
			.await
			.unwrap();
		assert_eq!(
			proxy.registered.lock().as_slice(),
			&[("quarry.export".to_owned(), HandleId(0))]
		);
	}

	#[tokio::test]
	async fn invoking_a_registered_command_dispatches_locally() {
		let (host, proxy) = host_with_proxy();
		let callback = Arc::new(FnCommand::new(|args: Vec<Value>| {
			Ok(json!({ "echoed": args }))
		}));
		let _registration = host.commands().register_command("quarry.echo", callback).await.unwrap();

		let (_, handle) = proxy.registered.lock()[0].clone();
		let result = host.invoke_command(handle, vec![json!(1), json!(2)]).await.unwrap();
		assert_eq!(result, json!({ "echoed": [1, 2] }));
	}

	#[tokio::test]
	async fn unknown_handle_is_an_error() {
		let (host, _proxy) = host_with_proxy();
		let result = host.invoke_command(HandleId(99), vec![]).await;
		assert!(matches!(result, Err(HostError::UnknownHandle(HandleId(99)))));
	}

	#[tokio::test]
	async fn callback_errors_cross_as_command_failures() {
		let (host, proxy) = host_with_proxy();
		let callback = Arc::new(FnCommand::new(|_args| Err("boom".to_owned())));
		let _registration = host.commands().register_command("quarry.fail", callback).await.unwrap();

		let (_, handle) = proxy.registered.lock()[0].clone();
		let result = host.invoke_command(handle, vec![]).await;
		assert!(matches!(result, Err(HostError::Command(message)) if message == "boom"));
	}

	#[tokio::test]
	async fn unsubscribe_releases_both_sides_idempotently() {
		let (host, proxy) = host_with_proxy();
		let callback = Arc::new(FnCommand::new(|_args| Ok(Value::Null)));
		let registration = host.commands().register_command("quarry.once", callback).await.unwrap();
		let (_, handle) = proxy.registered.lock()[0].clone();

		registration.unsubscribe().await;
		registration.unsubscribe().await;

		assert_eq!(proxy.unregistered.lock().as_slice(), &[handle]);
		let result = host.invoke_command(handle, vec![]).await;
		assert!(matches!(result, Err(HostError::UnknownHandle(_))));
	}

	#[tokio::test]
	async fn failed_remote_registration_rolls_back_the_local_entry() {
		let (host, proxy) = host_with_proxy();
		proxy.fail_register.store(true, std::sync::atomic::Ordering::SeqCst);

		let callback = Arc::new(FnCommand::new(|_args| Ok(Value::Null)));
		let result = host.commands().register_command("quarry.denied", callback).await;
		assert!(matches!(result, Err(ProxyError::Remote(_))));

		// The handle allocated for the failed registration must not dispatch.
		let result = host.invoke_command(HandleId(0), vec![]).await;
		assert!(matches!(result, Err(HostError::UnknownHandle(_))));
	}
}
