//! Idempotent unsubscribe handles for facade registrations.

use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;

/// Boxed release future, `'static` and sendable.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Handle returned by a facade registration call.
///
/// [`unsubscribe`](Self::unsubscribe) releases the underlying resource
/// exactly once; further calls are no-ops, never errors. Dropping the
/// handle without calling it leaves the resource registered.
pub struct Registration {
	release: Mutex<Option<BoxFuture>>,
}

impl Registration {
	/// Wraps a release future. The future is lazy; nothing runs until the
	/// first `unsubscribe`.
	pub(crate) fn new(release: BoxFuture) -> Self {
		Self {
			release: Mutex::new(Some(release)),
		}
	}

	/// Releases the registration. Idempotent.
	pub async fn unsubscribe(&self) {
		let release = self.release.lock().take();
		if let Some(release) = release {
			release.await;
		}
	}

	/// Returns true once the registration has been released.
	pub fn is_released(&self) -> bool {
		self.release.lock().is_none()
	}
}
