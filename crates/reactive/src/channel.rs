use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Receiving half of a channel subscription.
///
/// Values arrive in emission order. Dropping the subscriber detaches it;
/// the channel prunes detached subscribers on the next emission.
pub struct Subscriber<T> {
	rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscriber<T> {
	/// Receives the next value, waiting if none is queued.
	///
	/// Returns `None` once the channel has been dropped and the queue is
	/// drained.
	pub async fn recv(&mut self) -> Option<T> {
		self.rx.recv().await
	}

	/// Non-blocking receive. Returns `None` when the queue is empty.
	pub fn try_recv(&mut self) -> Option<T> {
		self.rx.try_recv().ok()
	}
}

struct ReplayState<T> {
	senders: Vec<mpsc::UnboundedSender<T>>,
	last: Option<T>,
}

/// Channel that replays the single most recent emission to new subscribers.
///
/// Buffer size one: a subscriber arriving after several emissions receives
/// only the latest value, then all subsequent emissions.
pub struct ReplayChannel<T> {
	state: Arc<Mutex<ReplayState<T>>>,
}

impl<T> Clone for ReplayChannel<T> {
	fn clone(&self) -> Self {
		Self {
			state: Arc::clone(&self.state),
		}
	}
}

impl<T> Default for ReplayChannel<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> ReplayChannel<T> {
	/// Creates an empty channel with no remembered value.
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(ReplayState {
				senders: Vec::new(),
				last: None,
			})),
		}
	}

	/// Returns the number of attached, live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.state.lock().senders.iter().filter(|tx| !tx.is_closed()).count()
	}
}

impl<T: Clone> ReplayChannel<T> {
	/// Subscribes, immediately queueing the most recent emission if any.
	///
	/// The replayed value and the registration happen under one lock, so a
	/// concurrent `emit` is observed either as the replayed value or as a
	/// live delivery, never both.
	pub fn subscribe(&self) -> Subscriber<T> {
		let (tx, rx) = mpsc::unbounded_channel();
		let mut state = self.state.lock();
		if let Some(last) = &state.last {
			let _ = tx.send(last.clone());
		}
		state.senders.push(tx);
		Subscriber { rx }
	}

	/// Emits a value to every live subscriber and remembers it for
	/// subscribers that arrive later.
	pub fn emit(&self, value: T) {
		let mut state = self.state.lock();
		state.last = Some(value.clone());
		state.senders.retain(|tx| tx.send(value.clone()).is_ok());
	}
}

/// Fire-forward-only channel: no replay to late subscribers.
///
/// A subscriber arriving after an emission does not retroactively see it,
/// but receives every emission from subscription time on.
pub struct StreamChannel<T> {
	senders: Arc<Mutex<Vec<mpsc::UnboundedSender<T>>>>,
}

impl<T> Clone for StreamChannel<T> {
	fn clone(&self) -> Self {
		Self {
			senders: Arc::clone(&self.senders),
		}
	}
}

impl<T> Default for StreamChannel<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> StreamChannel<T> {
	/// Creates an empty channel.
	pub fn new() -> Self {
		Self {
			senders: Arc::new(Mutex::new(Vec::new())),
		}
	}

	/// Subscribes to emissions from this point on.
	pub fn subscribe(&self) -> Subscriber<T> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.senders.lock().push(tx);
		Subscriber { rx }
	}

	/// Returns the number of attached, live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.senders.lock().iter().filter(|tx| !tx.is_closed()).count()
	}
}

impl<T: Clone> StreamChannel<T> {
	/// Emits a value to every live subscriber.
	pub fn emit(&self, value: T) {
		self.senders.lock().retain(|tx| tx.send(value.clone()).is_ok());
	}
}
