//! Multi-subscriber change notification channels.
//!
//! Two channel variants with deliberately different late-subscriber
//! semantics:
//! * [`ReplayChannel`]: remembers the single most recent emission and
//!   replays it to every new subscriber. Used for state a consumer needs
//!   immediately on arrival (configuration).
//! * [`StreamChannel`]: fire-forward-only. Subscribers see only emissions
//!   that happen after they subscribed. Used for state that is expected to
//!   be actively watched (workspace roots, version context).
//!
//! The asymmetry is load-bearing; the two variants are distinct types on
//! purpose. Emission is synchronous: by the time `emit` returns, the value
//! sits in every live subscriber's queue, in subscription order, exactly
//! once per emission. There is no batching or coalescing.

mod channel;

pub use channel::{ReplayChannel, StreamChannel, Subscriber};
