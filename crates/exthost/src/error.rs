//! Error types for the extension host.

use quarry_proto::HandleId;
use thiserror::Error;

/// Errors raised while applying privileged-side operations.
///
/// Inbound operations never fail by contract; every variant here marks a
/// contract violation by the privileged caller (or a failing extension
/// callback), which the connection pump logs without tearing down the
/// session.
#[derive(Debug, Error)]
pub enum HostError {
	/// A workspace root arrived with a URI the parser rejects.
	#[error("invalid workspace root URI {uri:?}: {error}")]
	RootUri {
		/// The offending URI string as received.
		uri: String,
		/// The underlying parse error.
		#[source]
		error: url::ParseError,
	},

	/// A command invocation referenced a handle with no registration.
	#[error("no command registered for {0:?}")]
	UnknownHandle(HandleId),

	/// A registered command callback returned an error.
	#[error("command failed: {0}")]
	Command(String),
}

/// Errors surfaced to extension code from outbound cross-boundary calls.
///
/// The bridge performs no retries and substitutes no defaults; whoever
/// initiated the call decides what to do.
#[derive(Debug, Error)]
pub enum ProxyError {
	/// The privileged side rejected the call.
	#[error("privileged side rejected the call: {0}")]
	Remote(String),

	/// The connection to the privileged side is gone.
	#[error("connection to the privileged side is closed")]
	ConnectionClosed,
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
