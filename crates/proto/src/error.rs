//! Error types for wire framing.

use thiserror::Error;

/// Errors that can occur while reading or writing frames.
#[derive(Debug, Error)]
pub enum ProtoError {
	/// Transport I/O failure.
	#[error("transport I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// An inbound line was not a valid frame.
	#[error("malformed frame: {error}")]
	Decode {
		/// The underlying JSON error.
		#[source]
		error: serde_json::Error,
	},

	/// A frame could not be serialized.
	#[error("frame serialization failed: {error}")]
	Encode {
		/// The underlying JSON error.
		#[source]
		error: serde_json::Error,
	},
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, ProtoError>;
