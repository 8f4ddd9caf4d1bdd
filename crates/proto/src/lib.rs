//! Wire protocol for the quarry extension host boundary.
//!
//! The extension host runs third-party extension code in an isolated
//! execution context. Everything that crosses the boundary between the
//! privileged main side and that context is one of the frames defined
//! here, encoded as newline-delimited JSON:
//! * `MainToExt`: state sync notifications and computation requests
//!   pushed into the execution context
//! * `ExtToMain`: privileged operations forwarded out of the execution
//!   context, plus the has-transformers notification
//!
//! Callables never cross the boundary. A callback registered inside the
//! execution context is represented on the wire only by its [`HandleId`];
//! the host dispatches invocations by registry lookup.

#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{read_frame, write_frame};
pub use error::{ProtoError, Result};
pub use types::{
	ExtToMain, HandleId, MainToExt, PathSegment, RequestId, RequestIdGen, SettingsCascade,
	SettingsEdit, WireResult, WireRoot,
};
