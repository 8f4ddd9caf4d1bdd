//! Extension host state bridge for the quarry code-search UI.
//!
//! Third-party extensions run in an isolated execution context and talk to
//! the privileged main side of the application only through serialized
//! messages. This crate is the execution-context half of that contract:
//!
//! * [`ExtensionHost`] holds the replicated per-session state (settings
//!   cascade, workspace roots, version context, query transformers) and
//!   receives the privileged side's sync and request operations.
//! * The namespace facades ([`ConfigurationNamespace`],
//!   [`WorkspaceNamespace`], [`CommandsNamespace`], [`SearchNamespace`])
//!   are what extension code programs against; privileged operations are
//!   forwarded through a [`MainProxy`].
//! * [`ExtensionSession`] wires a host to a concrete transport using the
//!   `quarry-proto` frame codec.

mod commands;
mod config;
mod connection;
mod error;
mod host;
mod proxy;
mod registration;
mod search;
mod state;
#[cfg(test)]
mod testing;
mod workspace;

pub use commands::{CommandCallback, CommandsNamespace, FnCommand};
pub use config::{Configuration, ConfigurationNamespace};
pub use connection::ExtensionSession;
pub use error::{HostError, ProxyError, Result};
pub use host::ExtensionHost;
pub use proxy::MainProxy;
pub use registration::{BoxFuture, Registration};
pub use search::{QueryTransformer, SearchNamespace};
pub use state::WorkspaceRoot;
pub use workspace::WorkspaceNamespace;
