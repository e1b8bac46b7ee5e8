//! Relay handler for a local metrics endpoint.
//!
//! Each request opens a connection to a locally configured backend (a unix
//! stream socket), copies whatever the backend writes into the response, and
//! then continues down the handler chain.

pub mod backend;
pub mod config;
pub mod handler;
pub mod parse;

pub use backend::{Backend, BackendSpec, UnixSocketBackend, UNIX_BACKEND_KIND};
pub use config::Config;
pub use handler::{relay, LocalMetricsProxy};
pub use parse::{parse_config, unmarshal};

/// Directive and module name.
pub const MODULE_NAME: &str = "local_metrics_proxy";
/// Namespace the module is registered under.
pub const MODULE_NAMESPACE: &str = "http.handlers";
/// Fully qualified module id.
pub const MODULE_ID: &str = "http.handlers.local_metrics_proxy";
