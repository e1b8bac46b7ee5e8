//! Local metrics proxy
//!
//! An HTTP handler that relays the output of a local unix-socket backend into
//! each response before passing the request down the handler chain, plus the
//! block-syntax configuration parser and the small host that runs it.

pub mod config;
pub mod directive;
pub mod error;
pub mod http;
pub mod metrics_proxy;
pub mod registry;
pub mod server;
