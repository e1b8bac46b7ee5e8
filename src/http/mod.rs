//! Minimal HTTP/1.1 host for the handler chain.
//!
//! - **`connection`**: per-connection state machine (read, run chain, write)
//! - **`handler`**: handler and middleware traits, and the chain that links them
//! - **`parser`**: parses incoming requests from byte buffers
//! - **`request`** / **`response`**: message types
//! - **`writer`**: the response sink handlers write into, and wire serialization
//!
//! ```text
//!   Reading ──request──▶ Processing ──chain done──▶ Writing
//!      ▲                                              │
//!      └────────────── keep-alive ────────────────────┤
//!                                                     └─ close ─▶ Closed
//! ```

pub mod connection;
pub mod handler;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
