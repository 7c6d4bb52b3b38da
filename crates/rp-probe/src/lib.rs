//! Connectivity probe for a paired Rust+ server
//!
//! A probe opens one session, waits a short settle window, issues a single
//! read-only request and races the whole attempt against a hard deadline.
//! Exactly one outcome is reported and the session is torn down on every
//! exit path.
//!
//! The transport sits behind [`RemoteConnector`] / [`RemoteSession`];
//! [`WebSocketConnector`] is the shipped implementation.

mod error;
mod prober;
mod session;
mod websocket;

pub use error::{ProbeError, ProbeResult};
pub use prober::{ProbeConfig, Prober};
pub use session::{RemoteConnector, RemoteSession};
pub use websocket::{WebSocketConnector, WebSocketSession};
