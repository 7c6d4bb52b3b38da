//! Remote client seam
//!
//! The protocol client is an external collaborator. The prober only needs
//! to open a session, ask one cheap question and close it again.

use async_trait::async_trait;
use rp_core::Credentials;

use crate::error::ProbeResult;

/// A single session against the remote service
///
/// `disconnect` must be safe to call whether or not `connect` finished.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Open the session
    async fn connect(&self) -> ProbeResult<()>;

    /// Issue one lightweight read-only request and wait for its answer
    async fn check_alive(&self) -> ProbeResult<()>;

    /// Close the session
    async fn disconnect(&self) -> ProbeResult<()>;
}

/// Creates sessions for a set of credentials
pub trait RemoteConnector: Send + Sync {
    fn session(&self, credentials: &Credentials) -> Box<dyn RemoteSession>;
}
