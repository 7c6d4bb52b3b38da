//! The probe itself

use rp_core::Credentials;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::session::{RemoteConnector, RemoteSession};

/// Probe timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Hard upper bound for connect + settle + request
    pub timeout: Duration,
    /// Pause between connecting and issuing the request
    pub settle: Duration,
    /// Upper bound for closing the session afterwards
    pub teardown: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            settle: Duration::from_secs(1),
            teardown: Duration::from_secs(3),
        }
    }
}

/// Runs connectivity probes through a [`RemoteConnector`]
#[derive(Clone)]
pub struct Prober {
    connector: Arc<dyn RemoteConnector>,
    config: ProbeConfig,
}

impl Prober {
    pub fn new(connector: Arc<dyn RemoteConnector>) -> Self {
        Self::with_config(connector, ProbeConfig::default())
    }

    pub fn with_config(connector: Arc<dyn RemoteConnector>, config: ProbeConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Check that the server behind `credentials` answers
    ///
    /// Unpaired credentials fail with [`ProbeError::MissingCredentials`]
    /// before any session is created. Otherwise the attempt is raced against
    /// [`ProbeConfig::timeout`]; when the deadline wins the attempt future is
    /// dropped, so no late result can be reported. The session is
    /// disconnected exactly once afterwards and teardown failures never
    /// replace the probe outcome.
    pub async fn probe(&self, credentials: &Credentials) -> ProbeResult<()> {
        if !credentials.is_paired() {
            warn!("Probe skipped: credentials incomplete");
            return Err(ProbeError::MissingCredentials);
        }

        let endpoint = credentials.endpoint();
        info!("Probing Rust+ server {}", endpoint);

        let session = self.connector.session(credentials);
        let attempt = async {
            session.connect().await?;
            sleep(self.config.settle).await;
            session.check_alive().await
        };

        let outcome = match timeout(self.config.timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.config.timeout)),
        };

        self.teardown(session.as_ref(), &endpoint).await;

        match &outcome {
            Ok(()) => info!("Rust+ server {} is reachable", endpoint),
            Err(e) => warn!("Rust+ server {} probe failed: {}", endpoint, e),
        }
        outcome
    }

    async fn teardown(&self, session: &dyn RemoteSession, endpoint: &str) {
        match timeout(self.config.teardown, session.disconnect()).await {
            Ok(Ok(())) => debug!("Closed probe session to {}", endpoint),
            Ok(Err(e)) => debug!("Ignoring disconnect error from {}: {}", endpoint, e),
            Err(_) => warn!("Disconnect from {} did not finish in time", endpoint),
        }
    }
}
