//! Probe errors

use std::time::Duration;
use thiserror::Error;

/// Why a probe did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// One or more credential fields are empty; nothing was attempted
    #[error("missing credentials: import server, port, Steam ID and player token first")]
    MissingCredentials,

    /// Neither a response nor an error arrived before the deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connect or request failure reported by the transport
    #[error("{0}")]
    Transport(String),
}

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;
