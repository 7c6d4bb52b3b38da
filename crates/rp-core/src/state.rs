//! The persisted bridge state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::devices::DeviceLists;

/// Message recorded before any probe has run
pub const OUTCOME_UNTESTED: &str = "untested";

/// Result of the most recent connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOutcome {
    pub ok: bool,
    pub message: String,
    /// When the probe that produced this outcome finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionOutcome {
    fn default() -> Self {
        Self {
            ok: false,
            message: OUTCOME_UNTESTED.to_string(),
            checked_at: None,
        }
    }
}

impl ConnectionOutcome {
    /// A successful probe
    pub fn success() -> Self {
        Self {
            ok: true,
            message: "connected".to_string(),
            checked_at: Some(Utc::now()),
        }
    }

    /// A failed probe, message recorded verbatim
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            checked_at: Some(Utc::now()),
        }
    }

    /// Whether no probe has been recorded yet
    pub fn is_untested(&self) -> bool {
        self.checked_at.is_none() && self.message == OUTCOME_UNTESTED
    }
}

/// Everything the bridge keeps on disk
///
/// JSON format:
/// ```json
/// {
///   "rust": { "server": "", "port": 0, "steam_id": "", "player_token": "" },
///   "devices": { "switches": [], "alarms": [], "cameras": [] },
///   "connection": { "ok": false, "message": "untested" }
/// }
/// ```
///
/// Every group defaults when absent, so older and newer files both load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    #[serde(rename = "rust")]
    pub credentials: Credentials,
    pub devices: DeviceLists,
    pub connection: ConnectionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_outcome_is_untested() {
        let outcome = ConnectionOutcome::default();
        assert!(!outcome.ok);
        assert!(outcome.is_untested());
        assert!(!ConnectionOutcome::failure("boom").is_untested());
    }

    #[test]
    fn test_loads_original_shape_without_connection() {
        let state: PersistedState = serde_json::from_value(json!({
            "rust": {"server": "1.2.3.4", "port": 28082, "steam_id": "7656", "player_token": "42"},
            "devices": {"switches": [{"name": "Lights", "entity_id": 7}], "alarms": [], "cameras": []}
        }))
        .unwrap();

        assert!(state.credentials.is_paired());
        assert_eq!(state.devices.switches[0].entity_id, 7);
        assert!(state.connection.is_untested());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let state: PersistedState =
            serde_json::from_value(json!({"rust": {"server": "h"}, "future": {"x": 1}})).unwrap();
        assert_eq!(state.credentials.server, "h");
        assert_eq!(state.credentials.port, 0);
    }

    #[test]
    fn test_untested_outcome_omits_timestamp() {
        let json = serde_json::to_value(PersistedState::default()).unwrap();
        assert_eq!(
            json["connection"],
            json!({"ok": false, "message": "untested"})
        );
    }
}
