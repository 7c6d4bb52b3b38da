//! Rust+ pairing credentials

use serde::{Deserialize, Serialize};

/// Credentials produced by a Rust+ pairing tool
///
/// Serialized with the key names used by the add-on's `state.json`
/// (`steam_id`, `player_token`) so files written by earlier versions load
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Server host name or IP address
    pub server: String,
    /// Rust+ app port, `0` when unset
    pub port: u16,
    /// Steam ID of the paired player
    #[serde(rename = "steam_id")]
    pub account_id: String,
    /// Player token issued by the game server
    #[serde(rename = "player_token")]
    pub session_token: String,
}

impl Credentials {
    /// Whether every field needed to open a session is present
    pub fn is_paired(&self) -> bool {
        !self.server.is_empty()
            && self.port != 0
            && !self.account_id.is_empty()
            && !self.session_token.is_empty()
    }

    /// `server:port`, the label the bridge device is announced under
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired() -> Credentials {
        Credentials {
            server: "1.2.3.4".to_string(),
            port: 28082,
            account_id: "76561198000000000".to_string(),
            session_token: "-123456".to_string(),
        }
    }

    #[test]
    fn test_paired_requires_all_fields() {
        assert!(paired().is_paired());
        assert!(!Credentials::default().is_paired());

        let mut c = paired();
        c.port = 0;
        assert!(!c.is_paired());

        let mut c = paired();
        c.session_token.clear();
        assert!(!c.is_paired());

        let mut c = paired();
        c.account_id.clear();
        assert!(!c.is_paired());
    }

    #[test]
    fn test_serialized_key_names() {
        let json = serde_json::to_value(paired()).unwrap();
        assert_eq!(json["server"], "1.2.3.4");
        assert_eq!(json["port"], 28082);
        assert_eq!(json["steam_id"], "76561198000000000");
        assert_eq!(json["player_token"], "-123456");
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(paired().endpoint(), "1.2.3.4:28082");
    }
}
