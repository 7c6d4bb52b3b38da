//! Add-on options
//!
//! Mirrors the `options` schema of the add-on's `config.yaml`:
//!
//! ```json
//! {
//!   "mqtt": {
//!     "host": "core-mosquitto",
//!     "port": 1883,
//!     "username": "",
//!     "password": "",
//!     "discovery_prefix": "homeassistant",
//!     "base_topic": "rustplus"
//!   },
//!   "poll_seconds": 5
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::error::{ConfigError, ConfigResult};

/// Where the Supervisor writes the add-on options
pub const DEFAULT_OPTIONS_PATH: &str = "/data/options.json";

/// MQTT broker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttOptions {
    /// Broker host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Broker port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Broker username (empty means anonymous)
    #[serde(default)]
    pub username: Option<String>,

    /// Broker password
    #[serde(default)]
    pub password: Option<String>,

    /// Home Assistant MQTT discovery prefix
    #[serde(default = "default_discovery_prefix")]
    pub discovery_prefix: String,

    /// Prefix for the bridge's own state topics
    #[serde(default = "default_base_topic")]
    pub base_topic: String,
}

impl Default for MqttOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            discovery_prefix: default_discovery_prefix(),
            base_topic: default_base_topic(),
        }
    }
}

impl MqttOptions {
    /// `mqtt://host:port`, for logging
    pub fn broker_url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }

    /// Username/password pair, if a non-empty username is configured
    ///
    /// The Supervisor UI stores cleared fields as empty strings, so those are
    /// treated as absent.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some((username, self.password.as_deref().unwrap_or("")))
    }
}

/// Top-level add-on options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonOptions {
    #[serde(default)]
    pub mqtt: MqttOptions,

    /// Device polling interval; reserved for the sync loop
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: u64,
}

impl Default for AddonOptions {
    fn default() -> Self {
        Self {
            mqtt: MqttOptions::default(),
            poll_seconds: default_poll_seconds(),
        }
    }
}

impl AddonOptions {
    /// Reject values that cannot be used to reach the broker
    pub fn validate(&self) -> ConfigResult<()> {
        if self.mqtt.host.trim().is_empty() {
            return Err(invalid("mqtt.host", "must not be empty"));
        }
        if self.mqtt.port == 0 {
            return Err(invalid("mqtt.port", "must be between 1 and 65535"));
        }
        if self.mqtt.discovery_prefix.trim().is_empty() {
            return Err(invalid("mqtt.discovery_prefix", "must not be empty"));
        }
        if self.mqtt.base_topic.trim().is_empty() {
            return Err(invalid("mqtt.base_topic", "must not be empty"));
        }
        if self.poll_seconds == 0 {
            return Err(invalid("poll_seconds", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn default_host() -> String {
    "core-mosquitto".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_discovery_prefix() -> String {
    "homeassistant".to_string()
}

fn default_base_topic() -> String {
    "rustplus".to_string()
}

fn default_poll_seconds() -> u64 {
    5
}

/// Load and validate options from a JSON file
pub fn load_options(path: impl AsRef<Path>) -> ConfigResult<AddonOptions> {
    let path = path.as_ref();
    debug!("Loading add-on options: {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let options: AddonOptions =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source: e,
        })?;

    options.validate()?;
    Ok(options)
}

/// Load options, falling back to the built-in defaults on any error
pub fn load_or_default(path: impl AsRef<Path>) -> AddonOptions {
    match load_options(path) {
        Ok(options) => options,
        Err(e) => {
            error!("Failed to load add-on options, using defaults: {}", e);
            AddonOptions::default()
        }
    }
}
