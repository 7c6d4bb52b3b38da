//! User-maintained device lists

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single in-game device the user wants bridged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    #[serde(default)]
    pub name: String,
    /// Rust+ entity ID as shown by the pairing notification
    #[serde(alias = "entityId")]
    pub entity_id: u32,
}

/// The three device collections, in the order the user entered them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceLists {
    pub switches: Vec<DeviceEntry>,
    pub alarms: Vec<DeviceEntry>,
    pub cameras: Vec<DeviceEntry>,
}

/// Which device list a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Switch,
    Alarm,
    Camera,
}

impl DeviceKind {
    /// Form field / JSON key carrying this list
    pub fn field(&self) -> &'static str {
        match self {
            DeviceKind::Switch => "switches",
            DeviceKind::Alarm => "alarms",
            DeviceKind::Camera => "cameras",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Error parsing a submitted device list
#[derive(Debug, Error)]
#[error("invalid {kind} list: {source}")]
pub struct DeviceListError {
    pub kind: DeviceKind,
    #[source]
    pub source: serde_json::Error,
}

impl DeviceLists {
    /// Parse the three lists from raw JSON array text
    ///
    /// A missing or blank list is an empty list. All three are parsed before
    /// anything is returned, so a malformed list never yields a partial
    /// result.
    pub fn parse(
        switches: Option<&str>,
        alarms: Option<&str>,
        cameras: Option<&str>,
    ) -> Result<Self, DeviceListError> {
        Ok(Self {
            switches: parse_list(DeviceKind::Switch, switches)?,
            alarms: parse_list(DeviceKind::Alarm, alarms)?,
            cameras: parse_list(DeviceKind::Camera, cameras)?,
        })
    }

    /// Total number of configured devices
    pub fn len(&self) -> usize {
        self.switches.len() + self.alarms.len() + self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_list(kind: DeviceKind, raw: Option<&str>) -> Result<Vec<DeviceEntry>, DeviceListError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => {
            serde_json::from_str(text).map_err(|source| DeviceListError { kind, source })
        }
    }
}
