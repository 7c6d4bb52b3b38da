//! Home Assistant MQTT discovery for the bridge device
//!
//! One `binary_sensor` with device class `connectivity` per paired server:
//!
//! ```text
//! <discovery_prefix>/binary_sensor/<id>_connected/config   retained JSON config
//! <base_topic>/<id>/availability                           retained "online"
//! <base_topic>/<id>/connected                              retained "ON"
//! ```
//!
//! `<id>` is the sanitized device label, so publishing the same label twice
//! overwrites the retained messages with identical bytes.

use rp_config::MqttOptions;
use rp_core::sanitize_object_id;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::bus::MessageBus;

pub const DEVICE_MANUFACTURER: &str = "Facepunch Studios";
pub const DEVICE_MODEL: &str = "Rust+ Server";

const PAYLOAD_ON: &str = "ON";
const PAYLOAD_OFF: &str = "OFF";
const PAYLOAD_AVAILABLE: &str = "online";
const PAYLOAD_NOT_AVAILABLE: &str = "offline";

/// Topics used for one bridge device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTopics {
    /// Sanitized device label
    pub object_id: String,
    pub config: String,
    pub availability: String,
    pub state: String,
}

/// Discovery config for the connectivity sensor
#[derive(Serialize)]
struct BinarySensorConfig<'a> {
    name: &'static str,
    unique_id: String,
    object_id: String,
    device_class: &'static str,
    state_topic: &'a str,
    availability_topic: &'a str,
    payload_on: &'static str,
    payload_off: &'static str,
    payload_available: &'static str,
    payload_not_available: &'static str,
    device: DeviceDescriptor,
}

#[derive(Serialize)]
struct DeviceDescriptor {
    identifiers: Vec<String>,
    name: String,
    manufacturer: &'static str,
    model: &'static str,
    sw_version: &'static str,
}

/// Announces bridge devices on the bus
#[derive(Clone)]
pub struct DiscoveryPublisher {
    bus: Arc<dyn MessageBus>,
    discovery_prefix: String,
    base_topic: String,
}

impl DiscoveryPublisher {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        discovery_prefix: impl Into<String>,
        base_topic: impl Into<String>,
    ) -> Self {
        Self {
            bus,
            discovery_prefix: discovery_prefix.into(),
            base_topic: base_topic.into(),
        }
    }

    /// Use the prefixes from the add-on options
    pub fn from_options(bus: Arc<dyn MessageBus>, options: &MqttOptions) -> Self {
        Self::new(bus, &options.discovery_prefix, &options.base_topic)
    }

    /// Topics a label maps to
    pub fn topics(&self, label: &str) -> DiscoveryTopics {
        let object_id = sanitize_object_id(label);
        DiscoveryTopics {
            config: format!(
                "{}/binary_sensor/{}_connected/config",
                self.discovery_prefix, object_id
            ),
            availability: format!("{}/{}/availability", self.base_topic, object_id),
            state: format!("{}/{}/connected", self.base_topic, object_id),
            object_id,
        }
    }

    /// Publish the discovery config, then `online`, then `ON`, all retained
    pub fn publish_discovery(&self, label: &str) {
        let topics = self.topics(label);

        let config = match serde_json::to_vec(&self.sensor_config(label, &topics)) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to serialize discovery config for {}: {}", label, e);
                return;
            }
        };

        self.bus.publish(&topics.config, &config, true);
        self.bus
            .publish(&topics.availability, PAYLOAD_AVAILABLE.as_bytes(), true);
        self.bus.publish(&topics.state, PAYLOAD_ON.as_bytes(), true);

        info!(
            "Published MQTT discovery for {} ({})",
            label, topics.object_id
        );
    }

    fn sensor_config<'a>(
        &self,
        label: &'a str,
        topics: &'a DiscoveryTopics,
    ) -> BinarySensorConfig<'a> {
        let object_id = &topics.object_id;
        BinarySensorConfig {
            name: "Connected",
            unique_id: format!("rustplus_{}_connected", object_id),
            object_id: format!("rustplus_{}_connected", object_id),
            device_class: "connectivity",
            state_topic: &topics.state,
            availability_topic: &topics.availability,
            payload_on: PAYLOAD_ON,
            payload_off: PAYLOAD_OFF,
            payload_available: PAYLOAD_AVAILABLE,
            payload_not_available: PAYLOAD_NOT_AVAILABLE,
            device: DeviceDescriptor {
                identifiers: vec![format!("rustplus_{}", object_id)],
                name: format!("Rust+ {}", label),
                manufacturer: DEVICE_MANUFACTURER,
                model: DEVICE_MODEL,
                sw_version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryBus;

    fn publisher() -> (DiscoveryPublisher, Arc<MemoryBus>) {
        let bus = Arc::new(MemoryBus::new());
        let publisher = DiscoveryPublisher::new(bus.clone(), "homeassistant", "rustplus");
        (publisher, bus)
    }

    #[test]
    fn test_topics_use_sanitized_label() {
        let (publisher, _) = publisher();
        let topics = publisher.topics("1.2.3.4:28082");

        assert_eq!(topics.object_id, "1_2_3_4_28082");
        assert_eq!(
            topics.config,
            "homeassistant/binary_sensor/1_2_3_4_28082_connected/config"
        );
        assert_eq!(topics.availability, "rustplus/1_2_3_4_28082/availability");
        assert_eq!(topics.state, "rustplus/1_2_3_4_28082/connected");
    }

    #[test]
    fn test_publishes_three_retained_messages_in_order() {
        let (publisher, bus) = publisher();
        publisher.publish_discovery("1.2.3.4:28082");

        let messages = bus.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.retain));
        assert!(messages.iter().all(|m| m.topic.contains("1_2_3_4_28082")));

        assert!(messages[0].topic.ends_with("/config"));
        assert_eq!(messages[1].payload_str(), "online");
        assert_eq!(messages[2].payload_str(), "ON");
    }

    #[test]
    fn test_config_payload() {
        let (publisher, bus) = publisher();
        publisher.publish_discovery("1.2.3.4:28082");

        let config: serde_json::Value =
            serde_json::from_slice(&bus.messages()[0].payload).unwrap();
        assert_eq!(config["device_class"], "connectivity");
        assert_eq!(config["unique_id"], "rustplus_1_2_3_4_28082_connected");
        assert_eq!(config["state_topic"], "rustplus/1_2_3_4_28082/connected");
        assert_eq!(
            config["availability_topic"],
            "rustplus/1_2_3_4_28082/availability"
        );
        assert_eq!(config["payload_on"], "ON");
        assert_eq!(config["payload_available"], "online");
        assert_eq!(config["device"]["manufacturer"], DEVICE_MANUFACTURER);
        assert_eq!(config["device"]["model"], DEVICE_MODEL);
        assert_eq!(config["device"]["name"], "Rust+ 1.2.3.4:28082");
        assert_eq!(config["device"]["identifiers"][0], "rustplus_1_2_3_4_28082");
    }

    #[test]
    fn test_republishing_is_byte_identical() {
        let (publisher, bus) = publisher();

        publisher.publish_discovery("1.2.3.4:28082");
        let first = bus.messages();
        bus.clear();
        publisher.publish_discovery("1.2.3.4:28082");

        assert_eq!(bus.messages(), first);
    }

    #[test]
    fn test_custom_prefixes() {
        let bus = Arc::new(MemoryBus::new());
        let options = MqttOptions {
            discovery_prefix: "ha".to_string(),
            base_topic: "rp".to_string(),
            ..MqttOptions::default()
        };
        let publisher = DiscoveryPublisher::from_options(bus.clone(), &options);
        publisher.publish_discovery("srv");

        let topics: Vec<String> = bus.messages().into_iter().map(|m| m.topic).collect();
        assert_eq!(
            topics,
            vec![
                "ha/binary_sensor/srv_connected/config",
                "rp/srv/availability",
                "rp/srv/connected",
            ]
        );
    }
}
