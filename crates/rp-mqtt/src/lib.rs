//! MQTT side of the Rust+ bridge
//!
//! Publishes Home Assistant MQTT discovery for the bridge's connectivity
//! sensor. Publishing is fire-and-forget: the [`MessageBus`] queues or drops
//! internally and nothing here waits for broker acknowledgement.

mod bus;
mod client;
mod discovery;

pub use bus::{MemoryBus, MessageBus, PublishedMessage};
pub use client::MqttBus;
pub use discovery::{DiscoveryPublisher, DiscoveryTopics, DEVICE_MANUFACTURER, DEVICE_MODEL};
