//! rumqttc-backed [`MessageBus`]

use rp_config::MqttOptions;
use rumqttc::{AsyncClient, ConnectionError, Event, MqttOptions as ClientOptions, Packet, QoS};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::bus::MessageBus;

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const REQUEST_CAPACITY: usize = 10;

/// MQTT connection to the Home Assistant broker
///
/// Publishing only enqueues onto the client's request channel; the event
/// loop runs on a background task and reconnects on its own.
#[derive(Clone)]
pub struct MqttBus {
    client: AsyncClient,
}

impl MqttBus {
    /// Create the client and spawn its event loop
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(options: &MqttOptions) -> Self {
        let client_id = format!("rustplus_bridge_{}", Uuid::new_v4().simple());
        let mut client_options = ClientOptions::new(client_id, &options.host, options.port);
        client_options.set_keep_alive(KEEP_ALIVE);

        if let Some((username, password)) = options.credentials() {
            client_options.set_credentials(username, password);
        }

        let (client, mut event_loop) = AsyncClient::new(client_options, REQUEST_CAPACITY);
        let broker = options.broker_url();

        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("MQTT connected: {}", broker);
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        warn!("MQTT broker closed the connection: {}", broker);
                    }
                    Ok(event) => debug!("MQTT event: {:?}", event),
                    Err(ConnectionError::RequestsDone) => {
                        debug!("MQTT client dropped, stopping event loop");
                        break;
                    }
                    Err(e) => {
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Self { client }
    }
}

impl MessageBus for MqttBus {
    fn publish(&self, topic: &str, payload: &[u8], retain: bool) {
        if let Err(e) = self
            .client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload.to_vec())
        {
            warn!("Dropping MQTT publish to {}: {}", topic, e);
        }
    }
}
