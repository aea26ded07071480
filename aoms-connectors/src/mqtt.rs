//! MQTT uplink subscriber
//!
//! Subscribes to the network server's uplink topic and hands every inbound
//! publish to an [`UplinkIngestor`] on its own tokio task, so a slow handler
//! never stalls the event loop. The subscription is renewed on every
//! `CONNACK`, which covers broker restarts with a clean session.

use std::time::Duration;

use aoms_core::TimeSource;
use rumqttc::{AsyncClient, ClientError, ConnectionError, Event, MqttOptions, Packet, Publish, QoS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::{IngestOutcome, UplinkHandler, UplinkIngestor};

/// Topic filter matching every device uplink of every application
pub const UPLINK_TOPIC_FILTER: &str = "application/+/device/+/rx";

#[derive(Debug, Error)]
pub enum MqttError {
    #[error("Client request failed: {0}")]
    Client(#[from] ClientError),

    #[error("Connection failed: {0}")]
    Connection(#[from] ConnectionError),
}

/// Broker connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic_filter: String,
    pub keep_alive_s: u64,
    /// Request channel capacity
    pub capacity: usize,
    /// Pause before polling again after a connection error (ms)
    pub reconnect_delay_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "aoms-uplink".to_string(),
            topic_filter: UPLINK_TOPIC_FILTER.to_string(),
            keep_alive_s: 30,
            capacity: 64,
            reconnect_delay_ms: 5_000,
        }
    }
}

/// Long-running uplink subscription
pub struct UplinkSubscriber<H, C: TimeSource = aoms_core::time::SystemTime> {
    config: MqttConfig,
    ingestor: UplinkIngestor<H, C>,
}

impl<H, C> UplinkSubscriber<H, C>
where
    H: UplinkHandler + 'static,
    C: TimeSource + Sync + 'static,
{
    pub fn new(config: MqttConfig, ingestor: UplinkIngestor<H, C>) -> Self {
        Self { config, ingestor }
    }

    /// Poll the broker indefinitely
    ///
    /// Connection errors are logged and retried after the configured delay;
    /// only a failed subscribe request ends the loop.
    pub async fn run(self) -> Result<(), MqttError> {
        let mut options = MqttOptions::new(&self.config.client_id, &self.config.host, self.config.port);
        options.set_keep_alive(Duration::from_secs(self.config.keep_alive_s));

        let (client, mut eventloop) = AsyncClient::new(options, self.config.capacity);
        let reconnect_delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    log::info!("connected to {}:{}, subscribing to {}", self.config.host, self.config.port, self.config.topic_filter);
                    client.subscribe(&self.config.topic_filter, QoS::AtLeastOnce).await?;
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let ingestor = self.ingestor.clone();
                    tokio::spawn(async move {
                        forward(&ingestor, &publish).await;
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("broker connection error: {}", MqttError::from(e));
                    tokio::time::sleep(reconnect_delay).await;
                }
            }
        }
    }
}

/// Ingest one publish, logging a rejection against its topic
async fn forward<H, C>(ingestor: &UplinkIngestor<H, C>, publish: &Publish) -> Option<IngestOutcome>
where
    H: UplinkHandler,
    C: TimeSource + Sync,
{
    match ingestor.ingest(&publish.payload).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            log::debug!("{}: {}", publish.topic, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use aoms_core::{config::DedupConfig, time::MockTimeSource, DedupGuard};
    use tokio::sync::Mutex;

    use crate::{ConnectorError, Uplink};

    #[derive(Default)]
    struct Store {
        uplinks: Mutex<Vec<Uplink>>,
    }

    #[async_trait::async_trait]
    impl UplinkHandler for Store {
        async fn handle(&self, uplink: Uplink) -> Result<(), ConnectorError> {
            self.uplinks.lock().await.push(uplink);
            Ok(())
        }
    }

    fn publish(payload: &str) -> Publish {
        Publish::new("application/3/device/70b3d57ed0001234/rx", QoS::AtLeastOnce, payload.as_bytes().to_vec())
    }

    fn ingestor(store: Arc<Store>) -> UplinkIngestor<Store, Arc<MockTimeSource>> {
        let clock = Arc::new(MockTimeSource::new(0));
        UplinkIngestor::new(Arc::new(DedupGuard::with_clock(DedupConfig::default(), clock)), store)
    }

    #[tokio::test]
    async fn publish_payload_reaches_handler_once() {
        let store = Arc::new(Store::default());
        let ingestor = ingestor(Arc::clone(&store));
        let frame = publish(r#"{"devEUI":"70b3d57ed0001234","fCnt":12,"fPort":2,"data":"AQI="}"#);

        assert_eq!(forward(&ingestor, &frame).await, Some(IngestOutcome::Accepted));
        assert_eq!(forward(&ingestor, &frame).await, Some(IngestOutcome::Duplicate));

        let uplinks = store.uplinks.lock().await;
        assert_eq!(uplinks.len(), 1);
        assert_eq!(uplinks[0].f_cnt, 12);
        assert_eq!(uplinks[0].payload, vec![1, 2]);
    }

    #[tokio::test]
    async fn malformed_publish_is_dropped() {
        let store = Arc::new(Store::default());
        let ingestor = ingestor(Arc::clone(&store));

        assert_eq!(forward(&ingestor, &publish("{}")).await, None);
        assert_eq!(ingestor.stats().rejected, 1);
        assert!(store.uplinks.lock().await.is_empty());
    }

    #[test]
    fn default_config_subscribes_to_all_uplinks() {
        let config = MqttConfig::default();
        assert_eq!(config.topic_filter, UPLINK_TOPIC_FILTER);
        assert_eq!(config.port, 1883);
    }
}
