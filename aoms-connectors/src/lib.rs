//! Network telemetry ingestion for AOMS
//!
//! ## Overview
//!
//! Field devices that are not on a fiber report over LoRaWAN. The network
//! server publishes every received uplink as a JSON event, once per gateway
//! that heard it. This crate turns those events into accepted uplinks:
//!
//! ```text
//! MQTT publish ─► UplinkEvent::from_json ─► DedupGuard ─► UplinkHandler
//!                  (EUI check, base64)       (fcnt window)  (host storage)
//! ```
//!
//! ## Modules
//!
//! - [`uplink`]: network-server event format and payload decoding
//! - [`signal`]: radio link quality score
//! - [`ingest`] (`std`): dedup-gated ingestion into an async handler
//! - [`mqtt`] (`mqtt`): broker subscription spawning one task per publish
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use aoms_connectors::{ingest::{Uplink, UplinkHandler, UplinkIngestor}, ConnectorError};
//! use aoms_core::{config::DedupConfig, DedupGuard};
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl UplinkHandler for Printer {
//!     async fn handle(&self, uplink: Uplink) -> Result<(), ConnectorError> {
//!         println!("{} fcnt={} {:.0}%", uplink.dev_eui, uplink.f_cnt, uplink.signal_strength);
//!         Ok(())
//!     }
//! }
//!
//! # async fn run(raw: &[u8]) -> Result<(), ConnectorError> {
//! let guard = Arc::new(DedupGuard::new(DedupConfig::default()));
//! let ingestor = UplinkIngestor::new(guard, Arc::new(Printer));
//! ingestor.ingest(raw).await?;
//! # Ok(())
//! # }
//! ```

pub mod signal;
pub mod uplink;

#[cfg(feature = "std")]
pub mod ingest;

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types
pub use signal::signal_strength_percentage;
pub use uplink::{is_valid_eui, RxInfo, UplinkError, UplinkEvent};

#[cfg(feature = "std")]
pub use ingest::{IngestOutcome, IngestStats, Uplink, UplinkHandler, UplinkIngestor};

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttError, UplinkSubscriber};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Uplink rejected: {0}")]
    Uplink(#[from] UplinkError),

    #[error("Handler failed: {0}")]
    Handler(String),
}
