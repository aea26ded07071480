//! Dedup-gated uplink ingestion
//!
//! [`UplinkIngestor`] is shared between concurrently running decode tasks.
//! Each raw event is parsed, checked against the [`DedupGuard`], decoded and
//! forwarded to the host's [`UplinkHandler`]. Repeats of a frame that was
//! already forwarded never reach the handler.
//!
//! A frame is committed to the guard before the handler runs. If the handler
//! fails, the remaining gateway copies inside the window are still reported
//! as duplicates, so retrying a failed store is the handler's job.

use std::sync::{Arc, Mutex};

use aoms_core::{time::SystemTime, DedupGuard, TimeSource};
use async_trait::async_trait;

use crate::{uplink::UplinkEvent, ConnectorError};

/// An accepted, decoded uplink
#[derive(Debug, Clone, PartialEq)]
pub struct Uplink {
    pub dev_eui: String,
    pub device_name: Option<String>,
    pub f_cnt: u32,
    pub f_port: u8,
    pub payload: Vec<u8>,
    pub rssi: Option<i32>,
    pub snr: Option<f64>,
    /// Best gateway link score (%)
    pub signal_strength: f64,
}

/// Receives accepted uplinks
#[async_trait]
pub trait UplinkHandler: Send + Sync {
    async fn handle(&self, uplink: Uplink) -> Result<(), ConnectorError>;
}

/// What happened to one raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Forwarded to the handler
    Accepted,
    /// Repeat delivery, dropped
    Duplicate,
}

/// Ingestion counters
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    /// Raw events received
    pub received: u64,
    /// Events forwarded to the handler
    pub accepted: u64,
    /// Repeat deliveries dropped
    pub duplicates: u64,
    /// Events that failed to parse or that the handler refused
    pub rejected: u64,
    /// Last error message
    pub last_error: Option<String>,
}

/// Parses, deduplicates and forwards uplinks
pub struct UplinkIngestor<H, C = SystemTime>
where
    C: TimeSource,
{
    guard: Arc<DedupGuard<C>>,
    handler: Arc<H>,
    stats: Arc<Mutex<IngestStats>>,
}

impl<H, C> UplinkIngestor<H, C>
where
    H: UplinkHandler,
    C: TimeSource + Sync,
{
    pub fn new(guard: Arc<DedupGuard<C>>, handler: Arc<H>) -> Self {
        Self {
            guard,
            handler,
            stats: Arc::new(Mutex::new(IngestStats::default())),
        }
    }

    /// Ingest one raw event
    pub async fn ingest(&self, raw: &[u8]) -> Result<IngestOutcome, ConnectorError> {
        self.update_stats(|s| s.received += 1);

        let result = self.process(raw).await;

        match &result {
            Ok(IngestOutcome::Accepted) => self.update_stats(|s| s.accepted += 1),
            Ok(IngestOutcome::Duplicate) => self.update_stats(|s| s.duplicates += 1),
            Err(e) => {
                log::warn!("uplink rejected: {}", e);
                let message = e.to_string();
                self.update_stats(|s| {
                    s.rejected += 1;
                    s.last_error = Some(message);
                });
            }
        }

        result
    }

    async fn process(&self, raw: &[u8]) -> Result<IngestOutcome, ConnectorError> {
        let event = UplinkEvent::from_json(raw)?;

        if self.guard.is_duplicate(&event.dev_eui, event.f_cnt) {
            log::debug!("{}: duplicate fcnt {}", event.dev_eui, event.f_cnt);
            return Ok(IngestOutcome::Duplicate);
        }

        let payload = event.payload()?;
        let best = event.best_gateway();

        let uplink = Uplink {
            rssi: best.and_then(|g| g.rssi),
            snr: best.and_then(|g| g.lora_snr),
            signal_strength: event.signal_strength(),
            dev_eui: event.dev_eui,
            device_name: event.device_name,
            f_cnt: event.f_cnt,
            f_port: event.f_port,
            payload,
        };

        self.handler.handle(uplink).await?;
        Ok(IngestOutcome::Accepted)
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> IngestStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_else(|p| p.into_inner().clone())
    }

    fn update_stats(&self, f: impl FnOnce(&mut IngestStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut stats);
    }
}

impl<H, C: TimeSource> Clone for UplinkIngestor<H, C> {
    fn clone(&self) -> Self {
        Self {
            guard: Arc::clone(&self.guard),
            handler: Arc::clone(&self.handler),
            stats: Arc::clone(&self.stats),
        }
    }
}
