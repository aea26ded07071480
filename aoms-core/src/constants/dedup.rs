//! Message Deduplication Parameters
//!
//! LoRa gateways in overlapping coverage forward the same uplink to the
//! network server within a few hundred milliseconds of each other.

/// Window within which a repeated frame counter is a duplicate (ms).
pub const DEDUP_WINDOW_MS: u64 = 200;

/// Number of independently locked shards in the deduplication store.
pub const DEDUP_SHARDS: usize = 16;
