//! Time Unit Conversions

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Default interval between channel scans (ms).
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 1000;

/// Default settle time after switching the optical channel (ms).
pub const DEFAULT_POST_SWITCH_WAIT_MS: u64 = 750;

/// Default interval between spectrum snapshots (s).
pub const DEFAULT_SPECTRUM_SAVE_INTERVAL_S: u64 = 60;
