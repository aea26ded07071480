//! Constants for the AOMS acquisition core
//!
//! Every numeric default used by the pipeline is defined here with its unit
//! and origin, grouped by domain:
//! - **Health**: dynamic-range and peak-power thresholds for signal health
//! - **Calibration**: calibration row layout, sentinels and sensor type codes
//! - **Dedup**: replay-suppression window and store sharding
//! - **Time**: unit conversions
//!
//! ## Usage Guidelines
//!
//! 1. Use these constants instead of magic numbers
//! 2. Include the unit in the constant name
//! 3. Prefer overriding through [`crate::config`] over editing defaults

/// Signal health thresholds.
pub mod health;

/// Calibration row layout, sentinels and sensor type codes.
pub mod calibration;

/// Message deduplication parameters.
pub mod dedup;

/// Time unit conversions.
pub mod time;

pub use health::{
    HEALTH_DR_HIGH_DB, HEALTH_DR_MEDIUM_DB, HEALTH_DR_LOW_DB,
    HEALTH_R_HIGH_DBM, HEALTH_R_MEDIUM_DBM, HEALTH_R_LOW_DBM,
};

pub use calibration::{
    NO_READING_SENTINEL, TEMPERATURE_CALIBRATION_COLUMNS, CHANNEL_SETTINGS_COLUMNS,
};

pub use dedup::{DEDUP_WINDOW_MS, DEDUP_SHARDS};

pub use time::MS_PER_SECOND;
