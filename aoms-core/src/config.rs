//! Configuration types for the acquisition core
//!
//! Hosts build these from whatever source they use (datastore rows, files,
//! environment). Every type has a `Default` built from [`crate::constants`],
//! and derives `serde` traits when the `serde` feature is on so a host can
//! deserialize partial documents on top of the defaults.
//!
//! ```rust
//! use aoms_core::config::{AomsConfig, HealthThresholds};
//!
//! let config = AomsConfig {
//!     health: HealthThresholds::strict(),
//!     ..AomsConfig::default()
//! };
//! assert_eq!(config.dedup.window_ms, 200);
//! ```

use alloc::string::{String, ToString};
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::{calibration::*, dedup::*, health::*, time::*},
    errors::SettingsError,
    traits::Row,
};

/// Thresholds for sensor and channel health classification
///
/// Each triple is descending: `high > medium > low`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct HealthThresholds {
    /// Dynamic range for healthy (dB)
    pub dr_high: f64,
    /// Dynamic range for moderate (dB)
    pub dr_medium: f64,
    /// Dynamic range for weak (dB)
    pub dr_low: f64,
    /// Peak power for healthy (dBm)
    pub r_high: f64,
    /// Peak power for moderate (dBm)
    pub r_medium: f64,
    /// Peak power for weak (dBm)
    pub r_low: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            dr_high: HEALTH_DR_HIGH_DB,
            dr_medium: HEALTH_DR_MEDIUM_DB,
            dr_low: HEALTH_DR_LOW_DB,
            r_high: HEALTH_R_HIGH_DBM,
            r_medium: HEALTH_R_MEDIUM_DBM,
            r_low: HEALTH_R_LOW_DBM,
        }
    }
}

impl HealthThresholds {
    /// Tighter thresholds for short, low-loss installations
    pub fn strict() -> Self {
        Self {
            dr_high: 25.0,
            dr_medium: 15.0,
            dr_low: 6.0,
            r_high: -15.0,
            r_medium: -30.0,
            r_low: -45.0,
        }
    }

    /// Whether both triples are strictly descending
    pub fn is_ordered(&self) -> bool {
        self.dr_high > self.dr_medium
            && self.dr_medium > self.dr_low
            && self.r_high > self.r_medium
            && self.r_medium > self.r_low
    }
}

/// Peak detection settings for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ChannelSettings {
    /// Expected peak width (nm)
    pub width: f64,
    /// Absolute floor below which nothing is a peak (dBm)
    pub noise_floor: f64,
    /// Level below the peak where width is measured (dB)
    pub width_level: f64,
    /// Threshold relative to the strongest peak (dB, negative)
    pub rel_threshold: f64,
    /// Fiber length compensation (m)
    pub length: f64,
    /// Peak detection mode
    pub mode: i32,
    /// Minimum separation between peaks (samples)
    pub min_peak_dist: usize,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH_NM,
            noise_floor: DEFAULT_NOISE_FLOOR_DBM,
            width_level: DEFAULT_WIDTH_LEVEL_DB,
            rel_threshold: DEFAULT_REL_THRESHOLD_DB,
            length: DEFAULT_LENGTH_M,
            mode: DEFAULT_DETECTION_MODE,
            min_peak_dist: DEFAULT_MIN_PEAK_DIST,
        }
    }
}

impl ChannelSettings {
    /// Parse a settings row
    ///
    /// Column order: `WIDTH, NOISE_FLOOR, WIDTH_LVL, REL_THRESHOLD, LENGTH, MODE, MIN_PEAK_DIST`.
    pub fn from_row(row: &Row) -> Result<Self, SettingsError> {
        if row.len() != CHANNEL_SETTINGS_COLUMNS {
            return Err(SettingsError::ColumnCount {
                expected: CHANNEL_SETTINGS_COLUMNS,
                found: row.len(),
            });
        }

        let mut values = [0.0; CHANNEL_SETTINGS_COLUMNS];
        for (column, (slot, value)) in values.iter_mut().zip(row.iter()).enumerate() {
            *slot = value.ok_or(SettingsError::NullField { column })?;
        }

        Ok(Self {
            width: values[0],
            noise_floor: values[1],
            width_level: values[2],
            rel_threshold: values[3],
            length: values[4],
            mode: values[5] as i32,
            min_peak_dist: values[6] as usize,
        })
    }
}

/// General acquisition settings shared by all channels
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct GeneralSettings {
    /// Interval between channel scans (ms)
    pub scan_interval_ms: u64,
    /// Settle time after switching channels (ms)
    pub post_switch_wait_ms: u64,
    /// Peak detection mode
    pub peak_detection_mode: i32,
    /// Environment data is written every N cycles
    pub environment_data_interval: u32,
    /// Measurement data is written every N cycles
    pub measured_data_interval: u32,
    /// Interval between spectrum snapshots (s)
    pub spectrum_save_interval_s: u64,
    /// Spectrum snapshot file name
    pub spectrum_file_name: String,
    /// Spectrum snapshot directory
    pub spectrum_path: String,
    /// Instrument detection setting id
    pub detection_setting_id: i32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            post_switch_wait_ms: DEFAULT_POST_SWITCH_WAIT_MS,
            peak_detection_mode: DEFAULT_DETECTION_MODE,
            environment_data_interval: 1,
            measured_data_interval: 1,
            spectrum_save_interval_s: DEFAULT_SPECTRUM_SAVE_INTERVAL_S,
            spectrum_file_name: String::new(),
            spectrum_path: String::new(),
            detection_setting_id: 128,
        }
    }
}

impl GeneralSettings {
    /// Parse the datastore key/value listing
    ///
    /// All keys are required; the first missing or malformed one fails the
    /// whole parse and nothing is applied.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, SettingsError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(Self {
            scan_interval_ms: parse_key(pairs, "INTERVAL_CH_SCAN")?,
            post_switch_wait_ms: parse_key(pairs, "POST_SWITCH_WAIT_TIME")?,
            peak_detection_mode: parse_key(pairs, "PEAK_DETECTION_MODE")?,
            environment_data_interval: parse_key(pairs, "INTERVAL_ENVIRONMENT_DATA")?,
            measured_data_interval: parse_key(pairs, "INTERVAL_MEASURED_DATA")?,
            spectrum_save_interval_s: parse_key(pairs, "INTERVAL_SPECTRUM_SAVE")?,
            spectrum_file_name: lookup(pairs, "SPECTRUM_FILE_NAME")?.to_string(),
            spectrum_path: lookup(pairs, "SPECTRUM_PATH")?.to_string(),
            detection_setting_id: parse_key(pairs, "DETECTION_SETTING_ID")?,
        })
    }

    /// Spectrum snapshot interval (ms)
    pub fn spectrum_save_interval_ms(&self) -> u64 {
        self.spectrum_save_interval_s.saturating_mul(MS_PER_SECOND)
    }
}

/// Internal control flags raised by the configuration front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ConfigFlags {
    /// Channels or sensors changed, repopulate and reload calibration
    pub channel_update: bool,
    /// General settings changed, reload them
    pub general_settings_update: bool,
    /// Acquisition runs against diagnostic channels
    pub diagnostic_mode: bool,
}

impl ConfigFlags {
    /// Key of the channel update flag
    pub const CHANNEL_UPDATE: &'static str = "FLAG_CHANNEL_UPDATE";
    /// Key of the general settings update flag
    pub const GENERAL_SETTINGS_UPDATE: &'static str = "FLAG_GENERAL_SETTINGS_UPDATE";
    /// Key of the diagnostic mode flag
    pub const DIAGNOSTIC_MODE: &'static str = "FLAG_IS_CH_DIAG";

    /// Parse the datastore flag listing
    pub fn from_pairs<K: AsRef<str>>(pairs: &[(K, i64)]) -> Result<Self, SettingsError> {
        let flag = |key: &'static str| {
            pairs
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| *v != 0)
                .ok_or(SettingsError::MissingKey { key })
        };

        Ok(Self {
            channel_update: flag(Self::CHANNEL_UPDATE)?,
            general_settings_update: flag(Self::GENERAL_SETTINGS_UPDATE)?,
            diagnostic_mode: flag(Self::DIAGNOSTIC_MODE)?,
        })
    }
}

/// Deduplication guard parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DedupConfig {
    /// Window within which a repeated frame counter is a duplicate (ms)
    pub window_ms: u64,
    /// Number of independently locked store shards
    pub shards: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_ms: DEDUP_WINDOW_MS,
            shards: DEDUP_SHARDS,
        }
    }
}

/// Complete acquisition configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AomsConfig {
    /// Health thresholds
    pub health: HealthThresholds,
    /// Settings applied to channels whose settings row is malformed
    pub channel_defaults: ChannelSettings,
    /// General acquisition settings
    pub general: GeneralSettings,
    /// Deduplication guard parameters
    pub dedup: DedupConfig,
}

fn lookup<'a, K, V>(pairs: &'a [(K, V)], key: &'static str) -> Result<&'a str, SettingsError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .find(|(k, _)| k.as_ref() == key)
        .map(|(_, v)| v.as_ref())
        .ok_or(SettingsError::MissingKey { key })
}

fn parse_key<T, K, V>(pairs: &[(K, V)], key: &'static str) -> Result<T, SettingsError>
where
    T: FromStr,
    K: AsRef<str>,
    V: AsRef<str>,
{
    lookup(pairs, key)?
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue { key })
}
