//! Calibration Row Layout and Sensor Type Codes

/// Measurement reported when a sensor has no assigned peak.
///
/// Out of band for every supported quantity so downstream consumers can
/// filter it without a separate validity flag.
pub const NO_READING_SENTINEL: f64 = -99.0;

/// Column count of a temperature calibration row.
///
/// Order: `LAMBDA_A, T0, G1, G2, CONST, LBOUND, HBOUND, LAMBDA_B, OFFSET`.
pub const TEMPERATURE_CALIBRATION_COLUMNS: usize = 9;

/// Column count of a channel settings row.
///
/// Order: `WIDTH, NOISE_FLOOR, WIDTH_LVL, REL_THRESHOLD, LENGTH, MODE, MIN_PEAK_DIST`.
pub const CHANNEL_SETTINGS_COLUMNS: usize = 7;

/// Lowest valid channel id. Channel ids are 1-based in the datastore.
pub const MIN_CHANNEL_ID: u32 = 1;

/// Datastore type code for temperature sensors.
pub const SENSOR_CODE_TEMPERATURE: i32 = 1;

/// Datastore type code for humidity sensors.
pub const SENSOR_CODE_HUMIDITY: i32 = 3;

/// Datastore type code for pressure sensors.
pub const SENSOR_CODE_PRESSURE: i32 = 4;

// ===== DEFAULT CHANNEL SETTINGS =====
// Applied when a channel settings row is present but malformed.

/// Default peak width (nm).
pub const DEFAULT_WIDTH_NM: f64 = 0.05;

/// Default absolute noise floor for peak detection (dBm).
pub const DEFAULT_NOISE_FLOOR_DBM: f64 = -50.0;

/// Default width level (dB below peak at which width is measured).
pub const DEFAULT_WIDTH_LEVEL_DB: f64 = 3.0;

/// Default detection threshold relative to the strongest peak (dB).
pub const DEFAULT_REL_THRESHOLD_DB: f64 = -8.0;

/// Default fiber length compensation (m).
pub const DEFAULT_LENGTH_M: f64 = 0.0;

/// Default peak detection mode.
pub const DEFAULT_DETECTION_MODE: i32 = 1;

/// Default minimum distance between two detected peaks (samples).
pub const DEFAULT_MIN_PEAK_DIST: usize = 50;
