//! Signal Health Thresholds
//!
//! Health is derived from the reflected power slice under each sensor window.
//! Two signals are classified independently and the worse one wins:
//!
//! ```text
//! dynamic range  dr = max(P) - min(P)   [dB]   → reflection contrast
//! peak power     r  = max(P)            [dBm]  → link budget
//! ```
//!
//! A classification level is reached only when the signal is *strictly*
//! greater than its threshold.

/// Dynamic range above which a grating reflection is healthy (dB).
///
/// A clean FBG reflection sits 20 dB or more above the channel floor.
pub const HEALTH_DR_HIGH_DB: f64 = 20.0;

/// Dynamic range above which a reflection is moderate (dB).
///
/// Also the healthy cut-off for channels without sensors.
pub const HEALTH_DR_MEDIUM_DB: f64 = 10.0;

/// Dynamic range above which a reflection is weak but present (dB).
///
/// At or below this the window holds noise only.
pub const HEALTH_DR_LOW_DB: f64 = 3.0;

/// Peak power above which the link is healthy (dBm).
pub const HEALTH_R_HIGH_DBM: f64 = -20.0;

/// Peak power above which the link is moderate (dBm).
pub const HEALTH_R_MEDIUM_DBM: f64 = -35.0;

/// Peak power above which the link is weak (dBm).
///
/// Typical interrogator noise floor sits around -50 dBm.
pub const HEALTH_R_LOW_DBM: f64 = -50.0;
