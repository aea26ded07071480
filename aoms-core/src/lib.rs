//! Acquisition core for the AOMS optical monitoring platform
//!
//! Turns per-scan optical spectra into calibrated sensor measurements and
//! signal health, and filters repeated network telemetry deliveries.
//!
//! Two independent paths live here:
//! - **Channel pipeline**: peaks measured on a fiber channel are assigned to
//!   the sensors whose calibrated windows contain them, converted into
//!   physical units and classified for health. Pure, synchronous, no I/O.
//! - **Deduplication guard** (`std`): decides whether a device message is a
//!   repeat delivery of the one just seen.
//!
//! All datastore access goes through the collaborator traits in [`traits`].
//!
//! ```no_run
//! use aoms_core::{Channel, Sensor, SensorKind};
//! use aoms_core::sensor::TemperatureCalibration;
//!
//! let mut channel = Channel::new(1, "FBG-0001", true, 0);
//! let mut sensor = Sensor::new(1, 1001, 1, SensorKind::Temperature);
//! sensor.apply_temperature_calibration(TemperatureCalibration {
//!     lambda_a: 1.0, lambda_b: 1540.0, g1: 0.0, g2: 100.0,
//!     constant: 0.0, t0: 20.0, offset: 0.0,
//!     lower_bound: 1540.0, upper_bound: 1542.0,
//! });
//! channel.set_sensors(vec![sensor]);
//!
//! channel.assign_wavelengths(&[1540.25]);
//! channel.calc_measurement();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod acquisition;
pub mod channel;
pub mod config;
pub mod constants;
pub mod detect;
pub mod errors;
pub mod peak;
pub mod scan;
pub mod sensor;
pub mod time;
pub mod traits;

#[cfg(feature = "std")]
pub mod dedup;

// Public API
pub use acquisition::{Acquisition, ChannelReport, CycleReport};
pub use channel::Channel;
pub use config::{AomsConfig, ChannelSettings, ConfigFlags, DedupConfig, GeneralSettings, HealthThresholds};
pub use errors::{AomsError, AomsResult, CalibrationError, ScanError, SettingsError, StoreError};
pub use peak::Peak;
pub use scan::SpectrumScan;
pub use sensor::{compute_measurement, ChannelHealth, Calibration, Sensor, SensorHealth, SensorKind};
pub use traits::{CalibrationStore, PersistenceSink, SpectrumSource, TimeSource};

#[cfg(feature = "std")]
pub use dedup::{DedupGuard, DedupStats};

/// Crate version, sent with every heartbeat
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
