//! Error Types for Acquisition Failures
//!
//! ## Design Philosophy
//!
//! Errors follow the same rules as the rest of the crate's hot path:
//!
//! 1. **Small and Copy**: every variant carries only numbers, sensor kinds or
//!    `&'static str`, so errors can be stored in cycle reports and returned
//!    by value.
//! 2. **Contained**: a calibration or settings failure is scoped to one sensor
//!    or one channel. Callers log it and keep going; nothing here aborts a
//!    scan cycle.
//!
//! ## Error Categories
//!
//! ### Configuration
//! - [`CalibrationError`]: a sensor's calibration row is missing, has nulls,
//!   or has the wrong shape. The sensor keeps reporting the sentinel value.
//! - [`SettingsError`]: a channel settings row is missing or malformed.
//!
//! ### Collaborators
//! - [`StoreError`]: the datastore or persistence sink refused or failed.
//! - [`ScanError`]: the spectrum source failed or returned mismatched arrays.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use aoms_core::{CalibrationError, Sensor, SensorKind};
//! # use aoms_core::traits::CalibrationStore;
//!
//! fn load<S: CalibrationStore>(sensor: &mut Sensor, store: &S) {
//!     match sensor.load_calibration(store) {
//!         Ok(()) => {}
//!         Err(CalibrationError::Store(_)) => {
//!             // datastore unreachable, retry on the next config sync
//!         }
//!         Err(_) => {
//!             // bad calibration data, sensor reports -99 until fixed
//!         }
//!     }
//! }
//! ```

use thiserror_no_std::Error;

use crate::sensor::SensorKind;

/// Result type for acquisition operations
pub type AomsResult<T> = Result<T, AomsError>;

/// Failure reported by a datastore or persistence collaborator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or the call failed
    #[error("store unavailable during {operation}")]
    Unavailable {
        /// Collaborator operation that failed
        operation: &'static str,
    },

    /// The backend answered but refused the request
    #[error("store rejected {operation}")]
    Rejected {
        /// Collaborator operation that was rejected
        operation: &'static str,
    },
}

/// Sensor calibration could not be loaded or applied
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    /// Channel ids start at 1
    #[error("invalid channel id {channel_id}")]
    InvalidChannel {
        /// Offending channel id
        channel_id: u32,
    },

    /// Exactly one calibration row is expected per sensor
    #[error("expected one calibration row, found {rows}")]
    MissingRow {
        /// Number of rows the store returned
        rows: usize,
    },

    /// A calibration column was null
    #[error("calibration column {column} is null")]
    NullField {
        /// Zero-based column index
        column: usize,
    },

    /// Row shape does not match the calibration table
    #[error("calibration row has {found} columns, expected {expected}")]
    ColumnCount {
        /// Columns required for the sensor kind
        expected: usize,
        /// Columns actually present
        found: usize,
    },

    /// No conversion exists yet for this sensor kind
    #[error("{kind} conversion is not supported yet")]
    Unsupported {
        /// Sensor kind without a conversion
        kind: SensorKind,
    },

    /// Datastore failure while fetching calibration
    #[error("calibration fetch failed: {0}")]
    Store(#[from] StoreError),
}

/// Channel settings could not be loaded
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SettingsError {
    /// No settings row exists for the channel
    #[error("no settings row for channel")]
    MissingRow,

    /// A settings column was null
    #[error("settings column {column} is null")]
    NullField {
        /// Zero-based column index
        column: usize,
    },

    /// Row shape does not match the settings table
    #[error("settings row has {found} columns, expected {expected}")]
    ColumnCount {
        /// Columns required
        expected: usize,
        /// Columns actually present
        found: usize,
    },

    /// A required key/value setting is absent
    #[error("setting {key} is missing")]
    MissingKey {
        /// Setting key
        key: &'static str,
    },

    /// A key/value setting could not be parsed
    #[error("setting {key} has an invalid value")]
    InvalidValue {
        /// Setting key
        key: &'static str,
    },

    /// Datastore failure while fetching settings
    #[error("settings fetch failed: {0}")]
    Store(#[from] StoreError),
}

/// A spectrum could not be acquired for a channel
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ScanError {
    /// Spectrum source failed
    #[error("spectrum source failed: {0}")]
    Source(#[from] StoreError),

    /// Wavelength axis and power array differ in length
    #[error("wavelength axis has {wavelengths} samples but power has {power}")]
    LengthMismatch {
        /// Samples on the wavelength axis
        wavelengths: usize,
        /// Samples in the power array
        power: usize,
    },
}

/// Umbrella error for acquisition operations
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AomsError {
    /// Calibration failure
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Settings failure
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Spectrum acquisition failure
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Collaborator failure
    #[error(transparent)]
    Store(#[from] StoreError),
}
