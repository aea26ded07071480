//! Datastore, Persistence and Spectrum Collaborators
//!
//! Rows come back from the datastore as ordered columns of nullable numbers,
//! exactly as a parameterized query or stored procedure returns them. Shape
//! checking (row count, nulls, column count) is the caller's job so that each
//! failure is contained to one sensor or one channel.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{
    errors::StoreError,
    scan::SpectrumScan,
    sensor::{ChannelHealth, SensorHealth},
    time::Timestamp,
};

/// One result row: ordered, nullable numeric columns
pub type Row = Vec<Option<f64>>;

/// A channel as configured in the datastore
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    /// Channel id (1-based)
    pub id: u32,
    /// Interrogator channel serial number
    pub serial_number: String,
    /// Whether the channel is scanned
    pub is_active: bool,
    /// Opaque status code from the datastore
    pub status: i32,
}

/// A sensor row for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRecord {
    /// Sensor id, unique within the channel
    pub id: u32,
    /// Datastore sensor type code
    pub type_code: i32,
    /// Globally unique sensor id
    pub uid: u64,
}

/// Read access to channel configuration and calibration
///
/// ## Implementation Requirements
///
/// - Sensor rows should be returned ordered by ascending sensor id
/// - An unknown channel or sensor returns an empty list, not an error
/// - Errors are reserved for backend failures
pub trait CalibrationStore {
    /// List configured channels
    fn get_channels(&self) -> Result<Vec<ChannelRecord>, StoreError>;

    /// List sensors configured on a channel
    fn get_sensors(&self, channel_id: u32) -> Result<Vec<SensorRecord>, StoreError>;

    /// Calibration rows for one sensor
    fn get_calibration(&self, channel_id: u32, sensor_id: u32) -> Result<Vec<Row>, StoreError>;

    /// Peak detection settings rows for one channel
    fn get_channel_settings(&self, channel_id: u32) -> Result<Vec<Row>, StoreError>;

    /// General acquisition settings as key/value pairs
    fn get_general_settings(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(Vec::new())
    }

    /// Internal control flags as key/value pairs
    fn get_internal_settings(&self) -> Result<Vec<(String, i64)>, StoreError> {
        Ok(Vec::new())
    }

    /// Update one internal control flag
    fn set_internal_setting(&self, _key: &str, _value: i64) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Write access for cycle results
///
/// Each call is independent. A failure is reported back to the cycle, which
/// records it and moves on; retries belong to the implementation.
pub trait PersistenceSink {
    /// Store one calibrated measurement
    fn write_measurement(&mut self, channel_id: u32, sensor_id: u32, value: f64) -> Result<(), StoreError>;

    /// Store the aggregate health of a channel
    fn write_channel_health(&mut self, channel_id: u32, health: ChannelHealth) -> Result<(), StoreError>;

    /// Store the health of one sensor
    fn write_sensor_health(&mut self, channel_id: u32, sensor_id: u32, health: SensorHealth) -> Result<(), StoreError>;

    /// Open a spectrum record and return its id
    fn write_spectrum(&mut self, channel_id: u32, timestamp: Timestamp) -> Result<u64, StoreError>;

    /// Attach assigned peak wavelengths to a spectrum record
    fn write_wavelengths(
        &mut self,
        spectrum_id: u64,
        channel_id: u32,
        sensor_ids: &[u32],
        wavelengths: &[f64],
    ) -> Result<(), StoreError>;

    /// Mark the acquisition process alive, once per cycle
    fn write_heartbeat(&mut self, _timestamp: Timestamp, _version: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Supplies one spectrum sweep per channel per cycle
pub trait SpectrumSource {
    /// Acquire a sweep for the channel
    fn scan(&mut self, channel_id: u32) -> Result<SpectrumScan, StoreError>;
}
