//! Shared fixtures for acquisition integration tests
//!
//! - [`MemoryStore`]: in-memory datastore with channels, sensors,
//!   calibration rows, settings and control flags
//! - [`RecordingSink`]: persistence sink that records every write and can
//!   be told to fail a given operation
//! - [`ScriptedSource`]: spectrum source returning canned sweeps per channel
//! - spectrum generators producing Gaussian reflection peaks in dBm

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use aoms_core::{
    sensor::{ChannelHealth, SensorHealth},
    time::Timestamp,
    traits::{ChannelRecord, Row, SensorRecord},
    CalibrationStore, PersistenceSink, SpectrumScan, SpectrumSource, StoreError,
};

/// Calibration row for a linear `T = w - lower` temperature sensor
pub fn linear_calibration(lower: f64, upper: f64) -> Row {
    // LAMBDA_A, T0, G1, G2, CONST, LBOUND, HBOUND, LAMBDA_B, OFFSET
    vec![
        Some(1.0), Some(0.0), Some(0.0), Some(1.0), Some(0.0),
        Some(lower), Some(upper), Some(lower), Some(0.0),
    ]
}

/// Default-valued channel settings row
pub fn settings_row() -> Row {
    vec![Some(0.05), Some(-50.0), Some(3.0), Some(-8.0), Some(0.0), Some(1.0), Some(20.0)]
}

/// Complete general settings listing
pub fn general_settings() -> Vec<(String, String)> {
    [
        ("INTERVAL_CH_SCAN", "1000"),
        ("INTERVAL_ENVIRONMENT_DATA", "10"),
        ("INTERVAL_MEASURED_DATA", "1"),
        ("INTERVAL_SPECTRUM_SAVE", "60"),
        ("PEAK_DETECTION_MODE", "1"),
        ("POST_SWITCH_WAIT_TIME", "750"),
        ("SPECTRUM_FILE_NAME", "spectrum.csv"),
        ("SPECTRUM_PATH", "/tmp/aoms"),
        ("DETECTION_SETTING_ID", "128"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// In-memory datastore
#[derive(Default)]
pub struct MemoryStore {
    pub channels: Vec<ChannelRecord>,
    pub sensors: HashMap<u32, Vec<SensorRecord>>,
    pub calibration: HashMap<(u32, u32), Vec<Row>>,
    pub settings: HashMap<u32, Vec<Row>>,
    pub general: Vec<(String, String)>,
    pub flags: RefCell<BTreeMap<String, i64>>,
    pub offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self {
            general: general_settings(),
            ..Self::default()
        };
        store.set_flag("FLAG_CHANNEL_UPDATE", 0);
        store.set_flag("FLAG_GENERAL_SETTINGS_UPDATE", 0);
        store.set_flag("FLAG_IS_CH_DIAG", 0);
        store
    }

    /// Add an active channel with temperature sensors over the given windows
    pub fn with_temperature_channel(mut self, channel_id: u32, windows: &[(f64, f64)]) -> Self {
        self.channels.push(ChannelRecord {
            id: channel_id,
            serial_number: format!("FBG-{channel_id:04}"),
            is_active: true,
            status: 0,
        });

        let sensors = windows
            .iter()
            .enumerate()
            .map(|(i, &(lb, hb))| {
                let id = i as u32 + 1;
                self.calibration.insert((channel_id, id), vec![linear_calibration(lb, hb)]);
                SensorRecord { id, type_code: 1, uid: u64::from(channel_id) * 1000 + u64::from(id) }
            })
            .collect();

        self.sensors.insert(channel_id, sensors);
        self.settings.insert(channel_id, vec![settings_row()]);
        self
    }

    pub fn set_flag(&self, key: &str, value: i64) {
        self.flags.borrow_mut().insert(key.to_string(), value);
    }

    pub fn flag(&self, key: &str) -> Option<i64> {
        self.flags.borrow().get(key).copied()
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable { operation })
        } else {
            Ok(())
        }
    }
}

impl CalibrationStore for MemoryStore {
    fn get_channels(&self) -> Result<Vec<ChannelRecord>, StoreError> {
        self.check("get_channels")?;
        Ok(self.channels.clone())
    }

    fn get_sensors(&self, channel_id: u32) -> Result<Vec<SensorRecord>, StoreError> {
        self.check("get_sensors")?;
        Ok(self.sensors.get(&channel_id).cloned().unwrap_or_default())
    }

    fn get_calibration(&self, channel_id: u32, sensor_id: u32) -> Result<Vec<Row>, StoreError> {
        self.check("get_calibration")?;
        Ok(self.calibration.get(&(channel_id, sensor_id)).cloned().unwrap_or_default())
    }

    fn get_channel_settings(&self, channel_id: u32) -> Result<Vec<Row>, StoreError> {
        self.check("get_channel_settings")?;
        Ok(self.settings.get(&channel_id).cloned().unwrap_or_default())
    }

    fn get_general_settings(&self) -> Result<Vec<(String, String)>, StoreError> {
        self.check("get_general_settings")?;
        Ok(self.general.clone())
    }

    fn get_internal_settings(&self) -> Result<Vec<(String, i64)>, StoreError> {
        self.check("get_internal_settings")?;
        Ok(self.flags.borrow().iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    fn set_internal_setting(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.check("set_internal_setting")?;
        self.set_flag(key, value);
        Ok(())
    }
}

/// One recorded sink write
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Measurement { channel_id: u32, sensor_id: u32, value: f64 },
    ChannelHealth { channel_id: u32, health: ChannelHealth },
    SensorHealth { channel_id: u32, sensor_id: u32, health: SensorHealth },
    Spectrum { channel_id: u32, timestamp: Timestamp, spectrum_id: u64 },
    Wavelengths { spectrum_id: u64, channel_id: u32, sensor_ids: Vec<u32>, wavelengths: Vec<f64> },
    Heartbeat { timestamp: Timestamp, version: String },
}

/// Sink recording every accepted write
#[derive(Default)]
pub struct RecordingSink {
    pub writes: Vec<Write>,
    pub failing: Vec<&'static str>,
    next_spectrum_id: u64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self { next_spectrum_id: 1, ..Self::default() }
    }

    /// Reject every call to `operation`
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn measurements(&self, channel_id: u32) -> Vec<(u32, f64)> {
        self.writes
            .iter()
            .filter_map(|w| match *w {
                Write::Measurement { channel_id: c, sensor_id, value } if c == channel_id => Some((sensor_id, value)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Write) -> bool) -> usize {
        self.writes.iter().filter(|w| predicate(w)).count()
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.failing.contains(&operation) {
            Err(StoreError::Rejected { operation })
        } else {
            Ok(())
        }
    }
}

impl PersistenceSink for RecordingSink {
    fn write_measurement(&mut self, channel_id: u32, sensor_id: u32, value: f64) -> Result<(), StoreError> {
        self.check("write_measurement")?;
        self.writes.push(Write::Measurement { channel_id, sensor_id, value });
        Ok(())
    }

    fn write_channel_health(&mut self, channel_id: u32, health: ChannelHealth) -> Result<(), StoreError> {
        self.check("write_channel_health")?;
        self.writes.push(Write::ChannelHealth { channel_id, health });
        Ok(())
    }

    fn write_sensor_health(&mut self, channel_id: u32, sensor_id: u32, health: SensorHealth) -> Result<(), StoreError> {
        self.check("write_sensor_health")?;
        self.writes.push(Write::SensorHealth { channel_id, sensor_id, health });
        Ok(())
    }

    fn write_spectrum(&mut self, channel_id: u32, timestamp: Timestamp) -> Result<u64, StoreError> {
        self.check("write_spectrum")?;
        let spectrum_id = self.next_spectrum_id;
        self.next_spectrum_id += 1;
        self.writes.push(Write::Spectrum { channel_id, timestamp, spectrum_id });
        Ok(spectrum_id)
    }

    fn write_wavelengths(
        &mut self,
        spectrum_id: u64,
        channel_id: u32,
        sensor_ids: &[u32],
        wavelengths: &[f64],
    ) -> Result<(), StoreError> {
        self.check("write_wavelengths")?;
        self.writes.push(Write::Wavelengths {
            spectrum_id,
            channel_id,
            sensor_ids: sensor_ids.to_vec(),
            wavelengths: wavelengths.to_vec(),
        });
        Ok(())
    }

    fn write_heartbeat(&mut self, timestamp: Timestamp, version: &str) -> Result<(), StoreError> {
        self.check("write_heartbeat")?;
        self.writes.push(Write::Heartbeat { timestamp, version: version.to_string() });
        Ok(())
    }
}

/// Spectrum source with one canned sweep per channel
#[derive(Default)]
pub struct ScriptedSource {
    pub scans: HashMap<u32, Result<SpectrumScan, StoreError>>,
    pub calls: Vec<u32>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan(mut self, channel_id: u32, scan: SpectrumScan) -> Self {
        self.scans.insert(channel_id, Ok(scan));
        self
    }

    pub fn with_failure(mut self, channel_id: u32) -> Self {
        self.scans.insert(channel_id, Err(StoreError::Unavailable { operation: "scan" }));
        self
    }
}

impl SpectrumSource for ScriptedSource {
    fn scan(&mut self, channel_id: u32) -> Result<SpectrumScan, StoreError> {
        self.calls.push(channel_id);
        self.scans
            .get(&channel_id)
            .cloned()
            .unwrap_or_else(|| Ok(SpectrumScan::empty()))
    }
}

/// Sweep with Gaussian reflection peaks over a -70 dBm floor
///
/// `peaks` are `(centre_nm, peak_dbm)`; the line width is 0.05 nm.
pub fn gaussian_sweep(peaks: &[(f64, f64)], start: f64, step: f64, samples: usize) -> SpectrumScan {
    let wavelengths: Vec<f64> = (0..samples).map(|i| start + i as f64 * step).collect();
    let power = wavelengths
        .iter()
        .map(|&w| {
            let linear: f64 = peaks
                .iter()
                .map(|&(centre, dbm)| {
                    let sigma = 0.05;
                    10f64.powf(dbm / 10.0) * (-(w - centre).powi(2) / (2.0 * sigma * sigma)).exp()
                })
                .sum();
            10.0 * (linear + 1e-7).log10()
        })
        .collect();

    SpectrumScan::new(wavelengths, power).expect("axis and power have equal length")
}
