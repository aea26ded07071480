//! Fiber channels and peak assignment
//!
//! A [`Channel`] owns the sensors written on one fiber. Each cycle the
//! interrogator measures a list of peak wavelengths on the channel and the
//! channel hands them out to its sensors.
//!
//! ## Assignment
//!
//! Sensors are kept sorted by id, and their calibrated windows are expected
//! to be ordered the same way along the spectrum. Measured peaks arrive in
//! ascending order. One forward sweep pairs them:
//!
//! ```text
//! measured:   5        25        45
//! sensors:  (0,10)   (20,30)   (40,50)
//!             ▲        ▲         ▲
//!             └cursor──┴──cursor─┘  never moves back
//! ```
//!
//! Each measured peak goes to the first sensor at or after the cursor whose
//! window strictly contains it, and the cursor moves past that sensor. A peak
//! no remaining sensor accepts is dropped. Sensors that receive nothing this
//! cycle read 0 and report the no-reading sentinel.
//!
//! Windows that overlap or are out of order make the sweep skip sensors; this
//! is reported as a warning when calibration is loaded.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::{
    config::{ChannelSettings, HealthThresholds},
    errors::{SettingsError, StoreError},
    scan::SpectrumScan,
    sensor::{Calibration, ChannelHealth, Sensor, SensorKind},
    traits::{CalibrationStore, SensorRecord},
};

/// A fiber channel and its sensors
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    id: u32,
    serial_number: String,
    is_active: bool,
    status: i32,
    sensors: Vec<Sensor>,
    index: BTreeMap<u32, usize>,
    settings: ChannelSettings,
    health: ChannelHealth,
    empty: bool,
}

impl Channel {
    /// Channel without sensors
    pub fn new(id: u32, serial_number: &str, is_active: bool, status: i32) -> Self {
        Self {
            id,
            serial_number: String::from(serial_number),
            is_active,
            status,
            sensors: Vec::new(),
            index: BTreeMap::new(),
            settings: ChannelSettings::default(),
            health: ChannelHealth::default(),
            empty: true,
        }
    }

    /// Channel id (1-based)
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Interrogator serial number
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Whether the channel is scanned
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Datastore status code
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Peak detection settings
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    /// Whether the last assignment had no measured peaks
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Last computed channel health
    pub fn health(&self) -> ChannelHealth {
        self.health
    }

    /// Sensors, sorted by id
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Number of sensors
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Sensor by id
    pub fn sensor(&self, id: u32) -> Option<&Sensor> {
        self.index.get(&id).map(|&i| &self.sensors[i])
    }

    /// Mutable sensor by id
    pub fn sensor_mut(&mut self, id: u32) -> Option<&mut Sensor> {
        let i = *self.index.get(&id)?;
        self.sensors.get_mut(i)
    }

    /// Replace the sensor list
    ///
    /// Sensors are sorted by id. A later duplicate id replaces an earlier one.
    pub fn set_sensors(&mut self, mut sensors: Vec<Sensor>) {
        sensors.sort_by_key(Sensor::id);
        sensors.dedup_by(|later, earlier| {
            if later.id() == earlier.id() {
                core::mem::swap(later, earlier);
                true
            } else {
                false
            }
        });

        self.index = sensors.iter().enumerate().map(|(i, s)| (s.id(), i)).collect();
        self.sensors = sensors;
        self.empty = true;
    }

    /// Rebuild the sensor list from the datastore
    ///
    /// Rows with an unknown type code are skipped. Returns `false` when the
    /// channel ends up with no sensors.
    pub fn populate<S>(&mut self, store: &S) -> Result<bool, StoreError>
    where
        S: CalibrationStore + ?Sized,
    {
        let records = store.get_sensors(self.id)?;
        let sensors: Vec<Sensor> = records.iter().filter_map(|r| self.build_sensor(r)).collect();

        self.set_sensors(sensors);

        if self.sensors.is_empty() {
            log_warn!("CH#{:02}: no sensors configured", self.id);
            return Ok(false);
        }

        log_info!("CH#{:02}: {} sensors", self.id, self.sensors.len());
        Ok(true)
    }

    fn build_sensor(&self, record: &SensorRecord) -> Option<Sensor> {
        match SensorKind::from_code(record.type_code) {
            Some(kind) => Some(Sensor::new(record.id, record.uid, self.id, kind)),
            None => {
                log_warn!(
                    "CH#{:02}-{:02}: unknown sensor type {}, skipped",
                    self.id,
                    record.id,
                    record.type_code
                );
                None
            }
        }
    }

    /// Load peak detection settings from the datastore
    ///
    /// Only the first row is used. A malformed row applies `defaults`; a
    /// missing row or store failure leaves the current settings in place.
    pub fn load_settings<S>(&mut self, store: &S, defaults: &ChannelSettings) -> Result<(), SettingsError>
    where
        S: CalibrationStore + ?Sized,
    {
        let rows = store.get_channel_settings(self.id).map_err(|e| {
            log_warn!("CH#{:02}: settings unavailable: {}", self.id, e);
            SettingsError::from(e)
        })?;

        let Some(row) = rows.first() else {
            log_warn!("CH#{:02}: no settings row", self.id);
            return Err(SettingsError::MissingRow);
        };

        match ChannelSettings::from_row(row) {
            Ok(settings) => {
                self.settings = settings;
                Ok(())
            }
            Err(e) => {
                log_warn!("CH#{:02}: {}, using defaults", self.id, e);
                self.settings = *defaults;
                Err(e)
            }
        }
    }

    /// Load calibration for every sensor
    ///
    /// Each sensor loads independently. Returns `true` only if all of them
    /// succeeded.
    pub fn load_calibration<S>(&mut self, store: &S) -> bool
    where
        S: CalibrationStore + ?Sized,
    {
        let failed = self
            .sensors
            .iter_mut()
            .map(|s| s.load_calibration(store))
            .filter(Result::is_err)
            .count();

        if !self.windows_ascending() {
            log_warn!("CH#{:02}: sensor windows are not in ascending order", self.id);
        }

        failed == 0
    }

    fn windows_ascending(&self) -> bool {
        self.sensors
            .iter()
            .filter(|s| matches!(s.calibration(), Some(Calibration::Temperature(_))))
            .map(|s| (s.peak().lower_bound(), s.peak().upper_bound()))
            .collect::<Vec<_>>()
            .windows(2)
            .all(|w| w[0].1 <= w[1].0)
    }

    /// Hand measured peaks to sensors
    ///
    /// `measured` must be ascending. Every sensor is cleared first, so a
    /// sensor that receives nothing reads 0.
    pub fn assign_wavelengths(&mut self, measured: &[f64]) {
        for sensor in &mut self.sensors {
            sensor.peak_mut().clear();
        }

        if measured.is_empty() {
            log_debug!("CH#{:02}: no peaks measured", self.id);
            self.empty = true;
            return;
        }

        let mut cursor = 0;
        for &w in measured {
            let hit = self.sensors[cursor..].iter().position(|s| s.peak().contains(w));

            match hit {
                Some(offset) => {
                    let j = cursor + offset;
                    self.sensors[j].peak_mut().set_wavelength(w);
                    cursor = j + 1;
                }
                None => log_debug!("CH#{:02}: peak {:.4} nm not assigned", self.id, w),
            }

            if cursor >= self.sensors.len() {
                break;
            }
        }

        self.empty = false;
    }

    /// Slice the sweep under every sensor window
    ///
    /// Returns `false` when the channel has no sensors.
    pub fn update_spectrum(&mut self, scan: &SpectrumScan) -> bool {
        if self.sensors.is_empty() {
            return false;
        }

        for sensor in &mut self.sensors {
            sensor.update_spectrum(scan);
        }
        true
    }

    /// Classify every sensor and the channel
    ///
    /// `power` is the whole sweep, used only when the channel has no sensors.
    pub fn update_health(&mut self, power: &[f64], thresholds: &HealthThresholds) -> ChannelHealth {
        for sensor in &mut self.sensors {
            sensor.update_health(thresholds);
        }

        self.health = ChannelHealth::from_sensors(self.sensors.iter().map(Sensor::health))
            .unwrap_or_else(|| ChannelHealth::from_sweep(power, thresholds));
        self.health
    }

    /// Compute every sensor's measurement
    pub fn calc_measurement(&mut self) {
        for sensor in &mut self.sensors {
            if let Err(e) = sensor.calc_measurement() {
                log_debug!("CH#{:02}-{:02}: {}", self.id, sensor.id(), e);
            }
        }
    }

    /// Sensor ids in order
    pub fn sensor_ids(&self) -> Vec<u32> {
        self.sensors.iter().map(Sensor::id).collect()
    }

    /// Sensor unique ids in order
    pub fn uids(&self) -> Vec<u64> {
        self.sensors.iter().map(Sensor::uid).collect()
    }

    /// Sensor kinds in order
    pub fn kinds(&self) -> Vec<SensorKind> {
        self.sensors.iter().map(Sensor::kind).collect()
    }

    /// Assigned wavelengths in order, 0 for unassigned sensors
    pub fn wavelengths(&self) -> Vec<f64> {
        self.sensors.iter().map(Sensor::wavelength).collect()
    }

    /// Measurements in order
    pub fn measurements(&self) -> Vec<f64> {
        self.sensors.iter().map(Sensor::measurement).collect()
    }

    /// One-line rendering of assigned wavelengths
    pub fn wavelength_summary(&self) -> String {
        self.summary(|s| s.wavelength(), 4)
    }

    /// One-line rendering of measurements
    pub fn measurement_summary(&self) -> String {
        self.summary(|s| s.measurement(), 2)
    }

    fn summary(&self, value: impl Fn(&Sensor) -> f64, precision: usize) -> String {
        let mut out = String::new();
        let _ = write!(out, "CH#{:02}", self.id);
        for s in &self.sensors {
            let _ = write!(out, " | {}{:02}: {:.*}", s.kind().tag(), s.id(), precision, value(s));
        }
        out
    }
}
