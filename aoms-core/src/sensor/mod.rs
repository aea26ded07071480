//! Sensors on a fiber channel
//!
//! ## Module Organization
//!
//! - [`kind`] - sensor kinds, calibration variants, measurement dispatch
//! - [`temperature`] - temperature grating calibration
//! - [`health`] - sensor and channel health classification
//!
//! ## Lifecycle
//!
//! ```text
//! Sensor::new ─► load_calibration ─► (per cycle)
//!                                     peak assigned by the channel
//!                                     update_spectrum(scan)
//!                                     calc_measurement()
//!                                     update_health(thresholds)
//! ```
//!
//! A sensor whose calibration failed to load keeps an empty window, is never
//! assigned a peak and reports the no-reading sentinel.

pub mod health;
pub mod kind;
pub mod temperature;

pub use health::{ChannelHealth, HealthAssessment, SensorHealth};
pub use kind::{compute_measurement, Calibration, SensorKind};
pub use temperature::TemperatureCalibration;

use alloc::vec::Vec;

use crate::{
    config::HealthThresholds,
    constants::calibration::{MIN_CHANNEL_ID, NO_READING_SENTINEL},
    errors::CalibrationError,
    peak::Peak,
    scan::SpectrumScan,
    traits::CalibrationStore,
};

/// One grating on a channel
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    id: u32,
    uid: u64,
    channel_id: u32,
    kind: SensorKind,
    calibration: Option<Calibration>,
    peak: Peak,
    measurement: f64,
    spectrum_w: Vec<f64>,
    spectrum_r: Vec<f64>,
    health: HealthAssessment,
}

impl Sensor {
    /// Uncalibrated sensor
    pub fn new(id: u32, uid: u64, channel_id: u32, kind: SensorKind) -> Self {
        Self {
            id,
            uid,
            channel_id,
            kind,
            calibration: None,
            peak: Peak::default(),
            measurement: NO_READING_SENTINEL,
            spectrum_w: Vec::new(),
            spectrum_r: Vec::new(),
            health: HealthAssessment::default(),
        }
    }

    /// Sensor id, unique within the channel
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Globally unique id
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// Owning channel
    pub fn channel_id(&self) -> u32 {
        self.channel_id
    }

    /// Measured quantity
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Loaded calibration, if any
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Expected peak and this cycle's assignment
    pub fn peak(&self) -> &Peak {
        &self.peak
    }

    pub(crate) fn peak_mut(&mut self) -> &mut Peak {
        &mut self.peak
    }

    /// Assigned wavelength, 0 when unassigned
    pub fn wavelength(&self) -> f64 {
        self.peak.wavelength()
    }

    /// Last computed measurement
    pub fn measurement(&self) -> f64 {
        self.measurement
    }

    /// Overall health from the last classification
    pub fn health(&self) -> SensorHealth {
        self.health.overall
    }

    /// Full health breakdown from the last classification
    pub fn health_assessment(&self) -> HealthAssessment {
        self.health
    }

    /// Wavelength samples under the sensor window
    pub fn spectrum_wavelengths(&self) -> &[f64] {
        &self.spectrum_w
    }

    /// Power samples under the sensor window (dBm)
    pub fn spectrum_power(&self) -> &[f64] {
        &self.spectrum_r
    }

    /// Install temperature coefficients and their peak window
    pub fn apply_temperature_calibration(&mut self, calibration: TemperatureCalibration) {
        self.peak = Peak::new(calibration.lower_bound, calibration.upper_bound);
        self.calibration = Some(Calibration::Temperature(calibration));
    }

    /// Fetch and install this sensor's calibration
    ///
    /// Pressure and humidity sensors have no coefficients yet and succeed
    /// without touching the store. On failure the calibration is cleared,
    /// so the sensor reports the sentinel until a later load succeeds.
    pub fn load_calibration<S>(&mut self, store: &S) -> Result<(), CalibrationError>
    where
        S: CalibrationStore + ?Sized,
    {
        let result = self.fetch_calibration(store);

        if let Err(e) = result {
            self.calibration = None;
            self.peak = Peak::default();
            log_error!("CH#{:02}-{:02}: calibration not loaded: {}", self.channel_id, self.id, e);
        }

        result
    }

    fn fetch_calibration<S>(&mut self, store: &S) -> Result<(), CalibrationError>
    where
        S: CalibrationStore + ?Sized,
    {
        if self.channel_id < MIN_CHANNEL_ID {
            return Err(CalibrationError::InvalidChannel { channel_id: self.channel_id });
        }

        match self.kind {
            SensorKind::Temperature => {
                let rows = store.get_calibration(self.channel_id, self.id)?;
                let calibration = TemperatureCalibration::from_rows(&rows)?;
                self.apply_temperature_calibration(calibration);
            }
            SensorKind::Pressure => self.calibration = Some(Calibration::Pressure),
            SensorKind::Humidity => self.calibration = Some(Calibration::Humidity),
        }

        Ok(())
    }

    /// Convert the assigned wavelength into a measurement
    ///
    /// Unsupported kinds leave the measurement at the sentinel and return
    /// the error.
    pub fn calc_measurement(&mut self) -> Result<f64, CalibrationError> {
        match compute_measurement(self.kind, self.calibration.as_ref(), self.peak.wavelength()) {
            Ok(value) => {
                self.measurement = value;
                Ok(value)
            }
            Err(e) => {
                self.measurement = NO_READING_SENTINEL;
                Err(e)
            }
        }
    }

    /// Copy the sweep samples under this sensor's window
    ///
    /// The strongest sample in the window becomes the peak reflectivity.
    pub fn update_spectrum(&mut self, scan: &SpectrumScan) {
        let (start, end) = scan.window_range(self.peak.lower_bound(), self.peak.upper_bound());

        self.spectrum_w.clear();
        self.spectrum_r.clear();
        self.spectrum_w.extend_from_slice(&scan.wavelengths()[start..end]);
        self.spectrum_r.extend_from_slice(&scan.power_dbm()[start..end]);

        let reflectivity = health::extent(&self.spectrum_r).map_or(0.0, |(_, max)| max);
        self.peak.set_reflectivity(reflectivity);
    }

    /// Classify the current power slice
    pub fn update_health(&mut self, thresholds: &HealthThresholds) -> SensorHealth {
        self.health = HealthAssessment::from_power(&self.spectrum_r, thresholds);
        self.health.overall
    }
}
