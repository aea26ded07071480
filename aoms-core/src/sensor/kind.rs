//! Sensor kinds and measurement dispatch
//!
//! Every sensor on a channel is one [`SensorKind`] with a matching
//! [`Calibration`] variant. Conversion from a peak wavelength to a physical
//! value goes through the single [`compute_measurement`] function.
//!
//! Only temperature gratings have a conversion today. Pressure and humidity
//! sensors are configured and health-monitored like any other, but asking for
//! their measurement returns [`CalibrationError::Unsupported`].

use core::fmt;

use crate::{
    constants::calibration::{
        NO_READING_SENTINEL, SENSOR_CODE_HUMIDITY, SENSOR_CODE_PRESSURE, SENSOR_CODE_TEMPERATURE,
    },
    errors::CalibrationError,
};

use super::temperature::TemperatureCalibration;

/// Physical quantity measured by a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    /// Temperature grating (°C)
    Temperature,
    /// Pressure grating
    Pressure,
    /// Humidity grating (%RH)
    Humidity,
}

impl SensorKind {
    /// Map a datastore type code
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            SENSOR_CODE_TEMPERATURE => Some(SensorKind::Temperature),
            SENSOR_CODE_PRESSURE => Some(SensorKind::Pressure),
            SENSOR_CODE_HUMIDITY => Some(SensorKind::Humidity),
            _ => None,
        }
    }

    /// Datastore type code
    pub const fn code(&self) -> i32 {
        match self {
            SensorKind::Temperature => SENSOR_CODE_TEMPERATURE,
            SensorKind::Pressure => SENSOR_CODE_PRESSURE,
            SensorKind::Humidity => SENSOR_CODE_HUMIDITY,
        }
    }

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Pressure => "pressure",
            SensorKind::Humidity => "humidity",
        }
    }

    /// One-letter tag used in channel logs
    pub const fn tag(&self) -> char {
        match self {
            SensorKind::Temperature => 'T',
            SensorKind::Pressure => 'P',
            SensorKind::Humidity => 'H',
        }
    }

    /// Whether a wavelength conversion exists for this kind
    pub const fn is_supported(&self) -> bool {
        matches!(self, SensorKind::Temperature)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calibration coefficients, one variant per sensor kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    /// Quadratic temperature conversion
    Temperature(TemperatureCalibration),
    /// Placeholder until pressure gratings get a conversion
    Pressure,
    /// Placeholder until humidity gratings get a conversion
    Humidity,
}

impl Calibration {
    /// Kind this calibration belongs to
    pub const fn kind(&self) -> SensorKind {
        match self {
            Calibration::Temperature(_) => SensorKind::Temperature,
            Calibration::Pressure => SensorKind::Pressure,
            Calibration::Humidity => SensorKind::Humidity,
        }
    }
}

/// Convert an assigned peak wavelength into a measurement
///
/// A wavelength of 0 means no peak was assigned this cycle and yields
/// [`NO_READING_SENTINEL`]. A temperature sensor without calibration also
/// yields the sentinel.
///
/// ```rust
/// use aoms_core::{compute_measurement, SensorKind};
///
/// assert_eq!(compute_measurement(SensorKind::Temperature, None, 0.0), Ok(-99.0));
/// assert!(compute_measurement(SensorKind::Humidity, None, 1550.0).is_err());
/// ```
pub fn compute_measurement(
    kind: SensorKind,
    calibration: Option<&Calibration>,
    wavelength: f64,
) -> Result<f64, CalibrationError> {
    match kind {
        SensorKind::Temperature => {
            if wavelength == 0.0 {
                return Ok(NO_READING_SENTINEL);
            }
            match calibration {
                Some(Calibration::Temperature(c)) => Ok(c.evaluate(wavelength)),
                _ => Ok(NO_READING_SENTINEL),
            }
        }
        SensorKind::Pressure | SensorKind::Humidity => Err(CalibrationError::Unsupported { kind }),
    }
}
