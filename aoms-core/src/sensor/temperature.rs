//! Temperature grating calibration
//!
//! ## Conversion
//!
//! The Bragg wavelength of a temperature grating is normalised and mapped
//! through a per-sensor quadratic fitted at calibration time:
//!
//! ```text
//! x = w / LAMBDA_A - LAMBDA_B
//! T = G1·x² + G2·x + CONST + T0 + OFFSET
//! ```
//!
//! `T0` is the calibration reference temperature and `OFFSET` a field
//! correction applied after installation.
//!
//! ## Row Layout
//!
//! The datastore returns one row of nine columns per sensor:
//!
//! ```text
//! 0 LAMBDA_A   1 T0   2 G1   3 G2   4 CONST
//! 5 LBOUND     6 HBOUND      7 LAMBDA_B   8 OFFSET
//! ```
//!
//! `LBOUND`/`HBOUND` are the wavelength window in which the grating's peak
//! is expected.

use crate::{
    constants::calibration::TEMPERATURE_CALIBRATION_COLUMNS,
    errors::CalibrationError,
    traits::Row,
};

/// Coefficients of one temperature grating
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureCalibration {
    /// Wavelength normalisation divisor
    pub lambda_a: f64,
    /// Normalised wavelength offset
    pub lambda_b: f64,
    /// Quadratic coefficient
    pub g1: f64,
    /// Linear coefficient
    pub g2: f64,
    /// Constant term
    pub constant: f64,
    /// Reference temperature (°C)
    pub t0: f64,
    /// Field correction (°C)
    pub offset: f64,
    /// Lower bound of the peak window (nm)
    pub lower_bound: f64,
    /// Upper bound of the peak window (nm)
    pub upper_bound: f64,
}

impl TemperatureCalibration {
    /// Parse the calibration rows returned for one sensor
    ///
    /// Exactly one row is required; it must have no nulls and exactly nine
    /// columns, checked in that order.
    pub fn from_rows(rows: &[Row]) -> Result<Self, CalibrationError> {
        match rows {
            [row] => Self::from_row(row),
            _ => Err(CalibrationError::MissingRow { rows: rows.len() }),
        }
    }

    /// Parse a single calibration row
    pub fn from_row(row: &Row) -> Result<Self, CalibrationError> {
        if let Some(column) = row.iter().position(Option::is_none) {
            return Err(CalibrationError::NullField { column });
        }

        if row.len() != TEMPERATURE_CALIBRATION_COLUMNS {
            return Err(CalibrationError::ColumnCount {
                expected: TEMPERATURE_CALIBRATION_COLUMNS,
                found: row.len(),
            });
        }

        let v = |i: usize| row[i].unwrap_or_default();

        Ok(Self {
            lambda_a: v(0),
            t0: v(1),
            g1: v(2),
            g2: v(3),
            constant: v(4),
            lower_bound: v(5),
            upper_bound: v(6),
            lambda_b: v(7),
            offset: v(8),
        })
    }

    /// Temperature for a peak wavelength
    pub fn evaluate(&self, wavelength: f64) -> f64 {
        let x = wavelength / self.lambda_a - self.lambda_b;
        self.g1 * x * x + self.g2 * x + self.constant + self.t0 + self.offset
    }

    #[cfg(test)]
    pub(crate) fn identity_window(lower: f64, upper: f64) -> Self {
        Self {
            lambda_a: 1.0,
            lambda_b: 0.0,
            g1: 0.0,
            g2: 1.0,
            constant: 0.0,
            t0: 0.0,
            offset: 0.0,
            lower_bound: lower,
            upper_bound: upper,
        }
    }
}
