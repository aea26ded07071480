//! Spectrum sweeps
//!
//! One [`SpectrumScan`] is one instrument sweep of a channel: a wavelength
//! axis in nm and the reflected power in dBm at each sample. Interrogators
//! that run their own peak search attach the detected peak wavelengths;
//! otherwise [`crate::detect::detect_peaks`] derives them from the power trace.

use alloc::vec::Vec;

use crate::errors::ScanError;

/// One sweep of a channel
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumScan {
    wavelengths: Vec<f64>,
    power_dbm: Vec<f64>,
    peaks: Option<Vec<f64>>,
}

impl SpectrumScan {
    /// Build a sweep from matching wavelength and power arrays
    pub fn new(wavelengths: Vec<f64>, power_dbm: Vec<f64>) -> Result<Self, ScanError> {
        if wavelengths.len() != power_dbm.len() {
            return Err(ScanError::LengthMismatch {
                wavelengths: wavelengths.len(),
                power: power_dbm.len(),
            });
        }

        Ok(Self { wavelengths, power_dbm, peaks: None })
    }

    /// Sweep with no samples; still carries instrument-detected peaks if given
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach peaks detected by the instrument, sorted ascending
    pub fn with_peaks(mut self, mut peaks: Vec<f64>) -> Self {
        peaks.retain(|w| w.is_finite());
        peaks.sort_by(f64::total_cmp);
        self.peaks = Some(peaks);
        self
    }

    /// Wavelength axis (nm)
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Reflected power (dBm)
    pub fn power_dbm(&self) -> &[f64] {
        &self.power_dbm
    }

    /// Instrument-detected peaks, if the source supplied them
    pub fn peaks(&self) -> Option<&[f64]> {
        self.peaks.as_deref()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Whether the sweep has no samples
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// First wavelength on the axis, 0 for an empty sweep
    pub fn start(&self) -> f64 {
        self.wavelengths.first().copied().unwrap_or(0.0)
    }

    /// Mean sample spacing, 0 when fewer than two samples
    pub fn step(&self) -> f64 {
        match (self.wavelengths.first(), self.wavelengths.last()) {
            (Some(first), Some(last)) if self.wavelengths.len() > 1 => {
                (last - first) / (self.wavelengths.len() - 1) as f64
            }
            _ => 0.0,
        }
    }

    /// Sample range `[start, end)` covering the window `(lower, upper)`
    ///
    /// Indices are truncated offsets from the start of the axis, clamped to
    /// the sweep. An empty range is returned when the window falls outside it.
    pub fn window_range(&self, lower: f64, upper: f64) -> (usize, usize) {
        let step = self.step();
        if step <= 0.0 {
            return (0, 0);
        }

        let start = self.start();
        let index = |w: f64| {
            let offset = (w - start) / step;
            if offset <= 0.0 {
                0
            } else {
                (offset as usize).min(self.len())
            }
        };

        let (i_start, i_end) = (index(lower), index(upper));
        if i_start >= i_end {
            (i_start, i_start)
        } else {
            (i_start, i_end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn axis(start: f64, step: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + i as f64 * step).collect()
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let result = SpectrumScan::new(vec![1.0, 2.0], vec![-40.0]);
        assert_eq!(result, Err(ScanError::LengthMismatch { wavelengths: 2, power: 1 }));
    }

    #[test]
    fn axis_start_and_step() {
        let scan = SpectrumScan::new(axis(1500.0, 0.5, 11), vec![-60.0; 11]).unwrap();
        assert_eq!(scan.start(), 1500.0);
        assert!((scan.step() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn window_range_truncates_and_clamps() {
        let scan = SpectrumScan::new(axis(0.0, 1.0, 100), vec![-60.0; 100]).unwrap();

        assert_eq!(scan.window_range(10.5, 20.5), (10, 20));
        assert_eq!(scan.window_range(-5.0, 3.0), (0, 3));
        assert_eq!(scan.window_range(90.0, 500.0), (90, 100));
        assert_eq!(scan.window_range(200.0, 300.0), (100, 100));
    }

    #[test]
    fn peaks_sorted_on_attach() {
        let scan = SpectrumScan::empty().with_peaks(vec![1550.2, 1545.1, f64::NAN, 1560.0]);
        assert_eq!(scan.peaks(), Some(&[1545.1, 1550.2, 1560.0][..]));
    }
}
