//! Signal health classification
//!
//! ## Sensor Health
//!
//! Computed from the reflected power slice under the sensor's window:
//!
//! ```text
//! dr = max(P) - min(P)    dynamic range → h_dr
//! r  = max(P)             peak power    → h_r
//! health = min(h_dr, h_r)
//! ```
//!
//! Each signal is compared against three descending thresholds, and a level
//! is reached only when the signal is strictly above it. The worse of the two
//! signals decides: a strong but flat slice is a saturated or disconnected
//! fiber, a contrasted but faint slice is a lossy link.
//!
//! An empty slice cannot be classified and reports [`SensorHealth::Error`].
//!
//! ## Channel Health
//!
//! A channel with sensors reports the arithmetic mean of its sensors' ordinal
//! levels, so values such as 2.5 occur. They only carry meaning for
//! comparison and trending. A channel without sensors falls back to the
//! dynamic range of its whole sweep.

use core::fmt;

use crate::config::HealthThresholds;

/// Ordinal health of one sensor, worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i8)]
pub enum SensorHealth {
    /// Spectrum missing, cannot classify
    Error = -1,
    /// No usable reflection
    #[default]
    Disconnected = 0,
    /// Reflection present but marginal
    Weak = 1,
    /// Usable with reduced margin
    Moderate = 2,
    /// Clean reflection
    Healthy = 3,
}

impl SensorHealth {
    /// Numeric level as stored in the datastore
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// Classify a dynamic range (dB)
    pub fn from_dynamic_range(dr: f64, t: &HealthThresholds) -> Self {
        classify(dr, t.dr_high, t.dr_medium, t.dr_low)
    }

    /// Classify a peak power (dBm)
    pub fn from_peak_power(r: f64, t: &HealthThresholds) -> Self {
        classify(r, t.r_high, t.r_medium, t.r_low)
    }
}

impl fmt::Display for SensorHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorHealth::Error => "error",
            SensorHealth::Disconnected => "disconnected",
            SensorHealth::Weak => "weak",
            SensorHealth::Moderate => "moderate",
            SensorHealth::Healthy => "healthy",
        };
        f.write_str(name)
    }
}

fn classify(value: f64, high: f64, medium: f64, low: f64) -> SensorHealth {
    if value > high {
        SensorHealth::Healthy
    } else if value > medium {
        SensorHealth::Moderate
    } else if value > low {
        SensorHealth::Weak
    } else {
        SensorHealth::Disconnected
    }
}

/// Result of classifying one power slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthAssessment {
    /// Level from dynamic range
    pub dynamic_range: SensorHealth,
    /// Level from peak power
    pub peak_power: SensorHealth,
    /// Worse of the two
    pub overall: SensorHealth,
}

impl HealthAssessment {
    /// Classify a reflected power slice (dBm)
    pub fn from_power(power: &[f64], t: &HealthThresholds) -> Self {
        let Some((min, max)) = extent(power) else {
            return Self {
                dynamic_range: SensorHealth::Error,
                peak_power: SensorHealth::Error,
                overall: SensorHealth::Error,
            };
        };

        let dynamic_range = SensorHealth::from_dynamic_range(max - min, t);
        let peak_power = SensorHealth::from_peak_power(max, t);

        Self {
            dynamic_range,
            peak_power,
            overall: dynamic_range.min(peak_power),
        }
    }
}

/// Minimum and maximum of a slice, `None` when empty
pub(crate) fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values[1..].iter().fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

/// Aggregate health of a channel
///
/// Either the mean of sensor levels or one of the fallback levels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelHealth(f64);

impl ChannelHealth {
    /// Whole-sweep contrast above the medium threshold
    pub const HEALTHY: Self = Self(3.0);
    /// Whole-sweep contrast above the low threshold
    pub const MODERATE: Self = Self(2.0);
    /// No contrast on the sweep
    pub const DISCONNECTED: Self = Self(0.0);
    /// No sweep to classify
    pub const ERROR: Self = Self(-1.0);

    /// Mean of sensor levels, `None` without sensors
    pub fn from_sensors<I>(levels: I) -> Option<Self>
    where
        I: IntoIterator<Item = SensorHealth>,
    {
        let (sum, count) = levels
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), h| (sum + f64::from(h.code()), n + 1));

        (count > 0).then(|| Self(sum / count as f64))
    }

    /// Classify a whole sweep for a channel without sensors
    pub fn from_sweep(power: &[f64], t: &HealthThresholds) -> Self {
        match extent(power) {
            None => Self::ERROR,
            Some((min, max)) => {
                let dr = max - min;
                if dr > t.dr_medium {
                    Self::HEALTHY
                } else if dr > t.dr_low {
                    Self::MODERATE
                } else {
                    Self::DISCONNECTED
                }
            }
        }
    }

    /// Numeric value, possibly fractional
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ChannelHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn thresholds() -> HealthThresholds {
        HealthThresholds::default()
    }

    #[test]
    fn ordinal_order() {
        assert!(SensorHealth::Error < SensorHealth::Disconnected);
        assert!(SensorHealth::Disconnected < SensorHealth::Weak);
        assert!(SensorHealth::Weak < SensorHealth::Moderate);
        assert!(SensorHealth::Moderate < SensorHealth::Healthy);
        assert_eq!(SensorHealth::Healthy.code(), 3);
    }

    #[test]
    fn worse_signal_dominates() {
        // 30 dB contrast but only -45 dBm at the top: weak link
        let power = [-75.0, -60.0, -45.0, -60.0, -75.0];
        let h = HealthAssessment::from_power(&power, &thresholds());

        assert_eq!(h.dynamic_range, SensorHealth::Healthy);
        assert_eq!(h.peak_power, SensorHealth::Weak);
        assert_eq!(h.overall, SensorHealth::Weak);
    }

    #[test]
    fn low_contrast_is_disconnected() {
        let power = [-10.0, -9.0, -8.5];
        let h = HealthAssessment::from_power(&power, &thresholds());
        assert_eq!(h.dynamic_range, SensorHealth::Disconnected);
        assert_eq!(h.overall, SensorHealth::Disconnected);
    }

    #[test]
    fn flat_faint_slice_is_disconnected() {
        let power = [-70.0; 32];
        let h = HealthAssessment::from_power(&power, &thresholds());
        assert_eq!(h.overall, SensorHealth::Disconnected);
    }

    #[test]
    fn empty_slice_is_error() {
        let h = HealthAssessment::from_power(&[], &thresholds());
        assert_eq!(h.overall, SensorHealth::Error);
    }

    #[test]
    fn thresholds_are_strict() {
        let t = thresholds();
        assert_eq!(SensorHealth::from_dynamic_range(t.dr_high, &t), SensorHealth::Moderate);
        assert_eq!(SensorHealth::from_peak_power(t.r_low, &t), SensorHealth::Disconnected);
    }

    #[test]
    fn channel_mean_can_be_fractional() {
        let h = ChannelHealth::from_sensors([SensorHealth::Healthy, SensorHealth::Moderate]).unwrap();
        assert_eq!(h.value(), 2.5);
        assert_eq!(ChannelHealth::from_sensors(Vec::<SensorHealth>::new()), None);
    }

    #[test]
    fn sweep_fallback() {
        let t = thresholds();
        assert_eq!(ChannelHealth::from_sweep(&[], &t), ChannelHealth::ERROR);
        assert_eq!(ChannelHealth::from_sweep(&[-60.0, -40.0], &t), ChannelHealth::HEALTHY);
        assert_eq!(ChannelHealth::from_sweep(&[-60.0, -55.0], &t), ChannelHealth::MODERATE);
        assert_eq!(ChannelHealth::from_sweep(&[-60.0, -59.0], &t), ChannelHealth::DISCONNECTED);
    }
}
