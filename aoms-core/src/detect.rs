//! Peak detection on a raw sweep
//!
//! Used when the spectrum source returns only the power trace. Instruments
//! that run their own peak search attach the result to the scan and this
//! module is bypassed.
//!
//! ## Algorithm
//!
//! 1. Threshold = the higher of the channel noise floor and
//!    `max(P) + rel_threshold` (`rel_threshold` is negative, in dB).
//! 2. Candidates are local maxima above the threshold: strictly above the
//!    right neighbour, at least equal to the left one. A flat top yields one
//!    candidate, placed at the centre of the plateau.
//! 3. Strongest first, a candidate closer than `min_peak_dist` samples to an
//!    already accepted peak is discarded.
//! 4. Each accepted single-sample peak is refined to sub-sample resolution
//!    with a three-point parabola through the dB values. A plateau reports
//!    the wavelength halfway between its first and last sample.
//!
//! The result is sorted ascending, ready for [`crate::Channel::assign_wavelengths`].

use alloc::vec::Vec;

use crate::{config::ChannelSettings, scan::SpectrumScan};

/// Denominators below this are treated as a flat top
const PARABOLA_EPSILON: f64 = 1e-12;

/// Detect peak wavelengths on a sweep, ascending
pub fn detect_peaks(scan: &SpectrumScan, settings: &ChannelSettings) -> Vec<f64> {
    let w = scan.wavelengths();
    let p = scan.power_dbm();
    let n = p.len();

    if n < 3 {
        return Vec::new();
    }

    let max_power = p.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold = settings.noise_floor.max(max_power + settings.rel_threshold);

    let mut candidates: Vec<usize> = (1..n - 1)
        .filter(|&i| p[i] > threshold && p[i] >= p[i - 1] && p[i] > p[i + 1])
        .collect();

    // strongest first, ties broken by position
    candidates.sort_by(|&a, &b| p[b].total_cmp(&p[a]).then(a.cmp(&b)));

    let mut accepted: Vec<usize> = Vec::with_capacity(candidates.len());
    for i in candidates {
        if accepted.iter().all(|&j| i.abs_diff(j) >= settings.min_peak_dist) {
            accepted.push(i);
        }
    }

    let mut peaks: Vec<f64> = accepted
        .into_iter()
        .map(|i| {
            let start = plateau_start(p, i);
            if start < i {
                0.5 * (w[start] + w[i])
            } else {
                refine(w, p, i)
            }
        })
        .collect();
    peaks.sort_by(f64::total_cmp);
    peaks
}

/// First index of the run of samples equal to `p[end]` that ends at `end`
fn plateau_start(p: &[f64], end: usize) -> usize {
    let mut start = end;
    while start > 0 && p[start - 1] == p[end] {
        start -= 1;
    }
    start
}

fn refine(w: &[f64], p: &[f64], i: usize) -> f64 {
    let (left, centre, right) = (p[i - 1], p[i], p[i + 1]);
    let denom = left - 2.0 * centre + right;

    if libm::fabs(denom) < PARABOLA_EPSILON {
        return w[i];
    }

    let offset = 0.5 * (left - right) / denom;
    let step = 0.5 * (w[i + 1] - w[i - 1]);
    w[i] + offset.clamp(-0.5, 0.5) * step
}
