//! Radio link quality
//!
//! Collapses a gateway's RSSI and SNR into one 0-100 score for dashboards.
//!
//! | SNR (dB)        | Score                                   |
//! |-----------------|-----------------------------------------|
//! | ≥ 7             | RSSI > -40 → 100, RSSI < -120 → 60, else `0.5·RSSI + 120` |
//! | -10 < SNR < 7   | `3.529411765·SNR + 35.29411765`         |
//! | ≤ -10           | 0                                       |
//!
//! Above 7 dB SNR the link is limited by signal level, so RSSI decides.
//! Below it noise dominates and the score follows SNR linearly from 0 at
//! -10 dB to 60 at 7 dB.

/// SNR at which the score switches from SNR to RSSI
pub const SNR_RSSI_LIMITED_DB: f64 = 7.0;

/// SNR at or below which the link scores 0
pub const SNR_FLOOR_DB: f64 = -10.0;

/// Link quality score in percent
///
/// A missing reading, or one reported as exactly 0, scores 0: network
/// servers fill absent radio metadata with zeros.
pub fn signal_strength_percentage(rssi: Option<f64>, snr: Option<f64>) -> f64 {
    let (Some(rssi), Some(snr)) = (rssi, snr) else {
        return 0.0;
    };

    if rssi == 0.0 || snr == 0.0 {
        return 0.0;
    }

    if snr >= SNR_RSSI_LIMITED_DB {
        if rssi > -40.0 {
            100.0
        } else if rssi < -120.0 {
            60.0
        } else {
            0.5 * rssi + 120.0
        }
    } else if snr > SNR_FLOOR_DB {
        3.529411765 * snr + 35.29411765
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn strong_snr_uses_rssi() {
        assert_eq!(signal_strength_percentage(Some(-30.0), Some(9.5)), 100.0);
        assert_eq!(signal_strength_percentage(Some(-125.0), Some(7.0)), 60.0);
        assert!(close(signal_strength_percentage(Some(-80.0), Some(10.0)), 80.0));
    }

    #[test]
    fn weak_snr_is_linear() {
        assert!(close(signal_strength_percentage(Some(-110.0), Some(-5.0)), 17.647058825));
        assert!(close(signal_strength_percentage(Some(-110.0), Some(6.9)), 59.64705883));
    }

    #[test]
    fn snr_floor_scores_zero() {
        assert_eq!(signal_strength_percentage(Some(-110.0), Some(-10.0)), 0.0);
        assert_eq!(signal_strength_percentage(Some(-110.0), Some(-15.0)), 0.0);
    }

    #[test]
    fn missing_or_zero_scores_zero() {
        assert_eq!(signal_strength_percentage(None, Some(8.0)), 0.0);
        assert_eq!(signal_strength_percentage(Some(-70.0), None), 0.0);
        assert_eq!(signal_strength_percentage(Some(0.0), Some(8.0)), 0.0);
        assert_eq!(signal_strength_percentage(Some(-70.0), Some(0.0)), 0.0);
    }
}
