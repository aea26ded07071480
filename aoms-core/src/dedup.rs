//! Repeat-delivery suppression for device telemetry
//!
//! LoRa network servers forward the same uplink once per receiving gateway,
//! and retransmissions reuse the frame counter. [`DedupGuard`] remembers the
//! last frame counter and arrival time per device and flags a message as a
//! duplicate when both match within a short window.
//!
//! ## Rule
//!
//! ```text
//! duplicate ⇔ fcnt == last_fcnt  ∧  now - last_seen < window
//! ```
//!
//! The entry is refreshed with `(fcnt, now)` on every call, duplicate or not,
//! so a steady stream of repeats keeps extending the window.
//!
//! ## Concurrency
//!
//! The device table is split into independently locked shards selected by a
//! hash of the device id. The check and the refresh for one device happen
//! under a single lock acquisition, so two concurrent deliveries of the same
//! frame cannot both be accepted. Devices in other shards are not blocked.
//!
//! Entries are never evicted; the table grows with the number of distinct
//! devices seen.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{
    config::DedupConfig,
    time::{elapsed_ms, SystemTime, Timestamp},
    traits::TimeSource,
};

#[derive(Debug, Clone, Copy)]
struct DeviceTrack {
    fcnt: u32,
    last_seen: Timestamp,
}

/// Counters since the guard was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Messages checked
    pub checked: u64,
    /// Messages flagged as duplicates
    pub duplicates: u64,
}

/// Thread-safe per-device duplicate detector
///
/// ```rust
/// use aoms_core::DedupGuard;
/// use aoms_core::config::DedupConfig;
///
/// let guard = DedupGuard::new(DedupConfig::default());
/// assert!(!guard.is_duplicate("70b3d57ed0001234", 17));
/// assert!(guard.is_duplicate("70b3d57ed0001234", 17));
/// ```
#[derive(Debug)]
pub struct DedupGuard<C: TimeSource = SystemTime> {
    shards: Vec<Mutex<HashMap<String, DeviceTrack>>>,
    window_ms: u64,
    clock: C,
    checked: AtomicU64,
    duplicates: AtomicU64,
}

impl DedupGuard<SystemTime> {
    /// Guard on the system clock
    pub fn new(config: DedupConfig) -> Self {
        Self::with_clock(config, SystemTime)
    }
}

impl<C: TimeSource> DedupGuard<C> {
    /// Guard on a caller-supplied clock
    pub fn with_clock(config: DedupConfig, clock: C) -> Self {
        let shards = (0..config.shards.max(1)).map(|_| Mutex::new(HashMap::new())).collect();

        Self {
            shards,
            window_ms: config.window_ms,
            clock,
            checked: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
        }
    }

    /// Duplicate window (ms)
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Check a delivery and record it
    pub fn is_duplicate(&self, device_id: &str, fcnt: u32) -> bool {
        let mut shard = self.shard(device_id);
        let now = self.clock.now();

        let duplicate = match shard.get_mut(device_id) {
            Some(track) => {
                let duplicate = track.fcnt == fcnt && elapsed_ms(track.last_seen, now) < self.window_ms;
                *track = DeviceTrack { fcnt, last_seen: now };
                duplicate
            }
            None => {
                shard.insert(device_id.to_owned(), DeviceTrack { fcnt, last_seen: now });
                false
            }
        };
        drop(shard);

        self.checked.fetch_add(1, Ordering::Relaxed);
        if duplicate {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            log_debug!("{}: fcnt {} repeated within {} ms", device_id, fcnt, self.window_ms);
        }

        duplicate
    }

    /// Number of devices seen so far
    pub fn tracked_devices(&self) -> usize {
        self.shards.iter().map(|s| lock(s).len()).sum()
    }

    /// Checked and duplicate counts
    pub fn stats(&self) -> DedupStats {
        DedupStats {
            checked: self.checked.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
        }
    }

    fn shard(&self, device_id: &str) -> MutexGuard<'_, HashMap<String, DeviceTrack>> {
        let mut hasher = DefaultHasher::new();
        device_id.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        lock(&self.shards[index])
    }
}

// A panic while holding a shard cannot leave a track half-written, so the
// data behind a poisoned lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MockTimeSource;
    use std::sync::Arc;
    use std::thread;

    const EUI: &str = "70b3d57ed0001234";

    fn guard() -> (DedupGuard<Arc<MockTimeSource>>, Arc<MockTimeSource>) {
        let clock = Arc::new(MockTimeSource::new(1_000_000));
        (DedupGuard::with_clock(DedupConfig::default(), Arc::clone(&clock)), clock)
    }

    #[test]
    fn first_message_is_never_duplicate() {
        let (guard, _) = guard();
        assert!(!guard.is_duplicate(EUI, 0));
        assert!(!guard.is_duplicate("70b3d57ed0005678", 0));
    }

    #[test]
    fn same_fcnt_within_window_is_duplicate() {
        let (guard, clock) = guard();
        assert!(!guard.is_duplicate(EUI, 5));
        clock.advance(100);
        assert!(guard.is_duplicate(EUI, 5));
    }

    #[test]
    fn same_fcnt_after_window_is_not_duplicate() {
        let (guard, clock) = guard();
        assert!(!guard.is_duplicate(EUI, 5));
        clock.advance(300);
        assert!(!guard.is_duplicate(EUI, 5));
    }

    #[test]
    fn incremented_fcnt_is_not_duplicate() {
        let (guard, clock) = guard();
        assert!(!guard.is_duplicate(EUI, 5));
        clock.advance(10);
        assert!(!guard.is_duplicate(EUI, 6));
    }

    #[test]
    fn duplicate_refreshes_window() {
        let (guard, clock) = guard();
        assert!(!guard.is_duplicate(EUI, 5));
        clock.advance(150);
        assert!(guard.is_duplicate(EUI, 5));
        clock.advance(150);
        // 300 ms after the first delivery but 150 ms after the refresh
        assert!(guard.is_duplicate(EUI, 5));
    }

    #[test]
    fn window_edge_is_not_duplicate() {
        let (guard, clock) = guard();
        assert!(!guard.is_duplicate(EUI, 5));
        clock.advance(200);
        assert!(!guard.is_duplicate(EUI, 5));
    }

    #[test]
    fn stats_count_verdicts() {
        let (guard, _) = guard();
        guard.is_duplicate(EUI, 1);
        guard.is_duplicate(EUI, 1);
        guard.is_duplicate(EUI, 2);

        assert_eq!(guard.stats(), DedupStats { checked: 3, duplicates: 1 });
        assert_eq!(guard.tracked_devices(), 1);
    }

    #[test]
    fn concurrent_deliveries_accept_exactly_one() {
        let (guard, _) = guard();
        let guard = Arc::new(guard);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                thread::spawn(move || guard.is_duplicate(EUI, 42))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|duplicate| !duplicate)
            .count();

        assert_eq!(accepted, 1);
    }

    #[test]
    fn single_shard_still_works() {
        let clock = Arc::new(MockTimeSource::new(0));
        let guard = DedupGuard::with_clock(DedupConfig { window_ms: 200, shards: 0 }, clock);
        assert!(!guard.is_duplicate(EUI, 1));
        assert!(guard.is_duplicate(EUI, 1));
    }

    /// Clock that only reports time, like a gateway beacon counter
    struct BeaconClock(Timestamp);

    impl TimeSource for BeaconClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    #[test]
    fn clock_needs_only_now() {
        let guard = DedupGuard::with_clock(DedupConfig::default(), BeaconClock(5_000));
        assert!(!guard.is_duplicate(EUI, 9));
        assert!(guard.is_duplicate(EUI, 9));
    }
}
