//! Time sources for acquisition and deduplication
//!
//! Provides clock implementations for the [`TimeSource`] trait:
//! - System clock (when `std` is available)
//! - Mock clock, advanced atomically from any thread

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since epoch (or an arbitrary origin for test clocks)
pub type Timestamp = u64;

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Shareable mock clock
///
/// Advanced through `&self`, so one handle can sit inside a guard while the
/// test moves time forward through another.
///
/// ```rust
/// use std::sync::Arc;
/// use aoms_core::time::MockTimeSource;
/// use aoms_core::traits::TimeSource;
///
/// let clock = Arc::new(MockTimeSource::new(1_000));
/// let shared = Arc::clone(&clock);
/// clock.advance(250);
/// assert_eq!(shared.now(), 1_250);
/// ```
#[derive(Debug, Default)]
pub struct MockTimeSource {
    now_ms: AtomicU64,
}

impl MockTimeSource {
    /// Clock starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self { now_ms: AtomicU64::new(start) }
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.now_ms.store(timestamp, Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl<T: TimeSource + Sync + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Milliseconds elapsed from `earlier` to `later`, zero if the clock went backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
