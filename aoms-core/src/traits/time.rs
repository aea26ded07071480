//! Time Source Abstraction
//!
//! The deduplication window is time based. Injecting the clock keeps the
//! window testable without sleeping.
//!
//! ## Common Implementations
//!
//! - `SystemTime`: wall clock, milliseconds since the Unix epoch (`std`)
//! - `MockTimeSource`: atomically advanced, shareable across threads

use crate::time::Timestamp;

/// Source of time for the system
///
/// ## Implementation Requirements
///
/// - `now()` must be thread-safe when shared through a deduplication guard
/// - Timestamps from one source must share an origin
///
/// ## Example Implementation
///
/// ```rust
/// use aoms_core::traits::TimeSource;
/// use aoms_core::time::Timestamp;
///
/// struct GatewayClock {
///     last_beacon_ms: Timestamp,
/// }
///
/// impl TimeSource for GatewayClock {
///     fn now(&self) -> Timestamp {
///         self.last_beacon_ms
///     }
/// }
/// ```
pub trait TimeSource: Send {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}
