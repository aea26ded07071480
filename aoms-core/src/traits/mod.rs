//! Collaborator Traits and Abstractions
//!
//! The acquisition core never talks to a database, an instrument or a clock
//! directly. Every boundary is a trait so hosts plug in their own backends and
//! tests plug in deterministic fakes.
//!
//! ## Module Organization
//!
//! - [`store`] - datastore, persistence sink and spectrum source
//! - [`time`] - time source abstraction
//!
//! ## Boundaries
//!
//! ```text
//!  CalibrationStore ──► Channel::populate / load_settings / load_calibration
//!  SpectrumSource   ──► Acquisition::run_cycle  (one scan per channel)
//!  PersistenceSink  ◄── Acquisition::run_cycle  (measurements, health, peaks)
//!  TimeSource       ──► DedupGuard
//! ```
//!
//! All calls happen at defined points: channel population, the pre-cycle
//! calibration load and the post-cycle write. Nothing inside peak assignment,
//! measurement or health classification performs I/O.

pub mod store;
pub mod time;

pub use store::{
    CalibrationStore, PersistenceSink, SpectrumSource,
    ChannelRecord, SensorRecord, Row,
};

pub use time::TimeSource;
