//! Scan cycle orchestration
//!
//! [`Acquisition`] owns the channel set and drives one cycle at a time:
//!
//! ```text
//! for each active channel:
//!     SpectrumSource::scan ─► peaks (instrument or detect_peaks)
//!         ─► assign_wavelengths ─► update_spectrum ─► calc_measurement
//!         ─► update_health ─► PersistenceSink writes
//! then PersistenceSink::write_heartbeat
//! ```
//!
//! ## Failure Containment
//!
//! A failed scan skips only that channel. A failed write is recorded in the
//! [`CycleReport`] and the cycle carries on with the next write. Nothing is
//! retried here; the host decides what to do with a report that is not
//! clean.
//!
//! ## Configuration Sync
//!
//! Between cycles the host calls [`Acquisition::sync_flags`]. When the
//! configuration front end has raised the channel-update flag, channels are
//! rebuilt and recalibrated, then the flag is cleared through the store.

use alloc::vec::Vec;

use crate::{
    channel::Channel,
    config::{AomsConfig, ConfigFlags, GeneralSettings},
    detect::detect_peaks,
    errors::{AomsResult, ScanError, StoreError},
    sensor::ChannelHealth,
    time::Timestamp,
    traits::{CalibrationStore, PersistenceSink, SpectrumSource},
};

/// What a sink write was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    /// Aggregate channel health
    ChannelHealth,
    /// Health of one sensor
    SensorHealth(u32),
    /// Spectrum record
    Spectrum,
    /// Assigned wavelengths for the spectrum record
    Wavelengths,
    /// Measurement of one sensor
    Measurement(u32),
}

/// Outcome of one sink write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Write target
    pub target: WriteTarget,
    /// Sink result
    pub result: Result<(), StoreError>,
}

/// Result of one channel within a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    /// Channel id
    pub channel_id: u32,
    /// Scan outcome; on failure nothing else ran for the channel
    pub scan: Result<(), ScanError>,
    /// Peaks measured on the sweep
    pub peaks_measured: usize,
    /// Peaks handed to a sensor
    pub peaks_assigned: usize,
    /// Channel health after the cycle
    pub health: ChannelHealth,
    /// Every sink write attempted, in order
    pub writes: Vec<WriteOutcome>,
}

impl ChannelReport {
    fn new(channel_id: u32) -> Self {
        Self {
            channel_id,
            scan: Ok(()),
            peaks_measured: 0,
            peaks_assigned: 0,
            health: ChannelHealth::ERROR,
            writes: Vec::new(),
        }
    }

    fn record(&mut self, target: WriteTarget, result: Result<(), StoreError>) {
        if let Err(e) = result {
            log_warn!("CH#{:02}: write {:?} failed: {}", self.channel_id, target, e);
        }
        self.writes.push(WriteOutcome { target, result });
    }

    /// Scan succeeded and every write was accepted
    pub fn is_success(&self) -> bool {
        self.scan.is_ok() && self.writes.iter().all(|w| w.result.is_ok())
    }

    /// Writes the sink refused or failed
    pub fn failed_writes(&self) -> impl Iterator<Item = &WriteOutcome> {
        self.writes.iter().filter(|w| w.result.is_err())
    }
}

/// Result of one full cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle timestamp
    pub timestamp: Timestamp,
    /// One report per scanned channel
    pub channels: Vec<ChannelReport>,
    /// Heartbeat write, attempted after every channel
    pub heartbeat: Result<(), StoreError>,
}

impl CycleReport {
    /// Every channel succeeded and the heartbeat was stored
    pub fn is_success(&self) -> bool {
        self.heartbeat.is_ok() && self.channels.iter().all(ChannelReport::is_success)
    }

    /// Total failed writes across channels
    pub fn failed_write_count(&self) -> usize {
        self.channels.iter().map(|c| c.failed_writes().count()).sum()
    }

    /// Report for one channel
    pub fn channel(&self, channel_id: u32) -> Option<&ChannelReport> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }
}

/// Channel set and cycle driver
#[derive(Debug, Clone, Default)]
pub struct Acquisition {
    config: AomsConfig,
    channels: Vec<Channel>,
    flags: ConfigFlags,
}

impl Acquisition {
    /// Empty acquisition; call [`Acquisition::create_channels`] next
    pub fn new(config: AomsConfig) -> Self {
        Self {
            config,
            channels: Vec::new(),
            flags: ConfigFlags::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &AomsConfig {
        &self.config
    }

    /// General settings currently applied
    pub fn general_settings(&self) -> &GeneralSettings {
        &self.config.general
    }

    /// Flags seen at the last sync
    pub fn flags(&self) -> ConfigFlags {
        self.flags
    }

    /// All channels, active or not
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel by id
    pub fn channel(&self, id: u32) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id() == id)
    }

    /// Mutable channel by id
    pub fn channel_mut(&mut self, id: u32) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id() == id)
    }

    /// Rebuild channels and their sensors from the datastore
    ///
    /// A channel whose sensor list cannot be fetched is kept without sensors.
    /// Returns the number of channels created.
    pub fn create_channels<S>(&mut self, store: &S) -> AomsResult<usize>
    where
        S: CalibrationStore + ?Sized,
    {
        let records = store.get_channels()?;

        let mut channels: Vec<Channel> = records
            .iter()
            .map(|r| Channel::new(r.id, &r.serial_number, r.is_active, r.status))
            .collect();
        channels.sort_by_key(Channel::id);

        for channel in &mut channels {
            if let Err(e) = channel.populate(store) {
                log_warn!("CH#{:02}: sensors unavailable: {}", channel.id(), e);
            }
        }

        log_info!(
            "{} channels created, {} active",
            channels.len(),
            channels.iter().filter(|c| c.is_active()).count()
        );

        self.channels = channels;
        Ok(self.channels.len())
    }

    /// Load general settings, channel settings and calibration
    ///
    /// Returns `true` only when everything loaded cleanly. Partial failures
    /// are logged and leave defaults or sentinels in place.
    pub fn load_configuration<S>(&mut self, store: &S) -> bool
    where
        S: CalibrationStore + ?Sized,
    {
        let mut clean = self.load_general_settings(store);

        let defaults = self.config.channel_defaults;
        for channel in &mut self.channels {
            clean &= channel.load_settings(store, &defaults).is_ok();
            clean &= channel.load_calibration(store);
        }

        clean
    }

    fn load_general_settings<S>(&mut self, store: &S) -> bool
    where
        S: CalibrationStore + ?Sized,
    {
        let parsed = store
            .get_general_settings()
            .map_err(Into::into)
            .and_then(|pairs| GeneralSettings::from_pairs(&pairs));

        match parsed {
            Ok(general) => {
                self.config.general = general;
                true
            }
            Err(e) => {
                log_warn!("general settings not loaded, keeping current: {}", e);
                false
            }
        }
    }

    /// Read control flags and apply pending reloads
    pub fn sync_flags<S>(&mut self, store: &S) -> AomsResult<ConfigFlags>
    where
        S: CalibrationStore + ?Sized,
    {
        let pairs = store.get_internal_settings()?;
        let flags = ConfigFlags::from_pairs(&pairs)?;

        if flags.channel_update {
            log_info!("channel update requested, reloading channels");
            self.create_channels(store)?;
            self.load_configuration(store);
            store.set_internal_setting(ConfigFlags::CHANNEL_UPDATE, 0)?;
        } else if flags.general_settings_update {
            log_info!("general settings update requested");
            self.load_general_settings(store);
        }

        if flags.general_settings_update {
            store.set_internal_setting(ConfigFlags::GENERAL_SETTINGS_UPDATE, 0)?;
        }

        self.flags = flags;
        Ok(flags)
    }

    /// Scan every active channel once and persist the results
    pub fn run_cycle<Src, Snk>(&mut self, source: &mut Src, sink: &mut Snk, timestamp: Timestamp) -> CycleReport
    where
        Src: SpectrumSource + ?Sized,
        Snk: PersistenceSink + ?Sized,
    {
        let thresholds = self.config.health;

        let channels = self
            .channels
            .iter_mut()
            .filter(|c| c.is_active())
            .map(|channel| {
                let mut report = ChannelReport::new(channel.id());

                let scan = match source.scan(channel.id()) {
                    Ok(scan) => scan,
                    Err(e) => {
                        log_warn!("CH#{:02}: scan failed: {}", channel.id(), e);
                        report.scan = Err(e.into());
                        return report;
                    }
                };

                let measured = match scan.peaks() {
                    Some(peaks) => peaks.to_vec(),
                    None => detect_peaks(&scan, channel.settings()),
                };

                channel.assign_wavelengths(&measured);
                channel.update_spectrum(&scan);
                channel.calc_measurement();
                report.health = channel.update_health(scan.power_dbm(), &thresholds);

                report.peaks_measured = measured.len();
                report.peaks_assigned = channel.sensors().iter().filter(|s| s.peak().is_assigned()).count();

                log_debug!("{}", channel.wavelength_summary());
                log_debug!("{}", channel.measurement_summary());

                persist(channel, sink, timestamp, &mut report);
                report
            })
            .collect();

        let heartbeat = sink.write_heartbeat(timestamp, crate::VERSION);
        if let Err(e) = heartbeat {
            log_warn!("heartbeat write failed: {}", e);
        }

        CycleReport { timestamp, channels, heartbeat }
    }
}

fn persist<Snk>(channel: &Channel, sink: &mut Snk, timestamp: Timestamp, report: &mut ChannelReport)
where
    Snk: PersistenceSink + ?Sized,
{
    let id = channel.id();

    report.record(WriteTarget::ChannelHealth, sink.write_channel_health(id, channel.health()));

    for sensor in channel.sensors() {
        report.record(
            WriteTarget::SensorHealth(sensor.id()),
            sink.write_sensor_health(id, sensor.id(), sensor.health()),
        );
    }

    if channel.is_empty() {
        return;
    }

    match sink.write_spectrum(id, timestamp) {
        Ok(spectrum_id) => {
            report.record(WriteTarget::Spectrum, Ok(()));
            report.record(
                WriteTarget::Wavelengths,
                sink.write_wavelengths(spectrum_id, id, &channel.sensor_ids(), &channel.wavelengths()),
            );
        }
        Err(e) => report.record(WriteTarget::Spectrum, Err(e)),
    }

    for sensor in channel.sensors().iter().filter(|s| s.kind().is_supported()) {
        report.record(
            WriteTarget::Measurement(sensor.id()),
            sink.write_measurement(id, sensor.id(), sensor.measurement()),
        );
    }
}
