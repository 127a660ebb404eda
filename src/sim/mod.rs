//! Threaded channel-access simulation.
//!
//! One access point thread and one thread per station share a [`Medium`].
//! Every station runs the same [`MacScheme`] so that schemes can be compared
//! under identical traffic.

pub mod access_point;
pub mod config;
pub mod medium;
pub mod report;
pub mod station;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Result, SimError};
use crate::mac::{MacScheme, StationId};
use crate::utils::consts::PROGRESS_UPDATE_INTERVAL_MS;
use access_point::AccessPoint;
use medium::{Airtime, Medium};
use station::SimStation;

pub use config::SimConfig;
pub use report::{SimReport, comparison_table};

/// Frames stay queryable on the medium this long after they end.
const MEDIUM_RETENTION: Duration = Duration::from_secs(1);

/// Clears the run flag on every exit path.
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Derives independent per-station seeds from the run seed.
fn station_seed(seed: u64, id: StationId, salt: u64) -> u64 {
    seed ^ (id as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt
}

pub struct Simulation {
    scheme: MacScheme,
    config: SimConfig,
}

impl Simulation {
    pub fn new(scheme: MacScheme, config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { scheme, config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs for the configured duration or until `keep_going` is cleared.
    ///
    /// `on_tick` is called with the elapsed time roughly every
    /// `PROGRESS_UPDATE_INTERVAL_MS`.
    pub fn run(
        &self,
        keep_going: &AtomicBool,
        mut on_tick: impl FnMut(Duration),
    ) -> Result<SimReport> {
        let config = &self.config;
        info!(
            "=== {} | {} stations | {:.1}s ===",
            self.scheme, config.stations, config.duration_secs
        );

        let medium = Arc::new(Medium::new(
            Airtime {
                data: config.data_airtime(),
                control: config.control_airtime(),
            },
            MEDIUM_RETENTION,
        ));
        let running = Arc::new(AtomicBool::new(true));
        let _stop_guard = StopOnDrop(running.clone());
        let (uplink_tx, uplink_rx) = crossbeam_channel::unbounded();

        let mut downlinks = HashMap::new();
        let mut stations = Vec::with_capacity(config.stations);
        for index in 0..config.stations {
            let id = index as StationId;
            let (downlink_tx, downlink_rx) = crossbeam_channel::unbounded();
            downlinks.insert(id, downlink_tx);
            stations.push(SimStation::new(
                id,
                medium.clone(),
                uplink_tx.clone(),
                downlink_rx,
                running.clone(),
                config.response_timeout(),
                config.arrival_interval(),
                station_seed(config.seed, id, 0),
            ));
        }
        drop(uplink_tx);

        let ap = AccessPoint::new(
            medium.clone(),
            uplink_rx,
            downlinks,
            config.response_timeout(),
        );
        let ap_running = running.clone();
        let ap_handle = thread::Builder::new()
            .name("access-point".into())
            .spawn(move || ap.run(ap_running))?;

        let start = Instant::now();
        let mut handles = Vec::with_capacity(stations.len());
        for mut station in stations {
            let id = station.stats().id;
            let mut mac = self
                .scheme
                .build(station_seed(config.seed, id, 0xA5A5_A5A5));
            let handle = thread::Builder::new()
                .name(format!("station-{}", id))
                .spawn(move || {
                    mac.run(&mut station);
                    station.stats()
                })?;
            handles.push((id, handle));
        }

        let deadline = start + config.duration();
        let tick = Duration::from_millis(PROGRESS_UPDATE_INTERVAL_MS);
        while keep_going.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(tick));
            on_tick(start.elapsed().min(config.duration()));
        }
        if !keep_going.load(Ordering::SeqCst) {
            warn!("Run interrupted after {:.2}s", start.elapsed().as_secs_f64());
        }

        running.store(false, Ordering::SeqCst);
        let mut station_stats = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let stats = handle
                .join()
                .map_err(|_| SimError::StationPanicked(id))?;
            debug!("Station {} finished: {:?}", id, stats);
            station_stats.push(stats);
        }
        let elapsed = start.elapsed().as_secs_f64();
        let ap_stats = ap_handle
            .join()
            .map_err(|_| SimError::AccessPointPanicked)?;

        let report = SimReport::new(
            self.scheme,
            config.clone(),
            elapsed,
            ap_stats,
            station_stats,
        );
        info!(
            "{} delivered {}/{} packets ({:.1}%), {} collisions",
            self.scheme,
            report.totals.delivered,
            report.totals.offered,
            report.totals.delivery_ratio * 100.0,
            report.access_point.collisions
        );
        Ok(report)
    }
}

/// Runs every scheme back to back with the same configuration and seed.
pub fn compare(
    config: &SimConfig,
    keep_going: &AtomicBool,
    mut on_tick: impl FnMut(MacScheme, Duration),
) -> Result<Vec<SimReport>> {
    let mut reports = Vec::with_capacity(MacScheme::ALL.len());
    for scheme in MacScheme::ALL {
        if !keep_going.load(Ordering::SeqCst) {
            break;
        }
        let sim = Simulation::new(scheme, config.clone())?;
        reports.push(sim.run(keep_going, |elapsed| on_tick(scheme, elapsed))?);
    }
    Ok(reports)
}
