use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::trace;

use super::medium::{Medium, Transmission};
use crate::mac::{CycleReport, FrameKind, Outcome, Station, StationId};
use crate::utils::consts::STOP_POLL_INTERVAL_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StationStats {
    pub id: StationId,
    pub offered: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub interrupted: u64,
    pub data_sent: u64,
    pub rts_sent: u64,
}

impl StationStats {
    fn record(&mut self, report: CycleReport) {
        self.data_sent += u64::from(report.attempts);
        self.rts_sent += u64::from(report.reservations);
        match report.outcome {
            Outcome::Delivered => self.delivered += 1,
            Outcome::Dropped => self.dropped += 1,
            Outcome::Interrupted => self.interrupted += 1,
        }
    }
}

/// A station attached to the simulated medium.
///
/// Packets arrive with exponentially distributed gaps. Arrivals keep their
/// schedule while a cycle is in progress, so a slow MAC builds up a backlog
/// that is served back to back.
pub struct SimStation {
    id: StationId,
    medium: Arc<Medium>,
    uplink: Sender<Transmission>,
    downlink: Receiver<FrameKind>,
    running: Arc<AtomicBool>,
    response_timeout: Duration,
    mean_interval: Duration,
    next_arrival: Instant,
    rng: StdRng,
    stats: StationStats,
}

impl SimStation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: StationId,
        medium: Arc<Medium>,
        uplink: Sender<Transmission>,
        downlink: Receiver<FrameKind>,
        running: Arc<AtomicBool>,
        response_timeout: Duration,
        mean_interval: Duration,
        seed: u64,
    ) -> Self {
        let mut station = Self {
            id,
            medium,
            uplink,
            downlink,
            running,
            response_timeout,
            mean_interval,
            next_arrival: Instant::now(),
            rng: StdRng::seed_from_u64(seed),
            stats: StationStats {
                id,
                ..StationStats::default()
            },
        };
        let gap = station.arrival_gap();
        station.next_arrival += gap;
        station
    }

    pub fn stats(&self) -> StationStats {
        self.stats
    }

    fn arrival_gap(&mut self) -> Duration {
        // Inverse transform sampling; 1 - u lies in (0, 1].
        let u: f64 = self.rng.random();
        self.mean_interval
            .mul_f64(-(1.0 - u).ln())
    }

    /// Sleeps until `deadline`, waking early if the station is stopped.
    /// Returns `false` when stopped.
    fn sleep_until(&self, deadline: Instant) -> bool {
        let slice = Duration::from_millis(STOP_POLL_INTERVAL_MS);
        loop {
            if self.stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep((deadline - now).min(slice));
        }
    }
}

impl Station for SimStation {
    fn id(&self) -> StationId {
        self.id
    }

    fn wait_for_next_transmission(&mut self) -> bool {
        if !self.sleep_until(self.next_arrival) {
            return false;
        }
        let gap = self.arrival_gap();
        self.next_arrival += gap;
        self.stats.offered += 1;
        true
    }

    fn send(&mut self, kind: FrameKind) {
        // Replies to earlier attempts must not answer this one.
        for stale in self.downlink.try_iter() {
            trace!("station {} discarding late {}", self.id, stale);
        }

        let tx = self.medium.transmit(self.id, kind);
        trace!("station {} sent {} (tx {})", self.id, kind, tx.id);
        // The access point only goes away at shutdown.
        let _ = self.uplink.send(tx);
    }

    fn receive(&mut self) -> Option<FrameKind> {
        self.downlink
            .recv_timeout(self.response_timeout)
            .ok()
    }

    fn sense(&mut self) -> bool {
        self.medium.is_busy_for(self.id)
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleep_until(Instant::now() + duration);
    }

    fn stopped(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }

    fn complete(&mut self, report: CycleReport) {
        self.stats.record(report);
    }
}
