use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use tracing::{debug, trace};

use super::medium::{Medium, Transmission};
use crate::mac::{FrameKind, StationId};
use crate::utils::consts::{RTS_WAIT_MAX_S, STOP_POLL_INTERVAL_MS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApStats {
    pub data_received: u64,
    pub collisions: u64,
    pub acks_sent: u64,
    pub cts_sent: u64,
    pub rts_denied: u64,
}

/// The receiver every station talks to. Answers intact DATA with ACK and
/// grants at most one RTS reservation at a time.
pub struct AccessPoint {
    medium: Arc<Medium>,
    uplink: Receiver<Transmission>,
    downlinks: HashMap<StationId, Sender<FrameKind>>,
    /// How long a CTS holds the medium for its station.
    reservation: Duration,
    stats: ApStats,
}

impl AccessPoint {
    pub fn new(
        medium: Arc<Medium>,
        uplink: Receiver<Transmission>,
        downlinks: HashMap<StationId, Sender<FrameKind>>,
        response_timeout: Duration,
    ) -> Self {
        let airtime = medium.airtime();
        // Covers the station's post-CTS contention sleep plus the DATA exchange.
        let reservation = airtime.control
            + Duration::from_secs_f64(RTS_WAIT_MAX_S)
            + airtime.data
            + response_timeout;
        Self {
            medium,
            uplink,
            downlinks,
            reservation,
            stats: ApStats::default(),
        }
    }

    /// Serves the uplink until `running` is cleared or every station hangs up.
    pub fn run(mut self, running: Arc<AtomicBool>) -> ApStats {
        let mut pending: Vec<Transmission> = Vec::new();
        let idle_poll = Duration::from_millis(STOP_POLL_INTERVAL_MS);

        while running.load(Ordering::SeqCst) {
            let now = Instant::now();
            let (due, waiting): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|t| t.end <= now);
            pending = waiting;
            for tx in due {
                self.resolve(tx);
            }

            let timeout = pending
                .iter()
                .map(|t| t.end.saturating_duration_since(now))
                .min()
                .unwrap_or(idle_poll)
                .min(idle_poll);
            match self.uplink.recv_timeout(timeout) {
                Ok(tx) => pending.push(tx),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        debug!("Access point stopping: {:?}", self.stats);
        self.stats
    }

    /// Handles a frame whose airtime has fully elapsed.
    fn resolve(&mut self, tx: Transmission) {
        if self.medium.collided(tx.id) {
            self.stats.collisions += 1;
            trace!("{} from station {} lost to a collision", tx.kind, tx.src);
            return;
        }

        match tx.kind {
            FrameKind::Data => {
                self.stats.data_received += 1;
                self.medium.release(tx.src);
                self.reply(tx.src, FrameKind::Ack);
                self.stats.acks_sent += 1;
            }
            FrameKind::Rts => {
                let now = Instant::now();
                match self.medium.reserved_by(now) {
                    Some(holder) if holder != tx.src => {
                        self.stats.rts_denied += 1;
                        trace!(
                            "RTS from station {} denied, station {} holds the medium",
                            tx.src,
                            holder
                        );
                    }
                    _ => {
                        self.medium
                            .reserve(tx.src, now + self.reservation);
                        self.reply(tx.src, FrameKind::Cts);
                        self.stats.cts_sent += 1;
                    }
                }
            }
            FrameKind::Ack | FrameKind::Cts => {
                trace!("Ignoring stray {} from station {}", tx.kind, tx.src);
            }
        }
    }

    fn reply(&self, to: StationId, kind: FrameKind) {
        if let Some(downlink) = self.downlinks.get(&to) {
            // The station may already have shut down.
            let _ = downlink.send(kind);
        }
    }
}
