use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::trace;

use super::{CycleReport, FrameKind, MacProtocol, Outcome, Station};
use crate::utils::consts::{
    BACKOFF_ATTEMPTS, BACKOFF_JITTER_MAX_S, BACKOFF_JITTER_MIN_S, MAX_BACKOFF_S,
};

/// `min(2^attempt + jitter, MAX_BACKOFF_S)` seconds.
///
/// The exponent term is in whole seconds while the ceiling is 50 ms, so every
/// attempt index saturates at the ceiling. Kept as is on purpose; see
/// DESIGN.md.
pub fn backoff_wait(attempt: u32, jitter: f64) -> Duration {
    let t = 2f64.powi(attempt as i32) + jitter;
    Duration::from_secs_f64(t.min(MAX_BACKOFF_S))
}

/// NullMac with a capped exponential wait after every unacknowledged send.
#[derive(Debug)]
pub struct NullMacExponentialBackoff {
    rng: StdRng,
}

impl NullMacExponentialBackoff {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for NullMacExponentialBackoff {
    fn default() -> Self {
        Self::new()
    }
}

impl MacProtocol for NullMacExponentialBackoff {
    fn name(&self) -> &'static str {
        "NullMacExponentialBackoff"
    }

    fn deliver(&mut self, station: &mut dyn Station) -> CycleReport {
        let mut attempts = 0;
        for i in 0..BACKOFF_ATTEMPTS {
            if i > 0 && station.stopped() {
                return CycleReport::new(Outcome::Interrupted, attempts);
            }
            station.send(FrameKind::Data);
            attempts += 1;

            if station.receive() == Some(FrameKind::Ack) {
                return CycleReport::new(Outcome::Delivered, attempts);
            }

            let jitter = self
                .rng
                .random_range(BACKOFF_JITTER_MIN_S..=BACKOFF_JITTER_MAX_S);
            let wait = backoff_wait(i, jitter);
            trace!(
                "station {} backing off {:?} after attempt {}",
                station.id(),
                wait,
                i
            );
            station.sleep(wait);
        }
        CycleReport::new(Outcome::Dropped, attempts)
    }
}
