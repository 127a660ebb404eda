use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::trace;

use super::{CycleReport, FrameKind, MacProtocol, Outcome, Station};
use crate::utils::consts::{RTS_WAIT_MAX_S, RTS_WAIT_MIN_S};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RtsCtsState {
    Reserving,
    Reserved,
    Done,
}

/// CSMA/CA extended with an RTS/CTS handshake.
///
/// A CTS reserves the channel for exactly one DATA frame. When that frame is
/// not acknowledged the reservation is gone and the station has to go through
/// RTS again before it may resend.
#[derive(Debug)]
pub struct RtsCts {
    rng: StdRng,
    attempt_cap: Option<u32>,
}

impl RtsCts {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            attempt_cap: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            attempt_cap: None,
        }
    }

    /// Give up on a packet (as `Interrupted`) after `cap` RTS sends.
    pub fn with_attempt_cap(mut self, cap: u32) -> Self {
        self.attempt_cap = Some(cap);
        self
    }
}

impl Default for RtsCts {
    fn default() -> Self {
        Self::new()
    }
}

impl MacProtocol for RtsCts {
    fn name(&self) -> &'static str {
        "RTS_CTS"
    }

    fn deliver(&mut self, station: &mut dyn Station) -> CycleReport {
        let mut attempts = 0;
        let mut reservations = 0;
        let interrupted = |attempts, reservations| {
            CycleReport::new(Outcome::Interrupted, attempts)
                .with_reservations(reservations)
        };

        let mut state = RtsCtsState::Reserving;
        loop {
            match state {
                RtsCtsState::Reserving => {
                    let wait = super::contention_wait(
                        &mut self.rng,
                        RTS_WAIT_MIN_S,
                        RTS_WAIT_MAX_S,
                    );
                    while state == RtsCtsState::Reserving {
                        if station.stopped() {
                            return interrupted(attempts, reservations);
                        }
                        if !station.sense() {
                            if self
                                .attempt_cap
                                .is_some_and(|cap| reservations >= cap)
                            {
                                return interrupted(attempts, reservations);
                            }
                            station.send(FrameKind::Rts);
                            reservations += 1;
                            if station.receive() == Some(FrameKind::Cts) {
                                trace!("station {} holds a reservation", station.id());
                                state = RtsCtsState::Reserved;
                            }
                        }
                        // Unconditional, even right after a CTS.
                        station.sleep(wait);
                    }
                }
                RtsCtsState::Reserved => {
                    station.send(FrameKind::Data);
                    attempts += 1;
                    if station.receive() == Some(FrameKind::Ack) {
                        state = RtsCtsState::Done;
                    } else {
                        trace!(
                            "station {} DATA unacknowledged, renewing reservation",
                            station.id()
                        );
                        state = RtsCtsState::Reserving;
                    }
                }
                RtsCtsState::Done => break,
            }
        }

        CycleReport::new(Outcome::Delivered, attempts).with_reservations(reservations)
    }
}
