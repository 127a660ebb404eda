use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::trace;

use super::{CycleReport, FrameKind, MacProtocol, Outcome, Station};
use crate::utils::consts::{CSMA_WAIT_MAX_S, CSMA_WAIT_MIN_S};

/// Carrier sense multiple access with collision avoidance.
///
/// The station only transmits after sensing an idle medium, polling it at a
/// fixed per-packet interval while it is busy. A packet is retried until it is
/// acknowledged; there is no drop path.
#[derive(Debug)]
pub struct CsmaCa {
    rng: StdRng,
    attempt_cap: Option<u32>,
}

impl CsmaCa {
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

    /// Give up on a packet (as `Interrupted`) after `cap` DATA sends.
    pub fn with_attempt_cap(mut self, cap: u32) -> Self {
        self.attempt_cap = Some(cap);
        self
    }
}

impl Default for CsmaCa {
    fn default() -> Self {
        Self::new()
    }
}

impl MacProtocol for CsmaCa {
    fn name(&self) -> &'static str {
        "CSMA_CA"
    }

    fn deliver(&mut self, station: &mut dyn Station) -> CycleReport {
        // Sampled once per packet and reused for every busy poll.
        let wait =
            super::contention_wait(&mut self.rng, CSMA_WAIT_MIN_S, CSMA_WAIT_MAX_S);
        let mut attempts = 0;

        loop {
            if self.attempt_cap.is_some_and(|cap| attempts >= cap) {
                return CycleReport::new(Outcome::Interrupted, attempts);
            }

            while station.sense() {
                if station.stopped() {
                    return CycleReport::new(Outcome::Interrupted, attempts);
                }
                trace!("station {} medium busy, deferring {:?}", station.id(), wait);
                station.sleep(wait);
            }

            station.send(FrameKind::Data);
            attempts += 1;
            if station.receive() == Some(FrameKind::Ack) {
                return CycleReport::new(Outcome::Delivered, attempts);
            }
            if station.stopped() {
                return CycleReport::new(Outcome::Interrupted, attempts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::scripted::{Event, ScriptedStation};
    use std::time::Duration;

    #[test]
    fn defers_while_busy_and_reuses_the_same_wait() {
        let mut station = ScriptedStation::new(1)
            .with_busy([true, true, true])
            .with_responses([Some(FrameKind::Ack)]);
        CsmaCa::seeded(9).run(&mut station);

        let sleeps = station.sleeps();
        assert_eq!(sleeps.len(), 3);
        assert!(sleeps.iter().all(|d| *d == sleeps[0]));
        assert!(sleeps[0] >= Duration::from_secs_f64(CSMA_WAIT_MIN_S));
        assert!(sleeps[0] <= Duration::from_secs_f64(CSMA_WAIT_MAX_S));

        // Nothing is sent until the first idle sense.
        let first_send = station
            .events
            .iter()
            .position(|e| matches!(e, Event::Send(_)))
            .unwrap();
        assert_eq!(station.events[first_send - 1], Event::Sense(false));
        assert_eq!(station.sends(), vec![FrameKind::Data]);
    }

    #[test]
    fn senses_before_every_send() {
        let mut station = ScriptedStation::new(1)
            .with_busy([false, true, false, false])
            .with_responses([None, None, Some(FrameKind::Ack)]);
        let report = CsmaCa::seeded(1).deliver(&mut station);

        assert_eq!(report, CycleReport::new(Outcome::Delivered, 3));
        for (i, event) in station.events.iter().enumerate() {
            if matches!(event, Event::Send(_)) {
                assert_eq!(station.events[i - 1], Event::Sense(false));
            }
        }
    }

    #[test]
    fn keeps_retrying_without_an_ack() {
        let mut station = ScriptedStation::new(1);
        let report = CsmaCa::seeded(2)
            .with_attempt_cap(50)
            .deliver(&mut station);

        assert_eq!(report, CycleReport::new(Outcome::Interrupted, 50));
        assert_eq!(station.sends().len(), 50);
        assert!(station.sleeps().is_empty());
    }

    #[test]
    fn long_busy_period_holds_back_the_send() {
        let mut station = ScriptedStation::new(1)
            .with_busy(std::iter::repeat_n(true, 200))
            .with_responses([Some(FrameKind::Ack)]);
        let report = CsmaCa::seeded(4).deliver(&mut station);

        assert_eq!(report, CycleReport::new(Outcome::Delivered, 1));
        assert_eq!(station.sleeps().len(), 200);
        assert_eq!(station.count(|e| matches!(e, Event::Sense(_))), 201);
        assert!(matches!(station.events[401], Event::Send(FrameKind::Data)));
    }

    #[test]
    fn stop_during_busy_period_sends_nothing() {
        let mut station = ScriptedStation::new(1)
            .with_busy(std::iter::repeat_n(true, 1000))
            .stop_after_senses(10);
        let report = CsmaCa::seeded(6).deliver(&mut station);

        assert_eq!(report, CycleReport::new(Outcome::Interrupted, 0));
        assert!(station.sends().is_empty());
        assert_eq!(station.count(|e| matches!(e, Event::Sense(_))), 10);
        assert_eq!(station.sleeps().len(), 9);
    }
}
