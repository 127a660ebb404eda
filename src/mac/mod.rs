//! Medium access control strategies.
//!
//! Every strategy drives a single station through its packet cycles. All side
//! effects (sensing, sending, waiting for a reply, sleeping) go through the
//! [`Station`] environment, so the same state machine runs against the threaded
//! simulator in [`crate::sim`] and against scripted doubles in tests.

pub mod backoff;
pub mod csma;
pub mod null;
pub mod rts_cts;

#[cfg(test)]
pub(crate) mod scripted;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use backoff::NullMacExponentialBackoff;
pub use csma::CsmaCa;
pub use null::NullMac;
pub use rts_cts::RtsCts;

pub type StationId = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameKind {
    Data,
    Ack,
    Rts,
    Cts,
}

impl FrameKind {
    pub fn is_control(self) -> bool {
        !matches!(self, FrameKind::Data)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Data => "DATA",
            FrameKind::Ack => "ACK",
            FrameKind::Rts => "RTS",
            FrameKind::Cts => "CTS",
        };
        f.write_str(name)
    }
}

/// Capabilities a MAC strategy needs from the station it runs on.
pub trait Station {
    fn id(&self) -> StationId;

    /// Blocks until a packet is queued for transmission.
    ///
    /// Returns `false` once the station has been asked to stop; the caller
    /// must not start another packet cycle after that.
    fn wait_for_next_transmission(&mut self) -> bool;

    /// Puts a frame on the medium. Does not wait for any reply.
    fn send(&mut self, kind: FrameKind);

    /// Waits (bounded by the environment's response timeout) for a reply.
    fn receive(&mut self) -> Option<FrameKind>;

    /// `true` while the medium is busy. Always queried live.
    fn sense(&mut self) -> bool;

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn stopped(&self) -> bool {
        false
    }

    /// Hook for statistics; called once per finished packet cycle.
    fn complete(&mut self, _report: CycleReport) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// ACK received for the DATA frame.
    Delivered,
    /// Retry budget exhausted; the packet is discarded.
    Dropped,
    /// Stop signal or attempt cap ended the cycle before an ACK.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub outcome: Outcome,
    /// DATA transmissions made for this packet.
    pub attempts: u32,
    /// RTS transmissions made for this packet.
    pub reservations: u32,
}

impl CycleReport {
    pub fn new(outcome: Outcome, attempts: u32) -> Self {
        Self {
            outcome,
            attempts,
            reservations: 0,
        }
    }

    pub fn with_reservations(mut self, reservations: u32) -> Self {
        self.reservations = reservations;
        self
    }
}

pub trait MacProtocol: Send {
    fn name(&self) -> &'static str;

    /// Resolves exactly one queued packet: delivered, dropped or interrupted.
    fn deliver(&mut self, station: &mut dyn Station) -> CycleReport;

    fn run(&mut self, station: &mut dyn Station) {
        while station.wait_for_next_transmission() {
            let report = self.deliver(station);
            debug!(
                "[{}] station {} cycle finished: {:?} after {} attempt(s)",
                self.name(),
                station.id(),
                report.outcome,
                report.attempts
            );
            station.complete(report);
            if station.stopped() {
                break;
            }
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MacScheme {
    NullMac,
    NullMacBackoff,
    CsmaCa,
    RtsCts,
}

impl MacScheme {
    pub const ALL: [MacScheme; 4] = [
        MacScheme::NullMac,
        MacScheme::NullMacBackoff,
        MacScheme::CsmaCa,
        MacScheme::RtsCts,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MacScheme::NullMac => "NullMac",
            MacScheme::NullMacBackoff => "NullMacExponentialBackoff",
            MacScheme::CsmaCa => "CSMA_CA",
            MacScheme::RtsCts => "RTS_CTS",
        }
    }

    pub fn build(self, seed: u64) -> Box<dyn MacProtocol> {
        match self {
            MacScheme::NullMac => Box::new(NullMac::new()),
            MacScheme::NullMacBackoff => {
                Box::new(NullMacExponentialBackoff::seeded(seed))
            }
            MacScheme::CsmaCa => Box::new(CsmaCa::seeded(seed)),
            MacScheme::RtsCts => Box::new(RtsCts::seeded(seed)),
        }
    }
}

impl fmt::Display for MacScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Draws a contention wait uniformly from `[lo, hi]` seconds.
pub(crate) fn contention_wait(
    rng: &mut impl rand::Rng,
    lo: f64,
    hi: f64,
) -> Duration {
    Duration::from_secs_f64(rng.random_range(lo..=hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::scripted::{Event, ScriptedStation};

    #[test]
    fn frame_kind_prints_wire_names() {
        assert_eq!(FrameKind::Data.to_string(), "DATA");
        assert_eq!(FrameKind::Cts.to_string(), "CTS");
        assert!(FrameKind::Rts.is_control());
        assert!(!FrameKind::Data.is_control());
    }

    #[test]
    fn run_resolves_every_queued_packet_then_returns() {
        let mut station = ScriptedStation::new(3)
            .with_responses([Some(FrameKind::Ack), None, None, None, Some(FrameKind::Ack)]);
        let mut mac = NullMac::new();
        mac.run(&mut station);

        assert_eq!(station.reports.len(), 3);
        assert_eq!(station.reports[0], CycleReport::new(Outcome::Delivered, 1));
        assert_eq!(station.reports[1], CycleReport::new(Outcome::Dropped, 3));
        assert_eq!(station.reports[2], CycleReport::new(Outcome::Delivered, 1));
        assert_eq!(station.count(|e| matches!(e, Event::Wait)), 4);
    }

    #[test]
    fn every_scheme_builds_with_its_label() {
        for scheme in MacScheme::ALL {
            assert_eq!(scheme.build(7).name(), scheme.label());
        }
    }
}
