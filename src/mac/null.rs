use tracing::trace;

use super::{CycleReport, FrameKind, MacProtocol, Outcome, Station};

/// Total DATA transmissions per packet (one try plus two retries).
pub const NULL_MAC_ATTEMPTS: u32 = 3;

/// No medium access control at all: transmit as soon as a packet is ready and
/// retransmit back to back until an ACK arrives or the attempts run out.
#[derive(Debug, Default)]
pub struct NullMac;

impl NullMac {
    pub fn new() -> Self {
        Self
    }
}

impl MacProtocol for NullMac {
    fn name(&self) -> &'static str {
        "NullMac"
    }

    fn deliver(&mut self, station: &mut dyn Station) -> CycleReport {
        let mut attempts = 0;
        while attempts < NULL_MAC_ATTEMPTS {
            if attempts > 0 && station.stopped() {
                return CycleReport::new(Outcome::Interrupted, attempts);
            }
            station.send(FrameKind::Data);
            attempts += 1;

            match station.receive() {
                Some(FrameKind::Ack) => {
                    return CycleReport::new(Outcome::Delivered, attempts);
                }
                other => trace!(
                    "station {} attempt {} got {:?} instead of ACK",
                    station.id(),
                    attempts,
                    other
                ),
            }
        }
        CycleReport::new(Outcome::Dropped, attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::scripted::{Event, ScriptedStation};

    #[test]
    fn drops_after_three_unacknowledged_sends() {
        let mut station = ScriptedStation::new(1);
        NullMac::new().run(&mut station);

        assert_eq!(station.sends(), vec![FrameKind::Data; 3]);
        assert_eq!(station.reports, vec![CycleReport::new(Outcome::Dropped, 3)]);
    }

    #[test]
    fn stops_retrying_once_acknowledged() {
        let mut station =
            ScriptedStation::new(1).with_responses([None, Some(FrameKind::Ack)]);
        NullMac::new().run(&mut station);

        assert_eq!(station.sends().len(), 2);
        assert_eq!(station.reports[0].outcome, Outcome::Delivered);
    }

    #[test]
    fn wrong_reply_counts_as_failure() {
        let mut station = ScriptedStation::new(1).with_responses([
            Some(FrameKind::Cts),
            Some(FrameKind::Data),
            Some(FrameKind::Ack),
        ]);
        let report = NullMac::new().deliver(&mut station);
        assert_eq!(report, CycleReport::new(Outcome::Delivered, 3));
    }

    #[test]
    fn never_senses_or_sleeps() {
        let mut station = ScriptedStation::new(2);
        NullMac::new().run(&mut station);

        assert_eq!(station.count(|e| matches!(e, Event::Sense(_))), 0);
        assert!(station.sleeps().is_empty());
    }

    #[test]
    fn each_packet_starts_with_a_fresh_budget() {
        let mut station = ScriptedStation::new(2)
            .with_responses([None, None, None, Some(FrameKind::Ack)]);
        NullMac::new().run(&mut station);

        assert_eq!(station.sends().len(), 4);
        assert_eq!(
            station.reports,
            vec![
                CycleReport::new(Outcome::Dropped, 3),
                CycleReport::new(Outcome::Delivered, 1),
            ]
        );
    }

    #[test]
    fn stop_signal_ends_cycle_between_attempts() {
        let mut station = ScriptedStation::new(5).stop_after_sends(1);
        NullMac::new().run(&mut station);

        assert_eq!(station.sends().len(), 1);
        assert_eq!(
            station.reports,
            vec![CycleReport::new(Outcome::Interrupted, 1)]
        );
    }
}
