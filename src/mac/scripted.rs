//! A `Station` double that replays scripted medium and reply behaviour and
//! records every call a strategy makes.

use std::collections::VecDeque;
use std::time::Duration;

use super::{CycleReport, FrameKind, Station, StationId};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Wait,
    Sense(bool),
    Send(FrameKind),
    Receive(Option<FrameKind>),
    Sleep(Duration),
}

pub struct ScriptedStation {
    packets: usize,
    busy: VecDeque<bool>,
    responses: VecDeque<Option<FrameKind>>,
    /// Stop once this many sends have been made.
    stop_after_sends: Option<usize>,
    /// Stop once the medium has been sensed this many times.
    stop_after_senses: Option<usize>,
    pub events: Vec<Event>,
    pub reports: Vec<CycleReport>,
}

impl ScriptedStation {
    pub fn new(packets: usize) -> Self {
        Self {
            packets,
            busy: VecDeque::new(),
            responses: VecDeque::new(),
            stop_after_sends: None,
            stop_after_senses: None,
            events: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Sense results, in order. Idle once exhausted.
    pub fn with_busy(mut self, busy: impl IntoIterator<Item = bool>) -> Self {
        self.busy.extend(busy);
        self
    }

    /// Receive results, in order. Timeouts once exhausted.
    pub fn with_responses(
        mut self,
        responses: impl IntoIterator<Item = Option<FrameKind>>,
    ) -> Self {
        self.responses.extend(responses);
        self
    }

    pub fn stop_after_sends(mut self, sends: usize) -> Self {
        self.stop_after_sends = Some(sends);
        self
    }

    pub fn stop_after_senses(mut self, senses: usize) -> Self {
        self.stop_after_senses = Some(senses);
        self
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events
            .iter()
            .filter(|e| pred(e))
            .count()
    }

    pub fn sends(&self) -> Vec<FrameKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Send(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

impl Station for ScriptedStation {
    fn id(&self) -> StationId {
        1
    }

    fn wait_for_next_transmission(&mut self) -> bool {
        self.events.push(Event::Wait);
        if self.packets == 0 || self.stopped() {
            return false;
        }
        self.packets -= 1;
        true
    }

    fn send(&mut self, kind: FrameKind) {
        self.events.push(Event::Send(kind));
    }

    fn receive(&mut self) -> Option<FrameKind> {
        let reply = self.responses.pop_front().flatten();
        self.events.push(Event::Receive(reply));
        reply
    }

    fn sense(&mut self) -> bool {
        let busy = self.busy.pop_front().unwrap_or(false);
        self.events.push(Event::Sense(busy));
        busy
    }

    fn sleep(&mut self, duration: Duration) {
        self.events.push(Event::Sleep(duration));
    }

    fn stopped(&self) -> bool {
        let sends = self
            .stop_after_sends
            .is_some_and(|limit| self.count(|e| matches!(e, Event::Send(_))) >= limit);
        let senses = self
            .stop_after_senses
            .is_some_and(|limit| self.count(|e| matches!(e, Event::Sense(_))) >= limit);
        sends || senses
    }

    fn complete(&mut self, report: CycleReport) {
        self.reports.push(report);
    }
}
