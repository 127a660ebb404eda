//! Shared wireless medium.
//!
//! Tracks which frames are on the air and whether any two of them overlapped.
//! A station that holds a CTS reservation keeps the medium busy for everyone
//! else until the reservation is released or expires.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::mac::{FrameKind, StationId};

pub type TxId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Airtime {
    pub data: Duration,
    pub control: Duration,
}

impl Airtime {
    pub fn of(&self, kind: FrameKind) -> Duration {
        if kind.is_control() {
            self.control
        } else {
            self.data
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Transmission {
    pub id: TxId,
    pub src: StationId,
    pub kind: FrameKind,
    pub start: Instant,
    pub end: Instant,
    pub collided: bool,
}

#[derive(Debug, Clone, Copy)]
struct Reservation {
    holder: StationId,
    until: Instant,
}

#[derive(Debug, Default)]
struct MediumState {
    next_id: TxId,
    on_air: Vec<Transmission>,
    reservation: Option<Reservation>,
}

pub struct Medium {
    airtime: Airtime,
    /// How long ended transmissions stay queryable.
    retention: Duration,
    state: Mutex<MediumState>,
}

impl Medium {
    pub fn new(airtime: Airtime, retention: Duration) -> Self {
        Self {
            airtime,
            retention,
            state: Mutex::new(MediumState::default()),
        }
    }

    pub fn airtime(&self) -> Airtime {
        self.airtime
    }

    /// Puts a frame on the air starting now.
    pub fn transmit(&self, src: StationId, kind: FrameKind) -> Transmission {
        self.transmit_at(src, kind, Instant::now())
    }

    pub fn transmit_at(
        &self,
        src: StationId,
        kind: FrameKind,
        start: Instant,
    ) -> Transmission {
        let end = start + self.airtime.of(kind);
        let mut state = self.lock();
        self.prune(&mut state, start);

        let mut collided = false;
        for other in state
            .on_air
            .iter_mut()
            .filter(|t| t.start < end && start < t.end)
        {
            other.collided = true;
            collided = true;
        }
        if collided {
            trace!("{} from {} collided on the medium", kind, src);
        }

        let tx = Transmission {
            id: state.next_id,
            src,
            kind,
            start,
            end,
            collided,
        };
        state.next_id += 1;
        state.on_air.push(tx);
        tx
    }

    /// Carrier sense as seen by `station`.
    pub fn is_busy_for(&self, station: StationId) -> bool {
        self.is_busy_at(station, Instant::now())
    }

    pub fn is_busy_at(&self, station: StationId, now: Instant) -> bool {
        let state = self.lock();
        let on_air = state
            .on_air
            .iter()
            .any(|t| t.start <= now && now < t.end);
        let reserved = state
            .reservation
            .is_some_and(|r| r.holder != station && now < r.until);
        on_air || reserved
    }

    /// Whether the transmission overlapped another one. Unknown ids (pruned
    /// long ago) count as collided.
    pub fn collided(&self, id: TxId) -> bool {
        self.lock()
            .on_air
            .iter()
            .find(|t| t.id == id)
            .is_none_or(|t| t.collided)
    }

    /// Current reservation holder, ignoring expired reservations.
    pub fn reserved_by(&self, now: Instant) -> Option<StationId> {
        self.lock()
            .reservation
            .filter(|r| now < r.until)
            .map(|r| r.holder)
    }

    pub fn reserve(&self, holder: StationId, until: Instant) {
        self.lock().reservation = Some(Reservation { holder, until });
    }

    pub fn release(&self, holder: StationId) {
        let mut state = self.lock();
        if state
            .reservation
            .is_some_and(|r| r.holder == holder)
        {
            state.reservation = None;
        }
    }

    fn prune(&self, state: &mut MediumState, now: Instant) {
        let retention = self.retention;
        state
            .on_air
            .retain(|t| t.end + retention > now);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MediumState> {
        // Poisoned only if a station thread panicked mid-call.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
