use std::fmt;

use serde::Serialize;

use super::access_point::ApStats;
use super::config::SimConfig;
use super::station::StationStats;
use crate::mac::MacScheme;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub offered: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub interrupted: u64,
    pub data_sent: u64,
    pub rts_sent: u64,
    /// Delivered over offered.
    pub delivery_ratio: f64,
    /// Delivered packets per second of run time.
    pub throughput_pps: f64,
    /// DATA frames spent per delivered packet.
    pub data_per_delivery: f64,
}

impl Totals {
    pub fn from_stations(stations: &[StationStats], elapsed_secs: f64) -> Self {
        let mut t = Totals::default();
        for s in stations {
            t.offered += s.offered;
            t.delivered += s.delivered;
            t.dropped += s.dropped;
            t.interrupted += s.interrupted;
            t.data_sent += s.data_sent;
            t.rts_sent += s.rts_sent;
        }
        t.delivery_ratio = ratio(t.delivered, t.offered);
        t.data_per_delivery = ratio(t.data_sent, t.delivered);
        if elapsed_secs > 0.0 {
            t.throughput_pps = t.delivered as f64 / elapsed_secs;
        }
        t
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub scheme: MacScheme,
    pub config: SimConfig,
    pub elapsed_secs: f64,
    pub totals: Totals,
    pub access_point: ApStats,
    pub stations: Vec<StationStats>,
}

impl SimReport {
    pub fn new(
        scheme: MacScheme,
        config: SimConfig,
        elapsed_secs: f64,
        access_point: ApStats,
        stations: Vec<StationStats>,
    ) -> Self {
        let totals = Totals::from_stations(&stations, elapsed_secs);
        Self {
            scheme,
            config,
            elapsed_secs,
            totals,
            access_point,
            stations,
        }
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} | {} stations | {:.2}s",
            self.scheme, self.config.stations, self.elapsed_secs
        )?;
        writeln!(
            f,
            "{:>8} {:>8} {:>9} {:>8} {:>10} {:>6} {:>6}",
            "station", "offered", "delivered", "dropped", "unfinished", "data", "rts"
        )?;
        for s in &self.stations {
            writeln!(
                f,
                "{:>8} {:>8} {:>9} {:>8} {:>10} {:>6} {:>6}",
                s.id, s.offered, s.delivered, s.dropped, s.interrupted, s.data_sent, s.rts_sent
            )?;
        }
        let t = &self.totals;
        writeln!(
            f,
            "{:>8} {:>8} {:>9} {:>8} {:>10} {:>6} {:>6}",
            "total", t.offered, t.delivered, t.dropped, t.interrupted, t.data_sent, t.rts_sent
        )?;
        write!(
            f,
            "delivery {:.1}% | {:.1} pkt/s | {:.2} DATA/delivery | {} collisions",
            t.delivery_ratio * 100.0,
            t.throughput_pps,
            t.data_per_delivery,
            self.access_point.collisions
        )
    }
}

/// One line per scheme, for `compare`.
pub fn comparison_table(reports: &[SimReport]) -> String {
    let mut out = format!(
        "{:<26} {:>9} {:>9} {:>8} {:>10} {:>10}\n",
        "scheme", "delivery", "pkt/s", "dropped", "collisions", "DATA/pkt"
    );
    for r in reports {
        out.push_str(&format!(
            "{:<26} {:>8.1}% {:>9.1} {:>8} {:>10} {:>10.2}\n",
            r.scheme.label(),
            r.totals.delivery_ratio * 100.0,
            r.totals.throughput_pps,
            r.totals.dropped,
            r.access_point.collisions,
            r.totals.data_per_delivery
        ));
    }
    out
}
